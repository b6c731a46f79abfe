// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the TrajectoryMetadata structure.

use getset::{CopyGetters, Getters};
use indexmap::IndexSet;

use crate::errors::{ConvertError, WriteFrameError};
use crate::structures::frame::{AtomKey, Frame};

/// Properties of a trajectory that determine the shapes of the datasets in the output file.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct TrajectoryMetadata {
    /// Number of simulation steps (frames) in the trajectory.
    #[getset(get_copy = "pub")]
    n_steps: usize,
    /// Atoms of the trajectory in the order of the first frame.
    #[getset(get = "pub")]
    atoms: Vec<AtomKey>,
    /// Distinct species labels in the order of their first appearance.
    #[getset(get = "pub")]
    species: IndexSet<String>,
}

impl TrajectoryMetadata {
    /// Create trajectory metadata from the number of steps and the atoms of the first frame.
    pub fn new(n_steps: usize, atoms: Vec<AtomKey>) -> Self {
        let species = atoms
            .iter()
            .map(|atom| atom.species().to_owned())
            .collect::<IndexSet<String>>();

        TrajectoryMetadata {
            n_steps,
            atoms,
            species,
        }
    }

    /// Derive trajectory metadata from a complete trajectory.
    ///
    /// ## Returns
    /// - `TrajectoryMetadata` if the trajectory contains at least one frame
    ///   and all frames contain the same atoms in the same order as the first frame.
    /// - `ConvertError::EmptyTrajectory` if there are no frames.
    /// - `ConvertError::ShapeInvariantViolation` if any frame differs from the first one.
    pub fn from_frames(frames: &[Frame]) -> Result<Self, ConvertError> {
        let first = frames.first().ok_or(ConvertError::EmptyTrajectory)?;
        let metadata = TrajectoryMetadata::new(frames.len(), first.atom_keys().cloned().collect());

        for (index, frame) in frames.iter().enumerate().skip(1) {
            metadata.check_frame(frame, index)?;
        }

        Ok(metadata)
    }

    /// Get the number of atoms in each frame.
    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Get the number of distinct species.
    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Get the species index of each atom.
    /// Species are numbered from 0 in the order of their first appearance.
    pub fn species_indices(&self) -> Vec<i64> {
        self.atoms
            .iter()
            .map(|atom| {
                self.species.get_index_of(atom.species()).expect(
                    "FATAL CASTEP_H5MD ERROR | TrajectoryMetadata::species_indices | Species of an atom is not registered.",
                ) as i64
            })
            .collect()
    }

    /// Check that the frame contains the same atoms in the same order as the first frame.
    pub fn check_frame(&self, frame: &Frame, frame_index: usize) -> Result<(), WriteFrameError> {
        if frame.n_atoms() != self.n_atoms() {
            return Err(WriteFrameError::AtomsNumberMismatch(
                frame_index,
                self.n_atoms(),
                frame.n_atoms(),
            ));
        }

        for (i, (expected, found)) in self.atoms.iter().zip(frame.atom_keys()).enumerate() {
            if expected != found {
                return Err(WriteFrameError::AtomOrderMismatch(
                    frame_index,
                    i,
                    expected.clone(),
                    found.clone(),
                ));
            }
        }

        Ok(())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
