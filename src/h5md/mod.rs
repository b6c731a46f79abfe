// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the h5md archive layout: header, dataset allocation, and frame writing.

pub mod convert;
pub mod frame_writer;
pub mod header;
pub mod schema;

use nalgebra::Vector3;

use crate::structures::frame::{row_major, AtomState, Frame};
use crate::units::Dimension;

/// Group holding the per-atom data and the simulation box.
pub const PARTICLES: &str = "particles";
/// Group holding the global observables.
pub const OBSERVABLES: &str = "observables";
/// Group holding the simulation box.
pub const BOX: &str = "particles/box";
/// Dataset holding the species index of each atom.
pub const SPECIES: &str = "particles/species";
/// Dataset holding the step numbers. Linked into every time-dependent group.
pub const STEP: &str = "particles/box/edges/step";
/// Dataset holding the simulation times. Linked into every time-dependent group.
pub const TIME: &str = "particles/box/edges/time";

/// Shape of the per-step data of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One 3-vector for each atom.
    PerAtom,
    /// A single number.
    Scalar,
    /// A 3×3 tensor.
    Tensor,
}

/// Time-dependent property of a frame stored in its own group of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Edges,
    Position,
    Velocity,
    Force,
    HamiltonianEnergy,
    PotentialEnergy,
    KineticEnergy,
    Pressure,
    Temperature,
    LatticeVelocity,
    Stress,
}

impl Field {
    /// All fields in the order in which their groups are created.
    pub const ALL: [Field; 11] = [
        Field::Edges,
        Field::Position,
        Field::Velocity,
        Field::Force,
        Field::HamiltonianEnergy,
        Field::PotentialEnergy,
        Field::KineticEnergy,
        Field::Pressure,
        Field::Temperature,
        Field::LatticeVelocity,
        Field::Stress,
    ];

    /// Path to the group of the field.
    pub fn group(self) -> &'static str {
        match self {
            Field::Edges => "particles/box/edges",
            Field::Position => "particles/position",
            Field::Velocity => "particles/velocity",
            Field::Force => "particles/force",
            Field::HamiltonianEnergy => "observables/hamiltonian_energy",
            Field::PotentialEnergy => "observables/potential_energy",
            Field::KineticEnergy => "observables/kinetic_energy",
            Field::Pressure => "observables/pressure",
            Field::Temperature => "observables/temperature",
            Field::LatticeVelocity => "observables/lattice_velocity",
            Field::Stress => "observables/stress",
        }
    }

    /// Path to the dataset holding the values of the field.
    pub fn value_path(self) -> String {
        format!("{}/value", self.group())
    }

    /// Physical dimension of the field.
    pub fn dimension(self) -> Dimension {
        match self {
            Field::Edges | Field::Position => Dimension::Length,
            Field::Velocity | Field::LatticeVelocity => Dimension::Velocity,
            Field::Force => Dimension::Force,
            Field::HamiltonianEnergy | Field::PotentialEnergy | Field::KineticEnergy => {
                Dimension::Energy
            }
            Field::Pressure | Field::Stress => Dimension::Pressure,
            Field::Temperature => Dimension::Temperature,
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            Field::Position | Field::Velocity | Field::Force => Layout::PerAtom,
            Field::Edges | Field::LatticeVelocity | Field::Stress => Layout::Tensor,
            Field::HamiltonianEnergy
            | Field::PotentialEnergy
            | Field::KineticEnergy
            | Field::Pressure
            | Field::Temperature => Layout::Scalar,
        }
    }

    /// Shape of the value dataset of the field.
    pub fn shape(self, n_steps: usize, n_atoms: usize) -> Vec<usize> {
        match self.layout() {
            Layout::PerAtom => vec![n_steps, n_atoms, 3],
            Layout::Scalar => vec![n_steps],
            Layout::Tensor => vec![n_steps, 3, 3],
        }
    }

    /// Collect the values of the field from a frame in the row-major order of its dataset.
    /// Per-atom values follow the order of atoms in the frame.
    pub(crate) fn extract(self, frame: &Frame) -> Vec<f64> {
        match self {
            Field::Edges => row_major(&frame.cell()).to_vec(),
            Field::Position => flatten_atoms(frame, AtomState::position),
            Field::Velocity => flatten_atoms(frame, AtomState::velocity),
            Field::Force => flatten_atoms(frame, AtomState::force),
            Field::HamiltonianEnergy => vec![frame.energies().hamiltonian()],
            Field::PotentialEnergy => vec![frame.energies().potential()],
            Field::KineticEnergy => vec![frame.energies().kinetic()],
            Field::Pressure => vec![frame.pressure()],
            Field::Temperature => vec![frame.temperature()],
            Field::LatticeVelocity => row_major(&frame.cell_velocity()).to_vec(),
            Field::Stress => row_major(&frame.stress()).to_vec(),
        }
    }
}

fn flatten_atoms(frame: &Frame, get: fn(&AtomState) -> Vector3<f64>) -> Vec<f64> {
    frame
        .atoms()
        .values()
        .flat_map(|state| {
            let vector = get(state);
            [vector.x, vector.y, vector.z]
        })
        .collect()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
