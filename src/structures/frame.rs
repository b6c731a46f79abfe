// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the Frame structure describing a single simulation step.

use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use nalgebra::{Matrix3, Vector3};
use std::fmt;

/// Identifier of an atom: its species label and the index of the atom within the species.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomKey {
    species: String,
    index: usize,
}

impl AtomKey {
    /// Create a new atom key.
    pub fn new(species: &str, index: usize) -> Self {
        AtomKey {
            species: species.to_owned(),
            index,
        }
    }

    /// Get the species label of the atom.
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Get the index of the atom within its species (as written in the input file).
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for AtomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.species, self.index)
    }
}

/// Position, velocity, and force of a single atom.
#[derive(Debug, Clone, PartialEq, CopyGetters)]
pub struct AtomState {
    /// Position of the atom (`R`).
    #[getset(get_copy = "pub")]
    pub(crate) position: Vector3<f64>,
    /// Velocity of the atom (`V`).
    #[getset(get_copy = "pub")]
    pub(crate) velocity: Vector3<f64>,
    /// Force acting on the atom (`F`).
    #[getset(get_copy = "pub")]
    pub(crate) force: Vector3<f64>,
}

impl AtomState {
    /// Create a new atom state.
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>, force: Vector3<f64>) -> Self {
        AtomState {
            position,
            velocity,
            force,
        }
    }
}

impl Default for AtomState {
    fn default() -> Self {
        AtomState::new(Vector3::zeros(), Vector3::zeros(), Vector3::zeros())
    }
}

/// Energies of the system in a single simulation step (`E`).
#[derive(Debug, Clone, Copy, PartialEq, Default, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Energies {
    /// Conserved (Hamiltonian) energy.
    hamiltonian: f64,
    potential: f64,
    kinetic: f64,
}

impl Energies {
    pub fn new(hamiltonian: f64, potential: f64, kinetic: f64) -> Self {
        Energies {
            hamiltonian,
            potential,
            kinetic,
        }
    }
}

/// A single simulation step with all its per-atom and global properties.
///
/// Atoms are stored in the order in which they appear in the input file.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Frame {
    /// Simulation time.
    #[getset(get_copy = "pub")]
    time: f64,
    /// Lattice vectors of the simulation cell (rows of the matrix, `h`).
    #[getset(get_copy = "pub")]
    cell: Matrix3<f64>,
    /// Velocity of the lattice vectors (`hv`).
    #[getset(get_copy = "pub")]
    cell_velocity: Matrix3<f64>,
    /// Stress tensor (`S`).
    #[getset(get_copy = "pub")]
    stress: Matrix3<f64>,
    #[getset(get_copy = "pub")]
    energies: Energies,
    /// Temperature (`T`).
    #[getset(get_copy = "pub")]
    temperature: f64,
    /// Pressure (`P`).
    #[getset(get_copy = "pub")]
    pressure: f64,
    /// States of the individual atoms in the order of their appearance.
    #[getset(get = "pub")]
    atoms: IndexMap<AtomKey, AtomState>,
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new(0.0, Matrix3::zeros())
    }
}

impl Frame {
    /// Create a new frame with the given time and cell and no atoms.
    /// All other properties are set to zero.
    pub fn new(time: f64, cell: Matrix3<f64>) -> Self {
        Frame {
            time,
            cell,
            cell_velocity: Matrix3::zeros(),
            stress: Matrix3::zeros(),
            energies: Energies::default(),
            temperature: 0.0,
            pressure: 0.0,
            atoms: IndexMap::new(),
        }
    }

    /// Set the energies of the frame.
    pub fn with_energies(mut self, energies: Energies) -> Self {
        self.energies = energies;
        self
    }

    /// Set the temperature of the frame.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the pressure of the frame.
    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    /// Set the stress tensor of the frame.
    pub fn with_stress(mut self, stress: Matrix3<f64>) -> Self {
        self.stress = stress;
        self
    }

    /// Set the lattice velocity of the frame.
    pub fn with_cell_velocity(mut self, cell_velocity: Matrix3<f64>) -> Self {
        self.cell_velocity = cell_velocity;
        self
    }

    /// Add an atom to the end of the frame.
    /// If an atom with the same key already exists, its state is replaced and its position in the order is kept.
    pub fn with_atom(mut self, key: AtomKey, state: AtomState) -> Self {
        self.atoms.insert(key, state);
        self
    }

    /// Get the number of atoms in the frame.
    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Iterate over the keys of the atoms in the frame.
    pub fn atom_keys(&self) -> impl Iterator<Item = &AtomKey> {
        self.atoms.keys()
    }
}

/// Flatten a 3×3 matrix into an array in row-major order.
pub(crate) fn row_major(matrix: &Matrix3<f64>) -> [f64; 9] {
    let mut flat = [0.0; 9];
    for (i, row) in matrix.row_iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            flat[i * 3 + j] = *value;
        }
    }

    flat
}

/******************************/
/*         UNIT TESTS         */
/******************************/
