// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the allocation of all h5md datasets before any frame is written.

use crate::errors::{ConvertError, StoreError};
use crate::io::store::{ArchiveStore, Attribute};
use crate::structures::metadata::TrajectoryMetadata;
use crate::units::{Dimension, UnitConverter, UnitSystem};

use super::{Field, BOX, OBSERVABLES, PARTICLES, SPECIES, STEP, TIME};

/// Allocates the particle and observable datasets of an h5md archive.
///
/// ## Example
/// ```
/// use castep_h5md::prelude::*;
///
/// let metadata = TrajectoryMetadata::new(
///     1,
///     vec![AtomKey::new("Si", 1), AtomKey::new("Si", 2)],
/// );
///
/// let archive = SchemaBuilder::new(metadata)
///     .with_units(Some(UnitSystem::Electronic))
///     .build(MemoryStore::new())
///     .unwrap();
///
/// let store = archive.store();
/// assert_eq!(store.int_dataset("particles/species").unwrap().as_slice().unwrap(), &[0, 0]);
/// assert_eq!(store.dataset("particles/position/value").unwrap().shape(), &[1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    metadata: TrajectoryMetadata,
    units: Option<UnitSystem>,
}

impl SchemaBuilder {
    /// Create a builder for a trajectory with the given metadata.
    /// By default, the values are not converted and no units are recorded.
    pub fn new(metadata: TrajectoryMetadata) -> Self {
        SchemaBuilder {
            metadata,
            units: None,
        }
    }

    /// Set the unit system of the archive. `None` means that values are stored as read.
    pub fn with_units(mut self, units: Option<UnitSystem>) -> Self {
        self.units = units;
        self
    }

    /// Create all groups and zero-filled datasets in the store.
    ///
    /// ## Returns
    /// `H5mdArchive` owning the store, ready for writing frames.
    /// `ConvertError` if the units are not convertible or the store could not be written to.
    ///
    /// ## Notes
    /// - The store is consumed, so the datasets can only be allocated once.
    /// - `step`, `time`, and the cell matrices are stored in `particles/box/edges`.
    ///   Every other time-dependent group contains hard links to `step` and `time`.
    pub fn build<S: ArchiveStore>(self, mut store: S) -> Result<H5mdArchive<S>, ConvertError> {
        // converter is constructed first so that a unit error does not leave allocated datasets behind
        let converter = self
            .units
            .map(|system| UnitConverter::new(UnitSystem::Castep, system))
            .transpose()?;

        let n_steps = self.metadata.n_steps();
        let n_atoms = self.metadata.n_atoms();

        store.create_group(PARTICLES)?;
        store.create_int_dataset(SPECIES, &self.metadata.species_indices())?;
        store.set_attribute(
            SPECIES,
            "species_names",
            Attribute::StrArray(self.metadata.species().iter().cloned().collect()),
        )?;

        store.create_group(BOX)?;
        store.set_attribute(BOX, "dimension", Attribute::Int(3))?;
        store.set_attribute(BOX, "boundary", Attribute::from("periodic"))?;

        store.create_group(OBSERVABLES)?;

        for field in Field::ALL {
            allocate_field(&mut store, field, n_steps, n_atoms)?;
        }

        if let Some(system) = self.units {
            annotate_units(&mut store, system)?;
        }

        log::debug!(
            "Allocated h5md datasets for {} step(s) and {} atom(s) of {} species.",
            n_steps,
            n_atoms,
            self.metadata.n_species()
        );

        Ok(H5mdArchive {
            store,
            metadata: self.metadata,
            units: self.units,
            converter,
        })
    }
}

/// Create the group of a field with its value dataset.
/// The group of `Field::Edges` owns the `step` and `time` datasets, other groups link them.
fn allocate_field(
    store: &mut impl ArchiveStore,
    field: Field,
    n_steps: usize,
    n_atoms: usize,
) -> Result<(), StoreError> {
    let group = field.group();
    store.create_group(group)?;

    if field == Field::Edges {
        let steps = (1..=n_steps as i64).collect::<Vec<i64>>();
        store.create_int_dataset(STEP, &steps)?;
        store.create_dataset(TIME, &[n_steps])?;
    } else {
        store.link(STEP, &format!("{}/step", group))?;
        store.link(TIME, &format!("{}/time", group))?;
    }

    store.create_dataset(&field.value_path(), &field.shape(n_steps, n_atoms))
}

/// Attach the `unit` attribute to the time dataset and to every value dataset.
fn annotate_units(store: &mut impl ArchiveStore, system: UnitSystem) -> Result<(), ConvertError> {
    let unit = |dimension: Dimension| -> Result<Attribute, ConvertError> {
        Ok(Attribute::from(system.unit_name(dimension).map_err(
            crate::errors::UnitError::RegistryError,
        )?))
    };

    store.set_attribute(TIME, "unit", unit(Dimension::Time)?)?;
    for field in Field::ALL {
        store.set_attribute(&field.value_path(), "unit", unit(field.dimension())?)?;
    }

    Ok(())
}

/// h5md archive with all datasets allocated.
/// Frames are written into it using [`H5mdArchive::write_frame`].
#[derive(Debug)]
pub struct H5mdArchive<S: ArchiveStore> {
    pub(super) store: S,
    pub(super) metadata: TrajectoryMetadata,
    pub(super) units: Option<UnitSystem>,
    /// Converter from the input (CASTEP) units into the units of the archive.
    pub(super) converter: Option<UnitConverter>,
}

impl<S: ArchiveStore> H5mdArchive<S> {
    /// Get the store the archive is written into.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the metadata of the trajectory the archive was allocated for.
    pub fn metadata(&self) -> &TrajectoryMetadata {
        &self.metadata
    }

    /// Get the unit system of the archive. `None` if the values are not converted.
    pub fn units(&self) -> Option<UnitSystem> {
        self.units
    }

    /// Get the number of steps the archive was allocated for.
    pub fn n_steps(&self) -> usize {
        self.metadata.n_steps()
    }

    /// Flush the archive and return the underlying store.
    pub fn finish(mut self) -> Result<S, StoreError> {
        self.store.flush()?;
        Ok(self.store)
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
