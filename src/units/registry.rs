// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the registry of known units and unit systems.

use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::errors::RegistryError;

use super::{Dimension, UnitSystem};

/// Definition of a single unit that can appear in a unit expression.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct UnitDefinition {
    /// Magnitude of the unit in SI base units.
    pub factor: f64,
    /// Exponents of length, mass, time, and temperature.
    pub dimensions: [i8; 4],
}

/// Contains all units and unit systems known to the library.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    /// Units that can be used in unit expressions. Keys are unit names.
    units: IndexMap<String, UnitDefinition>,
    /// Unit expression assigned to each dimension by each unit system.
    systems: IndexMap<UnitSystem, IndexMap<Dimension, String>>,
}

static REGISTRY: OnceLock<UnitRegistry> = OnceLock::new();

impl Default for UnitRegistry {
    /// Construct the default `UnitRegistry`.
    ///
    /// ## Notes
    /// - This function parses YAML content from `config/units.yaml` and `config/unit_systems.yaml`
    ///   which are included in the library at compile time.
    /// - Use [`UnitRegistry::global`] to avoid parsing the files repeatedly.
    fn default() -> Self {
        let units = include_str!("../../config/units.yaml");
        let systems = include_str!("../../config/unit_systems.yaml");

        UnitRegistry::new_from_strings(units, systems)
            .expect("FATAL CASTEP_H5MD ERROR | UnitRegistry::default | Default unit tables could not be parsed.")
    }
}

impl UnitRegistry {
    /// Get a reference to the registry shared by the entire program.
    /// The registry is constructed on first access.
    pub fn global() -> &'static UnitRegistry {
        REGISTRY.get_or_init(UnitRegistry::default)
    }

    /// Parse YAML strings into a `UnitRegistry` structure.
    fn new_from_strings(units: &str, systems: &str) -> Result<Self, serde_yaml::Error> {
        Ok(UnitRegistry {
            units: serde_yaml::from_str(units)?,
            systems: serde_yaml::from_str(systems)?,
        })
    }

    /// Get the definition of a unit with the given name.
    pub fn unit(&self, name: &str) -> Option<&UnitDefinition> {
        self.units.get(name)
    }

    /// Get the unit expression that `system` assigns to `dimension`.
    ///
    /// ## Example
    /// ```
    /// # use castep_h5md::units::{registry::UnitRegistry, Dimension, UnitSystem};
    /// #
    /// let registry = UnitRegistry::global();
    /// assert_eq!(
    ///     registry.unit_name(UnitSystem::Castep, Dimension::Pressure).unwrap(),
    ///     "hartree / bohr^3"
    /// );
    /// ```
    pub fn unit_name(
        &self,
        system: UnitSystem,
        dimension: Dimension,
    ) -> Result<&str, RegistryError> {
        self.systems
            .get(&system)
            .and_then(|dims| dims.get(&dimension))
            .map(String::as_str)
            .ok_or(RegistryError::MissingUnit(system, dimension))
    }

    /// Get the unit expression for a unit system and a dimension given by their names.
    ///
    /// ## Returns
    /// Unit expression if both names are known. `RegistryError` otherwise.
    pub fn lookup(&self, system: &str, dimension: &str) -> Result<&str, RegistryError> {
        self.unit_name(system.parse()?, dimension.parse()?)
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
