// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of unit systems and conversion of physical quantities between them.

use nalgebra::{Matrix3, Vector3};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::errors::{RegistryError, UnitError};

use self::quantity::{Quantity, Unit};
use self::registry::UnitRegistry;

pub mod quantity;
pub mod registry;

/// Physical dimension of a quantity stored in the h5md file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Length,
    Velocity,
    Force,
    Energy,
    Pressure,
    Temperature,
    Time,
}

impl Dimension {
    /// All dimensions in a fixed order.
    pub const ALL: [Dimension; 7] = [
        Dimension::Length,
        Dimension::Velocity,
        Dimension::Force,
        Dimension::Energy,
        Dimension::Pressure,
        Dimension::Temperature,
        Dimension::Time,
    ];

    /// Name of the dimension as used in the unit-system tables.
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Length => "length",
            Dimension::Velocity => "velocity",
            Dimension::Force => "force",
            Dimension::Energy => "energy",
            Dimension::Pressure => "pressure",
            Dimension::Temperature => "temperature",
            Dimension::Time => "time",
        }
    }

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dimension {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|dim| dim.name() == s)
            .ok_or_else(|| RegistryError::UnknownDimension(s.to_owned()))
    }
}

/// Predefined unit systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitSystem {
    /// Angstrom, picosecond, and electronvolt based units with forces in newtons.
    MdAnalysis,
    /// Atomic units used natively by CASTEP.
    Castep,
    /// Angstrom, picosecond, and electronvolt based units with forces in eV/angstrom.
    Electronic,
}

impl UnitSystem {
    /// All predefined unit systems.
    pub const ALL: [UnitSystem; 3] = [
        UnitSystem::MdAnalysis,
        UnitSystem::Castep,
        UnitSystem::Electronic,
    ];

    /// Name of the unit system.
    pub fn name(&self) -> &'static str {
        match self {
            UnitSystem::MdAnalysis => "MDANALYSIS",
            UnitSystem::Castep => "CASTEP",
            UnitSystem::Electronic => "ELECTRONIC",
        }
    }

    /// Get the unit expression this unit system assigns to `dimension`.
    pub fn unit_name(&self, dimension: Dimension) -> Result<&'static str, RegistryError> {
        UnitRegistry::global().unit_name(*self, dimension)
    }

    /// Get the parsed unit this unit system assigns to `dimension`.
    pub fn unit(&self, dimension: Dimension) -> Result<Unit, UnitError> {
        Unit::parse(self.unit_name(dimension).map_err(UnitError::RegistryError)?)
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for UnitSystem {
    type Err = RegistryError;

    /// Parse the name of a unit system. The name is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitSystem::ALL
            .into_iter()
            .find(|system| system.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistryError::UnknownUnitSystem(s.to_owned()))
    }
}

/// Values that can be rescaled by a conversion factor.
/// All components of the value are multiplied by the same factor.
pub trait Scalable {
    fn scale(self, factor: f64) -> Self;
}

impl Scalable for f64 {
    #[inline(always)]
    fn scale(self, factor: f64) -> Self {
        self * factor
    }
}

impl<const N: usize> Scalable for [f64; N] {
    #[inline]
    fn scale(self, factor: f64) -> Self {
        self.map(|x| x * factor)
    }
}

impl Scalable for Vec<f64> {
    #[inline]
    fn scale(mut self, factor: f64) -> Self {
        self.iter_mut().for_each(|x| *x *= factor);
        self
    }
}

impl Scalable for Vector3<f64> {
    #[inline]
    fn scale(self, factor: f64) -> Self {
        self * factor
    }
}

impl Scalable for Matrix3<f64> {
    #[inline]
    fn scale(self, factor: f64) -> Self {
        self * factor
    }
}

/// Converts values from one unit system into another.
/// The conversion factors for all dimensions are calculated once, on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConverter {
    from: UnitSystem,
    to: UnitSystem,
    factors: [f64; 7],
}

impl UnitConverter {
    /// Create a converter from the `from` unit system into the `to` unit system.
    ///
    /// ## Returns
    /// `UnitConverter` if the units of all dimensions are compatible between the systems.
    /// `UnitError` otherwise.
    pub fn new(from: UnitSystem, to: UnitSystem) -> Result<Self, UnitError> {
        let mut factors = [1.0; 7];

        if from != to {
            for dimension in Dimension::ALL {
                factors[dimension.index()] =
                    from.unit(dimension)?.factor_to(&to.unit(dimension)?)?;
            }
        }

        Ok(UnitConverter { from, to, factors })
    }

    /// Unit system the values are converted from.
    pub fn source(&self) -> UnitSystem {
        self.from
    }

    /// Unit system the values are converted into.
    pub fn target(&self) -> UnitSystem {
        self.to
    }

    /// Get the factor used to convert values of the given dimension.
    pub fn factor(&self, dimension: Dimension) -> f64 {
        self.factors[dimension.index()]
    }

    /// Convert `value` of the given dimension.
    /// Conversion within the same unit system returns the value unchanged.
    #[inline]
    pub fn convert<T: Scalable>(&self, value: T, dimension: Dimension) -> T {
        if self.from == self.to {
            value
        } else {
            value.scale(self.factor(dimension))
        }
    }
}

/// Convert `value` of the given `dimension` from the unit system `from` into the unit system `to`.
///
/// ## Returns
/// Converted value or `UnitError` if the units of the dimension are not compatible.
///
/// ## Example
/// ```
/// # use castep_h5md::units::{convert, Dimension, UnitSystem};
/// # use float_cmp::assert_approx_eq;
/// #
/// let pressure = convert(1.0, Dimension::Pressure, UnitSystem::Castep, UnitSystem::Electronic).unwrap();
/// assert_approx_eq!(f64, pressure, 183.631536449695, epsilon = 1e-9);
/// ```
pub fn convert<T: Scalable>(
    value: T,
    dimension: Dimension,
    from: UnitSystem,
    to: UnitSystem,
) -> Result<T, UnitError> {
    if from == to {
        return Ok(value);
    }

    Ok(Quantity::new(value, from.unit(dimension)?)
        .to(&to.unit(dimension)?)?
        .into_value())
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn unit_system_from_str() {
        assert_eq!("MDANALYSIS".parse::<UnitSystem>(), Ok(UnitSystem::MdAnalysis));
        assert_eq!("castep".parse::<UnitSystem>(), Ok(UnitSystem::Castep));
        assert_eq!(" Electronic ".parse::<UnitSystem>(), Ok(UnitSystem::Electronic));
        assert_eq!(
            "SI".parse::<UnitSystem>(),
            Err(RegistryError::UnknownUnitSystem("SI".to_owned()))
        );
    }

    #[test]
    fn dimension_from_str() {
        for dimension in Dimension::ALL {
            assert_eq!(dimension.to_string().parse::<Dimension>(), Ok(dimension));
        }

        assert!("Length".parse::<Dimension>().is_err());
    }

    #[test]
    fn convert_pressure_castep_electronic() {
        let pressure = convert(
            1.0,
            Dimension::Pressure,
            UnitSystem::Castep,
            UnitSystem::Electronic,
        )
        .unwrap();

        assert_approx_eq!(f64, pressure, 183.63153644969523, epsilon = 1e-9);
    }

    #[test]
    fn convert_castep_mdanalysis() {
        let from = UnitSystem::Castep;
        let to = UnitSystem::MdAnalysis;

        assert_approx_eq!(
            f64,
            convert(1.0, Dimension::Length, from, to).unwrap(),
            0.529177210903,
            epsilon = 1e-12
        );
        assert_approx_eq!(
            f64,
            convert(1.0, Dimension::Energy, from, to).unwrap(),
            27.211386245988034,
            epsilon = 1e-9
        );
        assert_approx_eq!(
            f64,
            convert(1.0, Dimension::Velocity, from, to).unwrap(),
            21876.912636411325,
            epsilon = 1e-6
        );
        assert_approx_eq!(
            f64,
            convert(1.0, Dimension::Force, from, to).unwrap(),
            8.238723498254079e-8,
            epsilon = 1e-18
        );
        assert_approx_eq!(
            f64,
            convert(1.0, Dimension::Time, from, to).unwrap(),
            2.4188843265857e-5,
            epsilon = 1e-16
        );
        assert_approx_eq!(
            f64,
            convert(1.0, Dimension::Temperature, from, to).unwrap(),
            315775.02480407,
            epsilon = 1e-6
        );
    }

    #[test]
    fn convert_force_electronic() {
        assert_approx_eq!(
            f64,
            convert(
                1.0,
                Dimension::Force,
                UnitSystem::Castep,
                UnitSystem::Electronic
            )
            .unwrap(),
            51.42206747632596,
            epsilon = 1e-9
        );
    }

    #[test]
    fn identity_is_exact() {
        let values = [0.1, -3.7e-12, 1.0e300, 123456.789, 0.0, f64::MIN_POSITIVE];

        for system in UnitSystem::ALL {
            let converter = UnitConverter::new(system, system).unwrap();
            for dimension in Dimension::ALL {
                for value in values {
                    assert_eq!(convert(value, dimension, system, system).unwrap(), value);
                    assert_eq!(converter.convert(value, dimension), value);
                }
            }
        }
    }

    #[test]
    fn round_trip() {
        let values = [0.1, -3.7e-3, 42.0, 123456.789, -1.0e-8];

        for from in UnitSystem::ALL {
            for to in UnitSystem::ALL {
                for dimension in Dimension::ALL {
                    for value in values {
                        let there = convert(value, dimension, from, to).unwrap();
                        let back = convert(there, dimension, to, from).unwrap();
                        assert_approx_eq!(f64, back, value, epsilon = 1e-12 * value.abs(), ulps = 8);
                    }
                }
            }
        }
    }

    #[test]
    fn converter_matches_convert() {
        for from in UnitSystem::ALL {
            for to in UnitSystem::ALL {
                let converter = UnitConverter::new(from, to).unwrap();
                assert_eq!(converter.source(), from);
                assert_eq!(converter.target(), to);

                for dimension in Dimension::ALL {
                    assert_approx_eq!(
                        f64,
                        converter.convert(2.5, dimension),
                        convert(2.5, dimension, from, to).unwrap(),
                        ulps = 4
                    );
                }
            }
        }
    }

    #[test]
    fn convert_elementwise() {
        let from = UnitSystem::Castep;
        let to = UnitSystem::Electronic;
        let factor = convert(1.0, Dimension::Length, from, to).unwrap();

        let vector = convert(Vector3::new(1.0, -2.0, 0.5), Dimension::Length, from, to).unwrap();
        assert_approx_eq!(f64, vector.x, factor);
        assert_approx_eq!(f64, vector.y, -2.0 * factor);
        assert_approx_eq!(f64, vector.z, 0.5 * factor);

        let matrix = convert(Matrix3::identity() * 3.0, Dimension::Length, from, to).unwrap();
        assert_approx_eq!(f64, matrix[(0, 0)], 3.0 * factor);
        assert_approx_eq!(f64, matrix[(1, 1)], 3.0 * factor);
        assert_approx_eq!(f64, matrix[(0, 1)], 0.0);

        let vec = convert(vec![1.0, 2.0], Dimension::Length, from, to).unwrap();
        assert_approx_eq!(f64, vec[1], 2.0 * factor);
    }
}
