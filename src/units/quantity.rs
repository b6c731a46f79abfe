// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of units, unit expressions, and quantities convertible between compatible units.

use std::fmt;
use std::str::FromStr;

use crate::errors::UnitError;

use super::registry::UnitRegistry;
use super::Scalable;

/// Exponents of the base dimensions (length, mass, time, temperature) of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensionality([i8; 4]);

impl Dimensionality {
    /// Dimensionality of a dimensionless quantity.
    pub const NONE: Dimensionality = Dimensionality([0, 0, 0, 0]);

    fn combine(self, other: [i8; 4], power: i8) -> Self {
        let mut exponents = self.0;
        for (exp, add) in exponents.iter_mut().zip(other) {
            *exp = exp.saturating_add(add.saturating_mul(power));
        }
        Dimensionality(exponents)
    }

    /// Get the exponents of length, mass, time, and temperature.
    pub fn exponents(&self) -> [i8; 4] {
        self.0
    }
}

/// Unit parsed from a unit expression such as `hartree / bohr^3`.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// The expression the unit was parsed from.
    expression: String,
    /// Magnitude of the unit in SI base units.
    factor: f64,
    dimensionality: Dimensionality,
}

impl Unit {
    /// Parse a unit expression using the global unit registry.
    ///
    /// ## Supported syntax
    /// Unit names (see `config/units.yaml`) combined using `*` and `/`.
    /// Each unit name may be raised to an integer power using `^` or `**`,
    /// e.g. `eV / angstrom^3` or `kg * m**2 / s**2`.
    /// Operators are applied from left to right.
    pub fn parse(expression: &str) -> Result<Unit, UnitError> {
        Unit::parse_with(expression, UnitRegistry::global())
    }

    /// Parse a unit expression using units from the provided registry.
    pub fn parse_with(expression: &str, registry: &UnitRegistry) -> Result<Unit, UnitError> {
        let invalid = || UnitError::InvalidExpression(expression.to_owned());

        let bytes = expression.as_bytes();
        let mut pos = 0;
        let mut factor = 1.0f64;
        let mut dimensionality = Dimensionality::NONE;
        // sign applied to the next term (1 for `*`, -1 for `/`)
        let mut sign = 1i8;
        let mut expect_term = true;

        loop {
            pos = skip_whitespace(bytes, pos);
            if pos >= bytes.len() {
                break;
            }

            if expect_term {
                let (name, after_name) = read_identifier(expression, pos).ok_or_else(invalid)?;
                let (power, after_power) = read_power(bytes, skip_whitespace(bytes, after_name))
                    .ok_or_else(invalid)?;
                pos = after_power;

                let definition = registry
                    .unit(name)
                    .ok_or_else(|| UnitError::UnknownUnit(name.to_owned()))?;

                let power = power.saturating_mul(sign);
                factor *= definition.factor.powi(power as i32);
                dimensionality = dimensionality.combine(definition.dimensions, power);
                expect_term = false;
            } else {
                sign = match bytes[pos] {
                    b'*' => 1,
                    b'/' => -1,
                    _ => return Err(invalid()),
                };
                pos += 1;
                expect_term = true;
            }
        }

        // empty expression or a dangling operator
        if expect_term {
            return Err(invalid());
        }

        Ok(Unit {
            expression: expression.trim().to_owned(),
            factor,
            dimensionality,
        })
    }

    /// Get the magnitude of the unit in SI base units.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Get the dimensionality of the unit.
    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    /// Check whether a quantity in this unit can be expressed in the `other` unit.
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimensionality == other.dimensionality
    }

    /// Get the factor converting a value in this unit to a value in the `other` unit.
    ///
    /// ## Returns
    /// The conversion factor or `UnitError::Mismatch` if the units are not compatible.
    pub fn factor_to(&self, other: &Unit) -> Result<f64, UnitError> {
        if !self.is_compatible(other) {
            return Err(UnitError::Mismatch(
                self.expression.clone(),
                other.expression.clone(),
            ));
        }

        Ok(self.factor / other.factor)
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Read a unit name starting at `start`. Returns the name and the position after it.
fn read_identifier(expression: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = expression.as_bytes();
    if start >= bytes.len() || !(bytes[start].is_ascii_alphabetic() || bytes[start] == b'_') {
        return None;
    }

    let mut end = start + 1;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
        end += 1;
    }

    Some((&expression[start..end], end))
}

/// Read an optional power (`^n` or `**n`) starting at `start`.
/// Returns `(1, start)` if there is no power, `None` if the power is malformed.
fn read_power(bytes: &[u8], start: usize) -> Option<(i8, usize)> {
    let mut pos = if bytes[start..].starts_with(b"**") {
        start + 2
    } else if bytes[start..].starts_with(b"^") {
        start + 1
    } else {
        return Some((1, start));
    };

    pos = skip_whitespace(bytes, pos);
    let negative = pos < bytes.len() && bytes[pos] == b'-';
    if negative {
        pos += 1;
    }

    let digits_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }

    let power = std::str::from_utf8(&bytes[digits_start..pos])
        .ok()?
        .parse::<i8>()
        .ok()?;

    Some((if negative { -power } else { power }, pos))
}

/// Value associated with a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity<T: Scalable> {
    value: T,
    unit: Unit,
}

impl<T: Scalable> Quantity<T> {
    /// Create a new quantity.
    pub fn new(value: T, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    /// Express the quantity in the `target` unit.
    ///
    /// ## Example
    /// ```
    /// # use castep_h5md::units::quantity::{Quantity, Unit};
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let bohr = Unit::parse("bohr").unwrap();
    /// let angstrom = Unit::parse("angstrom").unwrap();
    ///
    /// let length = Quantity::new(2.0, bohr).to(&angstrom).unwrap();
    /// assert_approx_eq!(f64, *length.value(), 1.058354421806, epsilon = 1e-12);
    /// ```
    pub fn to(self, target: &Unit) -> Result<Quantity<T>, UnitError> {
        let factor = self.unit.factor_to(target)?;

        Ok(Quantity {
            value: self.value.scale(factor),
            unit: target.clone(),
        })
    }

    /// Get the magnitude of the quantity.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Get the unit of the quantity.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Consume the quantity returning its magnitude.
    pub fn into_value(self) -> T {
        self.value
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
