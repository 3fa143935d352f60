//! Units of measure for quantity samples.
//!
//! Unit strings follow the host store's syntax (`count`, `count/min`, `kcal`,
//! `degC`, ...). Every unit belongs to a [`Dimension`] and converts to that
//! dimension's base unit as `base = (value + offset) * factor`; the offset is
//! only non-zero for the Celsius and Fahrenheit scales.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical dimension a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Count,
    Frequency,
    Length,
    Mass,
    Energy,
    Percent,
    Temperature,
    Pressure,
    Time,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Count,
    CountPerMinute,
    CountPerSecond,
    Meter,
    Centimeter,
    Millimeter,
    Kilometer,
    Foot,
    Inch,
    Mile,
    Yard,
    Kilogram,
    Gram,
    Pound,
    Ounce,
    Stone,
    Kilocalorie,
    LargeCalorie,
    Kilojoule,
    Joule,
    Percent,
    Celsius,
    Fahrenheit,
    Kelvin,
    MillimeterOfMercury,
    CentimeterOfWater,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Liter,
    Milliliter,
}

struct UnitDef {
    unit: Unit,
    symbol: &'static str,
    dimension: Dimension,
    factor: f64,
    offset: f64,
}

const fn def(unit: Unit, symbol: &'static str, dimension: Dimension, factor: f64) -> UnitDef {
    UnitDef {
        unit,
        symbol,
        dimension,
        factor,
        offset: 0.0,
    }
}

const UNITS: &[UnitDef] = &[
    def(Unit::Count, "count", Dimension::Count, 1.0),
    def(Unit::CountPerMinute, "count/min", Dimension::Frequency, 1.0 / 60.0),
    def(Unit::CountPerSecond, "count/s", Dimension::Frequency, 1.0),
    def(Unit::Meter, "m", Dimension::Length, 1.0),
    def(Unit::Centimeter, "cm", Dimension::Length, 0.01),
    def(Unit::Millimeter, "mm", Dimension::Length, 0.001),
    def(Unit::Kilometer, "km", Dimension::Length, 1000.0),
    def(Unit::Foot, "ft", Dimension::Length, 0.3048),
    def(Unit::Inch, "in", Dimension::Length, 0.0254),
    def(Unit::Mile, "mi", Dimension::Length, 1609.344),
    def(Unit::Yard, "yd", Dimension::Length, 0.9144),
    def(Unit::Kilogram, "kg", Dimension::Mass, 1000.0),
    def(Unit::Gram, "g", Dimension::Mass, 1.0),
    def(Unit::Pound, "lb", Dimension::Mass, 453.592_37),
    def(Unit::Ounce, "oz", Dimension::Mass, 28.349_523_125),
    def(Unit::Stone, "st", Dimension::Mass, 6_350.293_18),
    def(Unit::Kilocalorie, "kcal", Dimension::Energy, 4184.0),
    def(Unit::LargeCalorie, "Cal", Dimension::Energy, 4184.0),
    def(Unit::Kilojoule, "kJ", Dimension::Energy, 1000.0),
    def(Unit::Joule, "J", Dimension::Energy, 1.0),
    def(Unit::Percent, "%", Dimension::Percent, 1.0),
    UnitDef {
        unit: Unit::Celsius,
        symbol: "degC",
        dimension: Dimension::Temperature,
        factor: 1.0,
        offset: 273.15,
    },
    UnitDef {
        unit: Unit::Fahrenheit,
        symbol: "degF",
        dimension: Dimension::Temperature,
        factor: 5.0 / 9.0,
        offset: 459.67,
    },
    def(Unit::Kelvin, "K", Dimension::Temperature, 1.0),
    def(Unit::MillimeterOfMercury, "mmHg", Dimension::Pressure, 133.322_387_415),
    def(Unit::CentimeterOfWater, "cmAq", Dimension::Pressure, 98.0665),
    def(Unit::Millisecond, "ms", Dimension::Time, 0.001),
    def(Unit::Second, "s", Dimension::Time, 1.0),
    def(Unit::Minute, "min", Dimension::Time, 60.0),
    def(Unit::Hour, "hr", Dimension::Time, 3600.0),
    def(Unit::Day, "d", Dimension::Time, 86_400.0),
    def(Unit::Liter, "L", Dimension::Volume, 1.0),
    def(Unit::Milliliter, "mL", Dimension::Volume, 0.001),
];

/// Unit parsing and conversion errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("unrecognized unit string '{0}'")]
    Unknown(String),

    #[error("cannot express {from} in {to}")]
    Incompatible { from: Unit, to: Unit },
}

impl Unit {
    fn def(self) -> &'static UnitDef {
        // Every variant has exactly one row in UNITS.
        UNITS
            .iter()
            .find(|d| d.unit == self)
            .unwrap_or(&UNITS[0])
    }

    /// Parse a unit string such as `count/min` or `kcal`.
    pub fn parse(s: &str) -> Result<Self, UnitError> {
        UNITS
            .iter()
            .find(|d| d.symbol == s)
            .map(|d| d.unit)
            .ok_or_else(|| UnitError::Unknown(s.to_string()))
    }

    /// The unit string in host syntax.
    pub fn symbol(self) -> &'static str {
        self.def().symbol
    }

    pub fn dimension(self) -> Dimension {
        self.def().dimension
    }

    pub fn is_compatible_with(self, other: Unit) -> bool {
        self.dimension() == other.dimension()
    }

    /// Convert `value` in `self` to `value` in `target`.
    pub fn convert(self, value: f64, target: Unit) -> Result<f64, UnitError> {
        if self == target {
            return Ok(value);
        }
        if !self.is_compatible_with(target) {
            return Err(UnitError::Incompatible {
                from: self,
                to: target,
            });
        }
        let from = self.def();
        let to = target.def();
        let base = (value + from.offset) * from.factor;
        Ok(base / to.factor - to.offset)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Unit::parse(&value)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol().to_string()
    }
}

/// A magnitude paired with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// The magnitude expressed in `unit`.
    pub fn value_in(&self, unit: Unit) -> Result<f64, UnitError> {
        self.unit.convert(self.value, unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn parse_accepts_every_symbol_in_table() {
        for d in UNITS {
            assert_eq!(Unit::parse(d.symbol).unwrap(), d.unit);
            assert_eq!(d.unit.symbol(), d.symbol);
        }
    }

    #[test]
    fn parse_rejects_unknown_and_malformed() {
        assert!(matches!(Unit::parse("furlong"), Err(UnitError::Unknown(_))));
        assert!(Unit::parse("count/").is_err());
        assert!(Unit::parse("").is_err());
        assert!(Unit::parse(" count").is_err());
        assert!(Unit::parse("KCAL").is_err());
    }

    #[test]
    fn converts_within_dimension() {
        assert!(approx(Unit::Kilometer.convert(1.5, Unit::Meter).unwrap(), 1500.0));
        assert!(approx(Unit::Kilojoule.convert(4.184, Unit::Kilocalorie).unwrap(), 1.0));
        assert!(approx(Unit::CountPerSecond.convert(1.0, Unit::CountPerMinute).unwrap(), 60.0));
        assert!(approx(Unit::Pound.convert(1.0, Unit::Kilogram).unwrap(), 0.453_592_37));
    }

    #[test]
    fn temperature_conversion_is_affine() {
        assert!(approx(Unit::Fahrenheit.convert(98.6, Unit::Celsius).unwrap(), 37.0));
        assert!(approx(Unit::Celsius.convert(0.0, Unit::Kelvin).unwrap(), 273.15));
        assert!(approx(Unit::Celsius.convert(100.0, Unit::Fahrenheit).unwrap(), 212.0));
    }

    #[test]
    fn rejects_cross_dimension_conversion() {
        let err = Unit::Kilogram.convert(70.0, Unit::Count).unwrap_err();
        assert_eq!(
            err,
            UnitError::Incompatible {
                from: Unit::Kilogram,
                to: Unit::Count
            }
        );
    }

    #[test]
    fn identity_conversion_is_exact() {
        let q = Quantity::new(0.1 + 0.2, Unit::Count);
        assert_eq!(q.value_in(Unit::Count).unwrap(), 0.1 + 0.2);
    }

    #[test]
    fn quantity_serializes_unit_as_symbol() {
        let q = Quantity::new(72.0, Unit::CountPerMinute);
        let json = serde_json::to_value(q).unwrap();
        assert_eq!(json["unit"], "count/min");
        let back: Quantity = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }
}
