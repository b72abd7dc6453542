//! Conversion between named physical units and SI base values.
//!
//! All computations in the crate are carried out in SI units; convert user
//! input with [`convert_from`] and results back with [`convert_to`].

use std::fmt;
use std::str::FromStr;

use glam::DVec3;

use crate::error::UnitError;

/// Standard acceleration of gravity in m/s^2.
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Gravity vector pointing along the positive depth axis.
pub fn gravity_down() -> DVec3 {
    DVec3::new(0.0, 0.0, STANDARD_GRAVITY)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Meter,
    Centimeter,
    Millimeter,
    Feet,
    Inch,
    Darcy,
    Millidarcy,
    Pascal,
    Bar,
    Atm,
    Psi,
    Poise,
    Centipoise,
    Kilogram,
    Gram,
    Pound,
    Second,
    Minute,
    Hour,
    Day,
    Year,
    Liter,
    CubicMeter,
    Stb,
}

impl Unit {
    /// Value of one unit expressed in SI base units.
    pub fn si_factor(self) -> f64 {
        match self {
            Unit::Meter => 1.0,
            Unit::Centimeter => 1e-2,
            Unit::Millimeter => 1e-3,
            Unit::Feet => 0.3048,
            Unit::Inch => 0.0254,
            // 1 darcy = 1 cP * 1 cm^2/s / (1 atm/cm)
            Unit::Darcy => 9.869_232_667_160_13e-13,
            Unit::Millidarcy => 9.869_232_667_160_13e-16,
            Unit::Pascal => 1.0,
            Unit::Bar => 1e5,
            Unit::Atm => 101_325.0,
            Unit::Psi => 6_894.757_293_168_361,
            Unit::Poise => 0.1,
            Unit::Centipoise => 1e-3,
            Unit::Kilogram => 1.0,
            Unit::Gram => 1e-3,
            Unit::Pound => 0.453_592_37,
            Unit::Second => 1.0,
            Unit::Minute => 60.0,
            Unit::Hour => 3_600.0,
            Unit::Day => 86_400.0,
            Unit::Year => 365.0 * 86_400.0,
            Unit::Liter => 1e-3,
            Unit::CubicMeter => 1.0,
            Unit::Stb => 0.158_987_294_928,
        }
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            Unit::Meter => &["meter", "metre", "m"],
            Unit::Centimeter => &["centimeter", "centimetre", "cm"],
            Unit::Millimeter => &["millimeter", "millimetre", "mm"],
            Unit::Feet => &["feet", "foot", "ft"],
            Unit::Inch => &["inch", "in"],
            Unit::Darcy => &["darcy", "d"],
            Unit::Millidarcy => &["millidarcy", "md"],
            Unit::Pascal => &["pascal", "pa"],
            Unit::Bar => &["bar"],
            Unit::Atm => &["atm", "atmosphere"],
            Unit::Psi => &["psi", "psia"],
            Unit::Poise => &["poise", "p"],
            Unit::Centipoise => &["centipoise", "cp"],
            Unit::Kilogram => &["kilogram", "kg"],
            Unit::Gram => &["gram", "g"],
            Unit::Pound => &["pound", "lb", "lbm"],
            Unit::Second => &["second", "s", "sec"],
            Unit::Minute => &["minute", "min"],
            Unit::Hour => &["hour", "h", "hr"],
            Unit::Day => &["day", "days"],
            Unit::Year => &["year", "years", "yr"],
            Unit::Liter => &["liter", "litre", "l"],
            Unit::CubicMeter => &["m3", "cubic_meter"],
            Unit::Stb => &["stb"],
        }
    }

    pub const ALL: [Unit; 24] = [
        Unit::Meter,
        Unit::Centimeter,
        Unit::Millimeter,
        Unit::Feet,
        Unit::Inch,
        Unit::Darcy,
        Unit::Millidarcy,
        Unit::Pascal,
        Unit::Bar,
        Unit::Atm,
        Unit::Psi,
        Unit::Poise,
        Unit::Centipoise,
        Unit::Kilogram,
        Unit::Gram,
        Unit::Pound,
        Unit::Second,
        Unit::Minute,
        Unit::Hour,
        Unit::Day,
        Unit::Year,
        Unit::Liter,
        Unit::CubicMeter,
        Unit::Stb,
    ];
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.names()[0])
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Unit::ALL
            .iter()
            .copied()
            .find(|u| u.names().contains(&key.as_str()))
            .ok_or_else(|| UnitError::UnknownUnit(s.to_string()))
    }
}

/// Express `value` given in `unit` in SI units.
pub fn convert_from(value: f64, unit: Unit) -> f64 {
    value * unit.si_factor()
}

/// Express the SI quantity `value` in `unit`.
pub fn convert_to(value: f64, unit: Unit) -> f64 {
    value / unit.si_factor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn common_factors() {
        assert_eq!(convert_from(100.0, Unit::Bar), 1e7);
        assert_relative_eq!(convert_from(1.0, Unit::Centipoise), 1e-3);
        assert_relative_eq!(convert_from(1000.0, Unit::Millidarcy), convert_from(1.0, Unit::Darcy));
        assert_relative_eq!(convert_to(convert_from(3.5, Unit::Psi), Unit::Psi), 3.5);
    }

    #[test]
    fn parse_names() {
        assert_eq!("darcy".parse::<Unit>(), Ok(Unit::Darcy));
        assert_eq!(" cP ".parse::<Unit>(), Ok(Unit::Centipoise));
        assert_eq!("mD".parse::<Unit>(), Ok(Unit::Millidarcy));
        assert_eq!(
            "furlong".parse::<Unit>(),
            Err(UnitError::UnknownUnit("furlong".into()))
        );
    }

    #[test]
    fn names_are_unique() {
        let mut all: Vec<&str> = Unit::ALL.iter().flat_map(|u| u.names().iter().copied()).collect();
        let n = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), n);
    }
}
