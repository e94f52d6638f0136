//! Parsing of user text with units into SI values.
//!
//! `"150 C"`, `"2 bar"`, `"50 %"`, `"2675 kJ/kg"`. A bare number is taken as SI.

use std::fmt;
use th_core::units::{Length, Pressure, Temperature};
use thiserror::Error;
use uom::si::length::{foot, kilometer, meter};
use uom::si::pressure::{
    atmosphere, bar, kilopascal, megapascal, millibar, pascal, pound_force_per_square_inch,
};
use uom::si::thermodynamic_temperature::{degree_celsius, degree_fahrenheit, kelvin};

/// Quantity family of a textual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Temperature (canonical: K)
    Temperature,
    /// Absolute pressure (canonical: Pa)
    Pressure,
    /// Pressure difference (canonical: Pa)
    PressureDrop,
    /// Density (canonical: kg/m³)
    Density,
    /// Specific enthalpy / internal energy (canonical: J/kg)
    SpecificEnergy,
    /// Specific entropy / specific heat (canonical: J/(kg·K))
    SpecificEntropy,
    /// Decimal fraction in [0, 1], percent accepted (quality, relative humidity, efficiency)
    Fraction,
    /// Humidity ratio (canonical: kg/kg dry air)
    HumidityRatio,
    /// Length / altitude (canonical: m)
    Length,
    /// Mass flow rate (canonical: kg/s)
    MassFlow,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Temperature => "temperature",
            Self::Pressure => "absolute pressure",
            Self::PressureDrop => "pressure drop",
            Self::Density => "density",
            Self::SpecificEnergy => "specific enthalpy",
            Self::SpecificEntropy => "specific entropy",
            Self::Fraction => "fraction",
            Self::HumidityRatio => "humidity ratio",
            Self::Length => "length",
            Self::MassFlow => "mass flow rate",
        };
        f.write_str(name)
    }
}

/// Error in unit parsing or conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("Could not parse a number from '{0}'")]
    Parse(String),

    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit { unit: String, quantity: Quantity },

    #[error("Ambiguous unit '{unit}': {reason}")]
    AmbiguousUnit { unit: String, reason: &'static str },

    #[error("Value {value} out of range: {reason}")]
    OutOfRange { value: f64, reason: &'static str },
}

/// Parse `raw_text` as a `quantity`, returning the SI value.
pub fn parse_quantity(raw_text: &str, quantity: Quantity) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(raw_text)?;
    let unit_lower = unit.to_lowercase();
    let unknown = || UnitError::UnknownUnit {
        unit: unit.clone(),
        quantity,
    };

    match quantity {
        Quantity::Temperature => {
            let temperature = match unit_lower.as_str() {
                "" | "k" | "kelvin" => Temperature::new::<kelvin>(value),
                "c" | "°c" | "degc" | "celsius" => Temperature::new::<degree_celsius>(value),
                "f" | "°f" | "degf" | "fahrenheit" => Temperature::new::<degree_fahrenheit>(value),
                _ => return Err(unknown()),
            };
            let t_k = temperature.get::<kelvin>();
            if t_k <= 0.0 {
                return Err(UnitError::OutOfRange {
                    value: t_k,
                    reason: "absolute temperature must be > 0 K",
                });
            }
            Ok(t_k)
        }
        Quantity::Pressure => {
            let pa = pressure_in_pa(value, &unit_lower).ok_or_else(unknown)??;
            if pa <= 0.0 {
                return Err(UnitError::OutOfRange {
                    value: pa,
                    reason: "absolute pressure must be positive",
                });
            }
            Ok(pa)
        }
        Quantity::PressureDrop => pressure_in_pa(value, &unit_lower).ok_or_else(unknown)?,
        Quantity::Density => match unit_lower.as_str() {
            "" | "kg/m3" | "kg/m^3" | "kg/m³" => Ok(value),
            "g/cm3" | "g/cm^3" | "g/cm³" => Ok(value * 1e3),
            _ => Err(unknown()),
        },
        Quantity::SpecificEnergy => match unit_lower.as_str() {
            "" | "j/kg" => Ok(value),
            "kj/kg" => Ok(value * 1e3),
            "mj/kg" => Ok(value * 1e6),
            _ => Err(unknown()),
        },
        Quantity::SpecificEntropy => match unit_lower.as_str() {
            "" | "j/(kg·k)" | "j/(kg*k)" | "j/kg/k" | "j/kgk" => Ok(value),
            "kj/(kg·k)" | "kj/(kg*k)" | "kj/kg/k" | "kj/kgk" => Ok(value * 1e3),
            _ => Err(unknown()),
        },
        Quantity::Fraction => {
            let fraction = match unit_lower.as_str() {
                "" => value,
                "%" => value / 100.0,
                _ => return Err(unknown()),
            };
            if !(0.0..=1.0).contains(&fraction) {
                return Err(UnitError::OutOfRange {
                    value: fraction,
                    reason: "fraction must be between 0 and 1",
                });
            }
            Ok(fraction)
        }
        Quantity::HumidityRatio => {
            let ratio = match unit_lower.as_str() {
                "" | "kg/kg" => value,
                "g/kg" => value / 1e3,
                _ => return Err(unknown()),
            };
            if ratio < 0.0 {
                return Err(UnitError::OutOfRange {
                    value: ratio,
                    reason: "humidity ratio cannot be negative",
                });
            }
            Ok(ratio)
        }
        Quantity::Length => {
            let length = match unit_lower.as_str() {
                "" | "m" => Length::new::<meter>(value),
                "km" => Length::new::<kilometer>(value),
                "ft" => Length::new::<foot>(value),
                _ => return Err(unknown()),
            };
            Ok(length.get::<meter>())
        }
        Quantity::MassFlow => match unit_lower.as_str() {
            "" | "kg/s" => Ok(value),
            "kg/h" => Ok(value / 3600.0),
            _ => Err(unknown()),
        },
    }
}

/// `None` for an unknown unit.
fn pressure_in_pa(value: f64, unit: &str) -> Option<Result<f64, UnitError>> {
    let pressure = match unit {
        "" | "pa" => Pressure::new::<pascal>(value),
        "kpa" => Pressure::new::<kilopascal>(value),
        "mpa" => Pressure::new::<megapascal>(value),
        "bar" => Pressure::new::<bar>(value),
        "mbar" => Pressure::new::<millibar>(value),
        "atm" => Pressure::new::<atmosphere>(value),
        "psia" => Pressure::new::<pound_force_per_square_inch>(value),
        "psi" => {
            return Some(Err(UnitError::AmbiguousUnit {
                unit: "psi".into(),
                reason: "use 'psia' for absolute pressure",
            }));
        }
        _ => return None,
    };
    Some(Ok(pressure.get::<pascal>()))
}

/// Split `"70 C"` into `(70.0, "C")`.
fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let trimmed = input.trim();
    let mut split_idx = trimmed.len();
    for (idx, c) in trimmed.char_indices() {
        let exponent = matches!(c, 'e' | 'E')
            && trimmed[idx + 1..]
                .chars()
                .next()
                .is_some_and(|next| next.is_ascii_digit() || next == '-' || next == '+');
        if !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+') || exponent) {
            split_idx = idx;
            break;
        }
    }
    let (number, unit) = trimmed.split_at(split_idx);
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| UnitError::Parse(input.to_string()))?;
    if !value.is_finite() {
        return Err(UnitError::Parse(input.to_string()));
    }
    Ok((value, unit.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn temperatures() {
        assert_eq!(parse_quantity("300 K", Quantity::Temperature).unwrap(), 300.0);
        assert_relative_eq!(
            parse_quantity("150 C", Quantity::Temperature).unwrap(),
            423.15,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            parse_quantity("32F", Quantity::Temperature).unwrap(),
            273.15,
            max_relative = 1e-9
        );
        assert!(parse_quantity("-300 C", Quantity::Temperature).is_err());
    }

    #[test]
    fn below_absolute_zero_reports_kelvin() {
        match parse_quantity("-300 C", Quantity::Temperature) {
            Err(UnitError::OutOfRange { value, .. }) => {
                assert_relative_eq!(value, -26.85, max_relative = 1e-9)
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn pressures() {
        assert_eq!(parse_quantity("2 bar", Quantity::Pressure).unwrap(), 2e5);
        assert_relative_eq!(
            parse_quantity("101.325 kPa", Quantity::Pressure).unwrap(),
            101_325.0,
            max_relative = 1e-12
        );
        assert!(matches!(
            parse_quantity("14.7 psi", Quantity::Pressure),
            Err(UnitError::AmbiguousUnit { .. })
        ));
        assert!(parse_quantity("0 Pa", Quantity::Pressure).is_err());
        assert_eq!(parse_quantity("0 kPa", Quantity::PressureDrop).unwrap(), 0.0);
    }

    #[test]
    fn fractions_accept_percent() {
        assert_eq!(parse_quantity("50 %", Quantity::Fraction).unwrap(), 0.5);
        assert_eq!(parse_quantity("0.8", Quantity::Fraction).unwrap(), 0.8);
        assert!(parse_quantity("120%", Quantity::Fraction).is_err());
    }

    #[test]
    fn exponent_is_not_a_unit() {
        assert_eq!(parse_quantity("2.5e6 J/kg", Quantity::SpecificEnergy).unwrap(), 2.5e6);
        assert_eq!(parse_quantity("2675 kJ/kg", Quantity::SpecificEnergy).unwrap(), 2.675e6);
    }

    #[test]
    fn unknown_units_are_reported() {
        let err = parse_quantity("3 furlongs", Quantity::Length).unwrap_err();
        assert_eq!(
            err,
            UnitError::UnknownUnit {
                unit: "furlongs".into(),
                quantity: Quantity::Length
            }
        );
        assert!(matches!(
            parse_quantity("abc", Quantity::Pressure),
            Err(UnitError::Parse(_))
        ));
    }
}
