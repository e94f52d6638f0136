//! Keyed inputs: immutable (canonical key, SI value) pairs that define a state.

use crate::error::{FluidError, FluidResult};
use crate::params::{FluidParam, HumidAirParam};
use std::fmt;
use std::hash::Hash;
use th_core::units::constants::P_ATM_PA;

/// A defining input of a state.
pub trait KeyedInput: Copy + fmt::Debug {
    /// Canonical key type of the backend vocabulary.
    type Key: Copy + Eq + Ord + Hash + fmt::Display + fmt::Debug;

    fn key(&self) -> Self::Key;

    /// Value in SI units.
    fn value(&self) -> f64;
}

/// Canonical `(key, value bits)` pairs, sorted by key.
///
/// Two input lists describe the same state exactly when their canonical pairs
/// are equal, whatever order the inputs were given in.
pub(crate) fn canonical_pairs<I: KeyedInput>(inputs: &[I]) -> Vec<(I::Key, u64)> {
    let mut pairs: Vec<_> = inputs
        .iter()
        .map(|input| (input.key(), input.value().to_bits()))
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Input of a pure fluid or mixture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidInput {
    key: FluidParam,
    value: f64,
}

impl FluidInput {
    fn new(key: FluidParam, value: f64) -> Self {
        Self { key, value }
    }

    /// Mass density [kg/m³].
    pub fn density(value: f64) -> Self {
        Self::new(FluidParam::DMass, value)
    }

    /// Mass specific enthalpy [J/kg].
    pub fn enthalpy(value: f64) -> Self {
        Self::new(FluidParam::HMass, value)
    }

    /// Mass specific entropy [J/(kg·K)].
    pub fn entropy(value: f64) -> Self {
        Self::new(FluidParam::SMass, value)
    }

    /// Mass specific internal energy [J/kg].
    pub fn internal_energy(value: f64) -> Self {
        Self::new(FluidParam::UMass, value)
    }

    /// Molar density [mol/m³].
    pub fn molar_density(value: f64) -> Self {
        Self::new(FluidParam::DMolar, value)
    }

    /// Molar specific enthalpy [J/mol].
    pub fn molar_enthalpy(value: f64) -> Self {
        Self::new(FluidParam::HMolar, value)
    }

    /// Molar specific entropy [J/(mol·K)].
    pub fn molar_entropy(value: f64) -> Self {
        Self::new(FluidParam::SMolar, value)
    }

    /// Molar specific internal energy [J/mol].
    pub fn molar_internal_energy(value: f64) -> Self {
        Self::new(FluidParam::UMolar, value)
    }

    /// Absolute pressure [Pa].
    pub fn pressure(value: f64) -> Self {
        Self::new(FluidParam::P, value)
    }

    /// Vapor quality as a decimal fraction (0 = saturated liquid, 1 = saturated vapor).
    pub fn quality(value: f64) -> Self {
        Self::new(FluidParam::Q, value)
    }

    /// Temperature [K].
    pub fn temperature(value: f64) -> Self {
        Self::new(FluidParam::T, value)
    }
}

impl KeyedInput for FluidInput {
    type Key = FluidParam;

    fn key(&self) -> FluidParam {
        self.key
    }

    fn value(&self) -> f64 {
        self.value
    }
}

/// Input of a humid air state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidAirInput {
    key: HumidAirParam,
    value: f64,
}

impl HumidAirInput {
    /// Lowest altitude accepted by [`HumidAirInput::altitude`] [m].
    pub const ALTITUDE_MIN_M: f64 = -5_000.0;
    /// Highest altitude accepted by [`HumidAirInput::altitude`] [m].
    pub const ALTITUDE_MAX_M: f64 = 11_000.0;

    fn new(key: HumidAirParam, value: f64) -> Self {
        Self { key, value }
    }

    /// Pressure of the standard atmosphere at an altitude above sea level [m].
    ///
    /// Only the troposphere model is supported, so the altitude must lie in
    /// `[-5000, 11000]` m.
    pub fn altitude(value: f64) -> FluidResult<Self> {
        if !(Self::ALTITUDE_MIN_M..=Self::ALTITUDE_MAX_M).contains(&value) {
            return Err(FluidError::Range {
                what: "altitude above sea level (expected -5000..=11000 m)",
                value,
            });
        }
        let pressure = P_ATM_PA * (1.0 - 2.25577e-5 * value).powf(5.2559);
        Ok(Self::pressure(pressure))
    }

    /// Mass density of humid air [kg/m³], stored as specific volume per kg humid air.
    pub fn density(value: f64) -> Self {
        Self::new(HumidAirParam::Vha, 1.0 / value)
    }

    /// Dew-point temperature [K].
    pub fn dew_temperature(value: f64) -> Self {
        Self::new(HumidAirParam::DewPoint, value)
    }

    /// Enthalpy per kg humid air [J/kg].
    pub fn enthalpy(value: f64) -> Self {
        Self::new(HumidAirParam::Hha, value)
    }

    /// Entropy per kg humid air [J/(kg·K)].
    pub fn entropy(value: f64) -> Self {
        Self::new(HumidAirParam::Sha, value)
    }

    /// Absolute humidity ratio [kg water / kg dry air].
    pub fn humidity(value: f64) -> Self {
        Self::new(HumidAirParam::W, value)
    }

    /// Partial pressure of water vapor [Pa].
    pub fn partial_pressure(value: f64) -> Self {
        Self::new(HumidAirParam::PartialPressure, value)
    }

    /// Absolute pressure [Pa].
    pub fn pressure(value: f64) -> Self {
        Self::new(HumidAirParam::P, value)
    }

    /// Relative humidity as a decimal fraction.
    pub fn relative_humidity(value: f64) -> Self {
        Self::new(HumidAirParam::R, value)
    }

    /// Dry-bulb temperature [K].
    pub fn temperature(value: f64) -> Self {
        Self::new(HumidAirParam::T, value)
    }

    /// Wet-bulb temperature [K].
    pub fn wet_bulb_temperature(value: f64) -> Self {
        Self::new(HumidAirParam::WetBulb, value)
    }
}

impl KeyedInput for HumidAirInput {
    type Key = HumidAirParam;

    fn key(&self) -> HumidAirParam {
        self.key
    }

    fn value(&self) -> f64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn constructors_store_si_values_under_canonical_keys() {
        let p = FluidInput::pressure(101_325.0);
        assert_eq!(p.key(), FluidParam::P);
        assert_eq!(p.value(), 101_325.0);

        let q = FluidInput::quality(0.5);
        assert_eq!(q.key(), FluidParam::Q);

        let w = HumidAirInput::humidity(0.01);
        assert_eq!(w.key().as_str(), "W");
    }

    #[test]
    fn humid_air_density_is_stored_as_specific_volume() {
        let input = HumidAirInput::density(1.25);
        assert_eq!(input.key(), HumidAirParam::Vha);
        assert_relative_eq!(input.value(), 0.8);
    }

    #[test]
    fn altitude_zero_is_standard_atmosphere() {
        let input = HumidAirInput::altitude(0.0).unwrap();
        assert_eq!(input.key(), HumidAirParam::P);
        assert_relative_eq!(input.value(), 101_325.0);
    }

    #[test]
    fn altitude_pressure_decreases_with_height() {
        let low = HumidAirInput::altitude(-1_000.0).unwrap().value();
        let high = HumidAirInput::altitude(1_000.0).unwrap().value();
        assert!(low > 101_325.0);
        assert!(high < 101_325.0);
        assert_relative_eq!(high, 89_874.6, max_relative = 1e-3);
    }

    #[test]
    fn altitude_outside_troposphere_is_a_range_error() {
        for altitude in [-5_000.1, 11_000.1, f64::NAN] {
            assert!(matches!(
                HumidAirInput::altitude(altitude),
                Err(FluidError::Range { .. })
            ));
        }
    }

    #[test]
    fn canonical_pairs_ignore_order() {
        let a = [FluidInput::pressure(1e5), FluidInput::temperature(300.0)];
        let b = [FluidInput::temperature(300.0), FluidInput::pressure(1e5)];
        assert_eq!(canonical_pairs(&a), canonical_pairs(&b));

        let c = [FluidInput::temperature(301.0), FluidInput::pressure(1e5)];
        assert_ne!(canonical_pairs(&a), canonical_pairs(&c));
    }
}
