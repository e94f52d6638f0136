//! Humid air: a three-input state evaluated through the oracle's stateless
//! humid-air routine.

use crate::cache::PropertyCache;
use crate::error::{FluidError, FluidResult};
use crate::input::{HumidAirInput, KeyedInput, canonical_pairs};
use crate::oracle::{PropertyOracle, default_oracle};
use crate::params::HumidAirParam;
use crate::resolver::ensure_unique;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Defining inputs and property cache of a humid air state.
///
/// Nothing is sent to the oracle on update; the first property read does.
pub struct HumidAirCore {
    oracle: Arc<dyn PropertyOracle>,
    inputs: Vec<HumidAirInput>,
    cache: PropertyCache<HumidAirParam>,
}

impl HumidAirCore {
    pub fn new(oracle: Arc<dyn PropertyOracle>) -> Self {
        Self {
            oracle,
            inputs: Vec::with_capacity(3),
            cache: PropertyCache::new(),
        }
    }

    pub fn oracle(&self) -> &Arc<dyn PropertyOracle> {
        &self.oracle
    }

    pub fn inputs(&self) -> &[HumidAirInput] {
        &self.inputs
    }

    pub fn is_defined(&self) -> bool {
        self.inputs.len() == 3
    }

    pub fn update(
        &mut self,
        first: HumidAirInput,
        second: HumidAirInput,
        third: HumidAirInput,
    ) -> FluidResult<()> {
        self.reset();
        let inputs = [first, second, third];
        ensure_unique(&inputs, 3)?;
        self.inputs.extend(inputs);
        tracing::debug!(
            first = %first.key(),
            second = %second.key(),
            third = %third.key(),
            "humid air state defined"
        );
        Ok(())
    }

    pub fn reset(&mut self) {
        self.inputs.clear();
        self.cache.clear();
    }

    fn triple(&self) -> FluidResult<[(HumidAirParam, f64); 3]> {
        match *self.inputs.as_slice() {
            [a, b, c] => Ok([
                (a.key(), a.value()),
                (b.key(), b.value()),
                (c.key(), c.value()),
            ]),
            _ => Err(FluidError::Definition { count: 3 }),
        }
    }

    fn compute(&self, key: HumidAirParam) -> FluidResult<f64> {
        let inputs = self.triple()?;
        Ok(self.oracle.ha_props(key, inputs)?)
    }

    pub fn value_of(&self, key: HumidAirParam) -> FluidResult<f64> {
        self.triple()?;
        self.cache.value_of(&self.inputs, key, || self.compute(key))
    }

    pub(crate) fn canonical_inputs(&self) -> Vec<(HumidAirParam, u64)> {
        canonical_pairs(&self.inputs)
    }
}

impl fmt::Debug for HumidAirCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HumidAirCore")
            .field("oracle", &self.oracle.name())
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// Operations and properties of a humid air state.
pub trait AbstractHumidAir: Sized {
    fn core(&self) -> &HumidAirCore;

    fn core_mut(&mut self) -> &mut HumidAirCore;

    /// New empty state on the same oracle.
    fn factory(&self) -> Self;

    fn update(
        &mut self,
        first: HumidAirInput,
        second: HumidAirInput,
        third: HumidAirInput,
    ) -> FluidResult<()> {
        self.core_mut().update(first, second, third)
    }

    fn reset(&mut self) {
        self.core_mut().reset();
    }

    fn with_state(
        &self,
        first: HumidAirInput,
        second: HumidAirInput,
        third: HumidAirInput,
    ) -> FluidResult<Self> {
        let mut state = self.factory();
        state.update(first, second, third)?;
        Ok(state)
    }

    fn inputs(&self) -> &[HumidAirInput] {
        self.core().inputs()
    }

    /// Absolute pressure [Pa].
    fn pressure(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::P)
    }

    /// Dry-bulb temperature [K].
    fn temperature(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::T)
    }

    /// Humidity ratio [kg water / kg dry air].
    fn humidity(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::W)
    }

    /// Relative humidity (decimal).
    fn relative_humidity(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::R)
    }

    /// Enthalpy per kg humid air [J/kg].
    fn enthalpy(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Hha)
    }

    /// Entropy per kg humid air [J/(kg·K)].
    fn entropy(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Sha)
    }

    /// Mass density of humid air [kg/m³].
    fn density(&self) -> FluidResult<f64> {
        Ok(1.0 / self.core().value_of(HumidAirParam::Vha)?)
    }

    fn dew_temperature(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::DewPoint)
    }

    fn wet_bulb_temperature(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::WetBulb)
    }

    /// Isobaric specific heat per kg humid air [J/(kg·K)].
    fn specific_heat(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Cha)
    }

    /// Partial pressure of water vapor [Pa].
    fn partial_pressure(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::PartialPressure)
    }

    fn compressibility(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Compressibility)
    }

    /// Thermal conductivity [W/(m·K)].
    fn conductivity(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Conductivity)
    }

    /// Dynamic viscosity [Pa·s].
    fn dynamic_viscosity(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Viscosity)
    }

    /// Kinematic viscosity [m²/s].
    fn kinematic_viscosity(&self) -> FluidResult<f64> {
        Ok(self.dynamic_viscosity()? / self.density()?)
    }

    fn prandtl(&self) -> FluidResult<f64> {
        Ok(self.specific_heat()? * self.dynamic_viscosity()? / self.conductivity()?)
    }
}

/// Humid air state.
///
/// Cloning copies the defining inputs into a fresh, empty cache.
#[derive(Debug)]
pub struct HumidAir {
    core: HumidAirCore,
}

impl HumidAir {
    /// Empty state on the default oracle.
    pub fn new() -> Self {
        Self::with_oracle(default_oracle())
    }

    pub fn with_oracle(oracle: Arc<dyn PropertyOracle>) -> Self {
        Self {
            core: HumidAirCore::new(oracle),
        }
    }
}

impl Default for HumidAir {
    fn default() -> Self {
        Self::new()
    }
}

impl AbstractHumidAir for HumidAir {
    fn core(&self) -> &HumidAirCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HumidAirCore {
        &mut self.core
    }

    fn factory(&self) -> Self {
        Self::with_oracle(self.core.oracle().clone())
    }
}

impl Clone for HumidAir {
    fn clone(&self) -> Self {
        let mut state = self.factory();
        state.core.inputs.extend_from_slice(self.core.inputs());
        state
    }
}

impl PartialEq for HumidAir {
    fn eq(&self, other: &Self) -> bool {
        self.core.canonical_inputs() == other.core.canonical_inputs()
    }
}

impl Eq for HumidAir {}

impl Hash for HumidAir {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.core.canonical_inputs().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::IdealOracle;
    use approx::assert_relative_eq;

    fn air() -> HumidAir {
        HumidAir::with_oracle(Arc::new(IdealOracle::new()))
    }

    fn room_air() -> HumidAir {
        air()
            .with_state(
                HumidAirInput::pressure(101_325.0),
                HumidAirInput::temperature(293.15),
                HumidAirInput::relative_humidity(0.5),
            )
            .unwrap()
    }

    #[test]
    fn empty_state_needs_three_inputs() {
        let state = air();
        assert_eq!(
            state.temperature(),
            Err(FluidError::Definition { count: 3 })
        );
    }

    #[test]
    fn duplicate_keys_are_rejected_and_leave_state_empty() {
        let mut state = room_air();
        let err = state
            .update(
                HumidAirInput::pressure(101_325.0),
                HumidAirInput::temperature(293.15),
                HumidAirInput::temperature(300.0),
            )
            .unwrap_err();
        assert_eq!(err, FluidError::Definition { count: 3 });
        assert!(state.inputs().is_empty());
    }

    #[test]
    fn room_air_properties() {
        let state = room_air();
        assert_eq!(state.relative_humidity().unwrap(), 0.5);
        assert_relative_eq!(state.humidity().unwrap(), 0.00724, max_relative = 0.02);
        assert!(state.dew_temperature().unwrap() < 293.15);
        assert!(state.wet_bulb_temperature().unwrap() < 293.15);
        assert!(state.wet_bulb_temperature().unwrap() > state.dew_temperature().unwrap());
        assert_relative_eq!(state.density().unwrap(), 1.2, max_relative = 0.02);
    }

    #[test]
    fn density_input_round_trips() {
        let state = air()
            .with_state(
                HumidAirInput::pressure(101_325.0),
                HumidAirInput::density(1.2),
                HumidAirInput::relative_humidity(0.5),
            )
            .unwrap();
        assert_relative_eq!(state.density().unwrap(), 1.2, max_relative = 1e-12);
    }

    #[test]
    fn clone_keeps_inputs_and_equality() {
        let state = room_air();
        state.enthalpy().unwrap();
        let copy = state.clone();
        assert_eq!(state, copy);
        assert_eq!(copy.core().cache.len(), 0);
    }

    #[test]
    fn debug_names_the_oracle() {
        let rendered = format!("{:?}", room_air());
        assert!(rendered.contains("HumidAirCore"));
        assert!(rendered.contains("\"ideal\""));
    }
}
