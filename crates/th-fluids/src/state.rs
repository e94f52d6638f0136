//! Two-input fluid state: oracle handle, defining inputs and property cache.
//!
//! [`StateCore`] owns the mechanics shared by pure fluids and mixtures;
//! [`AbstractFluid`] layers the public operations and getters on top of it.

use crate::cache::PropertyCache;
use crate::error::{FluidError, FluidResult};
use crate::input::{FluidInput, canonical_pairs};
use crate::oracle::{OracleHandle, PropertyOracle};
use crate::params::{FluidParam, Phase};
use crate::resolver::resolve_pair;
use std::sync::Arc;

/// State shared by every two-input fluid type.
#[derive(Debug)]
pub struct StateCore {
    handle: OracleHandle,
    inputs: Vec<FluidInput>,
    phase: Option<Phase>,
    cache: PropertyCache<FluidParam>,
}

impl StateCore {
    /// Empty state on a fresh oracle handle.
    pub fn new(
        oracle: Arc<dyn PropertyOracle>,
        backend: &str,
        fluids: &str,
        fractions: Option<&[f64]>,
    ) -> FluidResult<Self> {
        let handle = OracleHandle::create(oracle, backend, fluids, fractions)?;
        Ok(Self {
            handle,
            inputs: Vec::with_capacity(2),
            phase: None,
            cache: PropertyCache::new(),
        })
    }

    pub fn oracle(&self) -> &Arc<dyn PropertyOracle> {
        self.handle.oracle()
    }

    pub fn inputs(&self) -> &[FluidInput] {
        &self.inputs
    }

    pub fn is_defined(&self) -> bool {
        self.inputs.len() == 2
    }

    pub fn phase_override(&self) -> Option<Phase> {
        self.phase
    }

    /// Define the state from two inputs.
    ///
    /// On failure the state is left empty.
    pub fn update(&mut self, first: FluidInput, second: FluidInput) -> FluidResult<()> {
        self.clear();
        let resolved = resolve_pair(self.oracle().as_ref(), first, second)?;
        self.handle
            .evaluate(resolved.pair, resolved.first, resolved.second)
            .map_err(|err| FluidError::Backend {
                message: err.to_string(),
            })?;
        self.inputs.extend([first, second]);
        tracing::debug!(
            pair = %resolved.pair,
            first = resolved.first,
            second = resolved.second,
            "state committed"
        );
        Ok(())
    }

    /// Clear inputs and cache and drop the phase override.
    pub fn reset(&mut self) {
        self.clear();
        if self.phase.take().is_some()
            && let Err(err) = self.handle.unspecify_phase()
        {
            tracing::warn!(%err, "failed to release phase override");
        }
    }

    pub fn specify_phase(&mut self, phase: Phase) -> FluidResult<()> {
        self.handle.specify_phase(phase)?;
        self.phase = Some(phase);
        self.recommit()
    }

    pub fn unspecify_phase(&mut self) -> FluidResult<()> {
        self.handle.unspecify_phase()?;
        self.phase = None;
        self.recommit()
    }

    /// Re-evaluate the current inputs after the handle's configuration changed.
    fn recommit(&mut self) -> FluidResult<()> {
        match *self.inputs.as_slice() {
            [first, second] => self.update(first, second),
            _ => {
                self.cache.clear();
                Ok(())
            }
        }
    }

    fn clear(&mut self) {
        self.inputs.clear();
        self.cache.clear();
    }

    fn ensure_defined(&self) -> FluidResult<()> {
        if self.is_defined() {
            Ok(())
        } else {
            Err(FluidError::Definition { count: 2 })
        }
    }

    fn compute(&self, key: FluidParam) -> FluidResult<f64> {
        Ok(self.handle.keyed_output(key)?)
    }

    /// Property that must be defined for the state.
    pub fn value_of(&self, key: FluidParam) -> FluidResult<f64> {
        self.ensure_defined()?;
        self.cache
            .value_of(&self.inputs, key, || self.compute(key))
    }

    /// Property that may be undefined for the state.
    ///
    /// Vapor quality outside `[0, 1]` (single-phase states) is reported as `None`.
    pub fn nullable_value_of(&self, key: FluidParam) -> FluidResult<Option<f64>> {
        self.ensure_defined()?;
        let value = self
            .cache
            .nullable_value_of(&self.inputs, key, || self.compute(key))?;
        Ok(match key {
            FluidParam::Q => value.filter(|q| (0.0..=1.0).contains(q)),
            _ => value,
        })
    }

    /// Release the oracle handle and forget the state. Idempotent.
    pub fn dispose(&mut self) {
        self.clear();
        self.phase = None;
        self.handle.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_released()
    }

    pub(crate) fn canonical_inputs(&self) -> Vec<(FluidParam, u64)> {
        canonical_pairs(&self.inputs)
    }
}

/// Operations and properties of a two-input fluid state.
///
/// Implementors provide access to their [`StateCore`], a factory for an empty
/// state of the same composition and a composition comparison; everything else
/// is provided.
pub trait AbstractFluid: Sized {
    fn core(&self) -> &StateCore;

    fn core_mut(&mut self) -> &mut StateCore;

    /// New empty state with the same composition.
    fn factory(&self) -> FluidResult<Self>;

    /// Whether `other` has the same composition (within tolerance).
    fn same_composition(&self, other: &Self) -> bool;

    fn update(&mut self, first: FluidInput, second: FluidInput) -> FluidResult<()> {
        self.core_mut().update(first, second)
    }

    fn reset(&mut self) {
        self.core_mut().reset();
    }

    /// New state of the same composition and phase override, defined by the given inputs.
    fn with_state(&self, first: FluidInput, second: FluidInput) -> FluidResult<Self> {
        let mut state = self.factory()?;
        if let Some(phase) = self.core().phase_override() {
            state.specify_phase(phase)?;
        }
        state.update(first, second)?;
        Ok(state)
    }

    /// Copy with the same inputs and an empty cache.
    fn try_clone(&self) -> FluidResult<Self> {
        match *self.inputs() {
            [first, second] => self.with_state(first, second),
            _ => {
                let mut state = self.factory()?;
                if let Some(phase) = self.core().phase_override() {
                    state.specify_phase(phase)?;
                }
                Ok(state)
            }
        }
    }

    fn specify_phase(&mut self, phase: Phase) -> FluidResult<()> {
        self.core_mut().specify_phase(phase)
    }

    fn unspecify_phase(&mut self) -> FluidResult<()> {
        self.core_mut().unspecify_phase()
    }

    fn inputs(&self) -> &[FluidInput] {
        self.core().inputs()
    }

    fn dispose(&mut self) {
        self.core_mut().dispose();
    }

    /// Absolute pressure [Pa].
    fn pressure(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::P)
    }

    /// Temperature [K].
    fn temperature(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::T)
    }

    /// Mass density [kg/m³].
    fn density(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::DMass)
    }

    /// Mass specific enthalpy [J/kg].
    fn enthalpy(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::HMass)
    }

    /// Mass specific entropy [J/(kg·K)].
    fn entropy(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::SMass)
    }

    /// Mass specific internal energy [J/kg].
    fn internal_energy(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::UMass)
    }

    /// Mass specific isobaric heat capacity [J/(kg·K)].
    fn specific_heat(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::CpMass)
    }

    /// Phase region; `Unknown` while no state is defined.
    fn phase(&self) -> FluidResult<Phase> {
        if !self.core().is_defined() {
            return Ok(Phase::Unknown);
        }
        self.core()
            .value_of(FluidParam::Phase)
            .map(Phase::from_output)
    }

    fn max_temperature(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::TMax)
    }

    fn min_temperature(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::TMin)
    }

    fn max_pressure(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::PMax)
    }

    fn min_pressure(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::PMin)
    }

    fn compressibility(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::Compressibility)
    }

    /// Thermal conductivity [W/(m·K)].
    fn conductivity(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::Conductivity)
    }

    fn critical_pressure(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::PCritical)
    }

    fn critical_temperature(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::TCritical)
    }

    /// Dynamic viscosity [Pa·s].
    fn dynamic_viscosity(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::DynamicViscosity)
    }

    /// Kinematic viscosity [m²/s].
    fn kinematic_viscosity(&self) -> FluidResult<Option<f64>> {
        match self.dynamic_viscosity()? {
            Some(mu) => Ok(Some(mu / self.density()?)),
            None => Ok(None),
        }
    }

    fn freezing_temperature(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::TFreeze)
    }

    /// Molar mass [kg/mol].
    fn molar_mass(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::MolarMass)
    }

    fn prandtl(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::Prandtl)
    }

    /// Vapor quality; `None` outside the two-phase region.
    fn quality(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::Q)
    }

    /// Speed of sound [m/s].
    fn sound_speed(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::SoundSpeed)
    }

    /// Surface tension [N/m].
    fn surface_tension(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::SurfaceTension)
    }

    fn triple_pressure(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::PTriple)
    }

    fn triple_temperature(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::TTriple)
    }
}
