//! Native CoolProp oracle (feature `coolprop`).
//!
//! CoolProp keeps process-wide state, so every native call runs under
//! [`COOLPROP_LOCK`]. Handles live in a table owned by the oracle.

use super::{HandleId, OracleError, OracleResult, PropertyOracle};
use crate::params::{FluidParam, HumidAirParam, InputPair, Phase};
use rfluids::io::{FluidInputPair, FluidTrivialParam};
use rfluids::native::{AbstractState, CoolProp};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use th_core::timing::{self, oracle_timing};

static COOLPROP_LOCK: Mutex<()> = Mutex::new(());

fn native_lock() -> OracleResult<MutexGuard<'static, ()>> {
    COOLPROP_LOCK.lock().map_err(|_| OracleError::Lock)
}

fn backend_error(context: &str, err: impl std::fmt::Display) -> OracleError {
    OracleError::failed(format!("CoolProp {context}: {err}"))
}

#[derive(Default)]
struct Handles {
    next: HandleId,
    states: HashMap<HandleId, AbstractState>,
}

/// CoolProp low-level interface through `rfluids`.
#[derive(Default)]
pub struct CoolPropOracle {
    handles: Mutex<Handles>,
}

impl CoolPropOracle {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        handle: HandleId,
        f: impl FnOnce(&mut AbstractState) -> OracleResult<T>,
    ) -> OracleResult<T> {
        let _native = native_lock()?;
        let mut handles = self.handles.lock().map_err(|_| OracleError::Lock)?;
        let state = handles
            .states
            .get_mut(&handle)
            .ok_or(OracleError::InvalidHandle { handle })?;
        f(state)
    }
}

fn native_pair(pair: InputPair) -> FluidInputPair {
    match pair {
        InputPair::QT => FluidInputPair::QT,
        InputPair::PQ => FluidInputPair::PQ,
        InputPair::QSMolar => FluidInputPair::QSMolar,
        InputPair::QSMass => FluidInputPair::QSMass,
        InputPair::HMolarQ => FluidInputPair::HMolarQ,
        InputPair::HMassQ => FluidInputPair::HMassQ,
        InputPair::DMolarQ => FluidInputPair::DMolarQ,
        InputPair::DMassQ => FluidInputPair::DMassQ,
        InputPair::PT => FluidInputPair::PT,
        InputPair::DMassT => FluidInputPair::DMassT,
        InputPair::DMolarT => FluidInputPair::DMolarT,
        InputPair::HMolarT => FluidInputPair::HMolarT,
        InputPair::HMassT => FluidInputPair::HMassT,
        InputPair::SMolarT => FluidInputPair::SMolarT,
        InputPair::SMassT => FluidInputPair::SMassT,
        InputPair::TUMolar => FluidInputPair::TUMolar,
        InputPair::TUMass => FluidInputPair::TUMass,
        InputPair::DMassP => FluidInputPair::DMassP,
        InputPair::DMolarP => FluidInputPair::DMolarP,
        InputPair::HMassP => FluidInputPair::HMassP,
        InputPair::HMolarP => FluidInputPair::HMolarP,
        InputPair::PSMass => FluidInputPair::PSMass,
        InputPair::PSMolar => FluidInputPair::PSMolar,
        InputPair::PUMass => FluidInputPair::PUMass,
        InputPair::PUMolar => FluidInputPair::PUMolar,
        InputPair::HMassSMass => FluidInputPair::HMassSMass,
        InputPair::HMolarSMolar => FluidInputPair::HMolarSMolar,
        InputPair::SMassUMass => FluidInputPair::SMassUMass,
        InputPair::SMolarUMolar => FluidInputPair::SMolarUMolar,
        InputPair::DMassHMass => FluidInputPair::DMassHMass,
        InputPair::DMolarHMolar => FluidInputPair::DMolarHMolar,
        InputPair::DMassSMass => FluidInputPair::DMassSMass,
        InputPair::DMolarSMolar => FluidInputPair::DMolarSMolar,
        InputPair::DMassUMass => FluidInputPair::DMassUMass,
        InputPair::DMolarUMolar => FluidInputPair::DMolarUMolar,
    }
}

fn native_phase(phase: Phase) -> rfluids::io::Phase {
    use rfluids::io::Phase as Native;
    match phase {
        Phase::Liquid => Native::Liquid,
        Phase::Supercritical => Native::Supercritical,
        Phase::SupercriticalGas => Native::SupercriticalGas,
        Phase::SupercriticalLiquid => Native::SupercriticalLiquid,
        Phase::CriticalPoint => Native::CriticalPoint,
        Phase::Gas => Native::Gas,
        Phase::TwoPhase => Native::TwoPhase,
        Phase::Unknown => Native::Unknown,
        Phase::NotImposed => Native::NotImposed,
    }
}

/// State-dependent keyed output.
fn output(state: &AbstractState, key: FluidParam) -> Result<f64, String> {
    use rfluids::io::FluidParam as Native;
    let native = match key {
        FluidParam::DMolar => Native::DMolar,
        FluidParam::DMass => Native::DMass,
        FluidParam::HMolar => Native::HMolar,
        FluidParam::HMass => Native::HMass,
        FluidParam::P => Native::P,
        FluidParam::Q => Native::Q,
        FluidParam::SMolar => Native::SMolar,
        FluidParam::SMass => Native::SMass,
        FluidParam::T => Native::T,
        FluidParam::UMolar => Native::UMolar,
        FluidParam::UMass => Native::UMass,
        FluidParam::CpMass => Native::CpMass,
        FluidParam::CpMolar => Native::CpMolar,
        FluidParam::CvMass => Native::CvMass,
        FluidParam::CvMolar => Native::CvMolar,
        FluidParam::Conductivity => Native::Conductivity,
        FluidParam::DynamicViscosity => Native::DynamicViscosity,
        FluidParam::Prandtl => Native::Prandtl,
        FluidParam::SoundSpeed => Native::SoundSpeed,
        FluidParam::SurfaceTension => Native::SurfaceTension,
        FluidParam::Phase => Native::Phase,
        FluidParam::Compressibility => Native::Z,
        trivial => return trivial_output(state, trivial),
    };
    state.keyed_output(native).map_err(|e| e.to_string())
}

fn trivial_output(state: &AbstractState, key: FluidParam) -> Result<f64, String> {
    let native = match key {
        FluidParam::MolarMass => FluidTrivialParam::MolarMass,
        FluidParam::TCritical => FluidTrivialParam::TCritical,
        FluidParam::PCritical => FluidTrivialParam::PCritical,
        FluidParam::TMax => FluidTrivialParam::TMax,
        FluidParam::TMin => FluidTrivialParam::TMin,
        FluidParam::PMax => FluidTrivialParam::PMax,
        FluidParam::PMin => FluidTrivialParam::PMin,
        FluidParam::TTriple => FluidTrivialParam::TTriple,
        FluidParam::PTriple => FluidTrivialParam::PTriple,
        FluidParam::TFreeze => FluidTrivialParam::TFreeze,
        FluidParam::GasConstant => FluidTrivialParam::GasConstant,
        other => return Err(format!("{other} is not a trivial output")),
    };
    state.keyed_output(native).map_err(|e| e.to_string())
}

/// Whether a CoolProp output error says the quantity has no value for this
/// fluid or state, as opposed to a failed calculation.
fn is_undefined_output(message: &str) -> bool {
    const MARKERS: [&str; 6] = [
        "not implemented",
        "not available",
        "not defined",
        "only defined",
        "not valid",
        "no model",
    ];
    let message = message.to_ascii_lowercase();
    MARKERS.iter().any(|marker| message.contains(marker))
}

impl PropertyOracle for CoolPropOracle {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn create_handle(&self, backend: &str, fluids: &str) -> OracleResult<HandleId> {
        let state = {
            let _native = native_lock()?;
            AbstractState::new(backend, fluids).map_err(|_| OracleError::UnknownFluid {
                backend: backend.to_string(),
                fluid: fluids.to_string(),
            })?
        };
        let mut handles = self.handles.lock().map_err(|_| OracleError::Lock)?;
        handles.next += 1;
        let id = handles.next;
        handles.states.insert(id, state);
        Ok(id)
    }

    fn set_fractions(&self, handle: HandleId, fractions: &[f64]) -> OracleResult<()> {
        self.with_state(handle, |state| {
            state
                .set_fractions(fractions)
                .map_err(|e| backend_error("set_fractions", e))
        })
    }

    fn release_handle(&self, handle: HandleId) -> OracleResult<()> {
        let _native = native_lock()?;
        let mut handles = self.handles.lock().map_err(|_| OracleError::Lock)?;
        handles
            .states
            .remove(&handle)
            .map(drop)
            .ok_or(OracleError::InvalidHandle { handle })
    }

    fn evaluate(
        &self,
        handle: HandleId,
        pair: InputPair,
        first: f64,
        second: f64,
    ) -> OracleResult<()> {
        self.with_state(handle, |state| {
            state
                .update(native_pair(pair), first, second)
                .map_err(|e| backend_error("update", e))
        })
    }

    fn keyed_output(&self, handle: HandleId, key: FluidParam) -> OracleResult<f64> {
        self.with_state(handle, |state| {
            output(state, key).map_err(|message| {
                if is_undefined_output(&message) {
                    tracing::trace!(%key, %message, "CoolProp keyed output unavailable");
                    OracleError::not_available(key)
                } else {
                    backend_error(&format!("output {key}"), message)
                }
            })
        })
    }

    fn specify_phase(&self, handle: HandleId, phase: Phase) -> OracleResult<()> {
        self.with_state(handle, |state| {
            state
                .specify_phase(native_phase(phase))
                .map_err(|e| backend_error("specify_phase", e))
        })
    }

    fn unspecify_phase(&self, handle: HandleId) -> OracleResult<()> {
        self.with_state(handle, |state| {
            state.unspecify_phase();
            Ok(())
        })
    }

    fn ha_props(
        &self,
        output: HumidAirParam,
        inputs: [(HumidAirParam, f64); 3],
    ) -> OracleResult<f64> {
        let _native = native_lock()?;
        let _timer = timing::Timer::start(&oracle_timing::HA_PROPS);
        let [(k1, v1), (k2, v2), (k3, v3)] = inputs;
        let value = CoolProp::ha_props_si(
            output.as_str(),
            k1.as_str(),
            v1,
            k2.as_str(),
            v2,
            k3.as_str(),
            v3,
        )
        .map_err(|e| backend_error("HAPropsSI", e))?;
        if output == HumidAirParam::DewPoint && !value.is_finite() {
            return Err(OracleError::not_available(output));
        }
        Ok(value)
    }
}
