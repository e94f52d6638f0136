//! Property oracle capability.
//!
//! The oracle is the equation-of-state engine every state delegates to. It is
//! modelled after CoolProp's low-level interface: handle-based state updates
//! for fluids and mixtures, and a stateless routine for humid air.
//!
//! Implementations must be `Send + Sync`. Any entry point that touches a
//! process-wide native resource has to be serialized by the implementation.

mod ideal;
mod ideal_air;

#[cfg(feature = "coolprop")]
mod coolprop;

use crate::params::{FluidParam, HumidAirParam, InputPair, Phase};
use std::fmt;
use std::sync::{Arc, OnceLock};
use th_core::timing::{self, oracle_timing};
use thiserror::Error;

pub use ideal::IdealOracle;

#[cfg(feature = "coolprop")]
pub use coolprop::CoolPropOracle;

/// Identifier of an oracle-side state handle.
pub type HandleId = u64;

/// Result type for oracle calls.
pub type OracleResult<T> = Result<T, OracleError>;

/// Errors reported by a property oracle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// The quantity is undefined for this state or fluid.
    #[error("{key} is not available")]
    NotAvailable { key: String },

    /// The backend does not know the fluid.
    #[error("Unknown fluid '{fluid}' for backend {backend}")]
    UnknownFluid { backend: String, fluid: String },

    /// Unknown or already released handle.
    #[error("Invalid oracle handle {handle}")]
    InvalidHandle { handle: HandleId },

    /// The lock guarding a shared native resource is poisoned.
    #[error("Oracle lock is poisoned")]
    Lock,

    /// Any other failure (no convergence, input outside the backend's range, ...).
    #[error("{message}")]
    Failed { message: String },
}

impl OracleError {
    pub(crate) fn failed(message: impl Into<String>) -> Self {
        OracleError::Failed {
            message: message.into(),
        }
    }

    pub(crate) fn not_available(key: impl fmt::Display) -> Self {
        OracleError::NotAvailable {
            key: key.to_string(),
        }
    }
}

/// Property-evaluation engine.
pub trait PropertyOracle: Send + Sync {
    /// Backend name (for debugging/logging).
    fn name(&self) -> &str;

    /// Resolve an input-pair name such as `"HmassP_INPUTS"`.
    ///
    /// The default accepts every pair CoolProp knows.
    fn resolve_combination(&self, name: &str) -> Option<InputPair> {
        InputPair::from_name(name)
    }

    /// Create a state handle for `fluids` (`&`-separated for mixtures) on `backend`.
    fn create_handle(&self, backend: &str, fluids: &str) -> OracleResult<HandleId>;

    /// Set mixture mole fractions or the solution fraction of an incompressible fluid.
    fn set_fractions(&self, handle: HandleId, fractions: &[f64]) -> OracleResult<()>;

    fn release_handle(&self, handle: HandleId) -> OracleResult<()>;

    /// Commit a state to the handle.
    fn evaluate(&self, handle: HandleId, pair: InputPair, first: f64, second: f64)
    -> OracleResult<()>;

    /// Query a property of the committed state.
    fn keyed_output(&self, handle: HandleId, key: FluidParam) -> OracleResult<f64>;

    /// Force subsequent commits on the handle into a phase region.
    fn specify_phase(&self, handle: HandleId, phase: Phase) -> OracleResult<()>;

    fn unspecify_phase(&self, handle: HandleId) -> OracleResult<()>;

    /// Stateless humid-air query from three inputs.
    fn ha_props(
        &self,
        output: HumidAirParam,
        inputs: [(HumidAirParam, f64); 3],
    ) -> OracleResult<f64>;
}

/// Shared oracle used by constructors that do not take one explicitly.
///
/// Native CoolProp under the default `coolprop` feature. Builds without it
/// fall back to the closed-form [`IdealOracle`].
pub fn default_oracle() -> Arc<dyn PropertyOracle> {
    static DEFAULT: OnceLock<Arc<dyn PropertyOracle>> = OnceLock::new();
    DEFAULT
        .get_or_init(|| {
            #[cfg(feature = "coolprop")]
            let oracle: Arc<dyn PropertyOracle> = Arc::new(CoolPropOracle::new());
            #[cfg(not(feature = "coolprop"))]
            let oracle: Arc<dyn PropertyOracle> = Arc::new(IdealOracle::new());
            tracing::debug!(backend = oracle.name(), "default property oracle initialized");
            oracle
        })
        .clone()
}

/// Exclusively owned oracle-side handle.
///
/// Released exactly once: explicitly through [`OracleHandle::release`] or on drop.
pub struct OracleHandle {
    oracle: Arc<dyn PropertyOracle>,
    id: Option<HandleId>,
}

impl OracleHandle {
    /// Create a handle and, when given, apply fractions to it.
    pub fn create(
        oracle: Arc<dyn PropertyOracle>,
        backend: &str,
        fluids: &str,
        fractions: Option<&[f64]>,
    ) -> OracleResult<Self> {
        let id = {
            let _timer = timing::Timer::start(&oracle_timing::HANDLE_CREATION);
            oracle.create_handle(backend, fluids)?
        };
        let handle = Self {
            oracle,
            id: Some(id),
        };
        if let Some(fractions) = fractions {
            handle.oracle.set_fractions(id, fractions)?;
        }
        tracing::debug!(handle = id, backend, fluids, "oracle handle created");
        Ok(handle)
    }

    pub fn oracle(&self) -> &Arc<dyn PropertyOracle> {
        &self.oracle
    }

    /// Live handle id; fails once released.
    pub fn id(&self) -> OracleResult<HandleId> {
        self.id.ok_or(OracleError::failed("oracle handle already released"))
    }

    pub fn is_released(&self) -> bool {
        self.id.is_none()
    }

    pub fn evaluate(&self, pair: InputPair, first: f64, second: f64) -> OracleResult<()> {
        let id = self.id()?;
        let _timer = timing::Timer::start(&oracle_timing::EVALUATE);
        self.oracle.evaluate(id, pair, first, second)
    }

    pub fn keyed_output(&self, key: FluidParam) -> OracleResult<f64> {
        let id = self.id()?;
        let _timer = timing::Timer::start(&oracle_timing::KEYED_OUTPUT);
        self.oracle.keyed_output(id, key)
    }

    pub fn specify_phase(&self, phase: Phase) -> OracleResult<()> {
        self.oracle.specify_phase(self.id()?, phase)
    }

    pub fn unspecify_phase(&self) -> OracleResult<()> {
        self.oracle.unspecify_phase(self.id()?)
    }

    /// Release the native handle. Subsequent calls are no-ops.
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            match self.oracle.release_handle(id) {
                Ok(()) => tracing::debug!(handle = id, "oracle handle released"),
                Err(err) => tracing::warn!(handle = id, %err, "failed to release oracle handle"),
            }
        }
    }
}

impl Drop for OracleHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for OracleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleHandle")
            .field("oracle", &self.oracle.name())
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_release_is_idempotent() {
        let oracle: Arc<dyn PropertyOracle> = Arc::new(IdealOracle::new());
        let mut handle = OracleHandle::create(oracle, "HEOS", "Water", None).unwrap();
        assert!(!handle.is_released());
        handle.release();
        assert!(handle.is_released());
        handle.release();
        assert!(handle.id().is_err());
    }

    #[test]
    fn released_handle_rejects_calls() {
        let oracle: Arc<dyn PropertyOracle> = Arc::new(IdealOracle::new());
        let mut handle = OracleHandle::create(oracle, "HEOS", "Water", None).unwrap();
        handle.release();
        assert!(handle.evaluate(InputPair::PT, 101_325.0, 300.0).is_err());
        assert!(handle.keyed_output(FluidParam::T).is_err());
    }

    #[test]
    fn unknown_fluid_fails_handle_creation() {
        let oracle: Arc<dyn PropertyOracle> = Arc::new(IdealOracle::new());
        let err = OracleHandle::create(oracle, "HEOS", "Unobtainium", None).unwrap_err();
        assert!(matches!(err, OracleError::UnknownFluid { .. }));
    }

    #[test]
    fn default_oracle_is_shared() {
        let a = default_oracle();
        let b = default_oracle();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[cfg(feature = "coolprop")]
    #[test]
    fn default_oracle_is_coolprop() {
        assert_eq!(default_oracle().name(), "CoolProp");
    }
}
