//! Fluid state and process errors.

use crate::oracle::OracleError;
use th_core::CoreError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur while defining states, reading properties or running processes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Wrong number of inputs, duplicate keys, unresolvable combination or no defined state.
    #[error("Need to define {count} unique inputs")]
    Definition { count: usize },

    /// The oracle returned ±infinity or NaN for a property.
    #[error("Invalid or not defined state (requested {key})")]
    InvalidState { key: String },

    /// A process precondition on the sign or direction of change is violated.
    #[error("Invalid process: {what}")]
    Direction { what: &'static str },

    /// Isentropic efficiency outside the open interval (0, 1).
    #[error("Invalid {machine} isentropic efficiency: {value}")]
    Efficiency { machine: &'static str, value: f64 },

    /// Mixing streams that do not share a pressure or a composition.
    #[error("Inconsistent streams: {what}")]
    Consistency { what: &'static str },

    /// A derived or auxiliary input outside its physically valid domain.
    #[error("Invalid {what}: {value}")]
    Range { what: &'static str, value: f64 },

    /// Invalid construction argument (unknown fluid, malformed mixture, ...).
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    /// The oracle reports the quantity is undefined for this state or fluid.
    #[error("Property {key} is not available for this state")]
    NotAvailable { key: String },

    /// Any other oracle failure.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl FluidError {
    /// Errors that a nullable property read converts into "no value".
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            FluidError::InvalidState { .. } | FluidError::NotAvailable { .. }
        )
    }
}

impl From<OracleError> for FluidError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::NotAvailable { key } => FluidError::NotAvailable { key },
            other => FluidError::Backend {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for FluidError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { what, value } | CoreError::OutOfRange { what, value } => {
                FluidError::Range { what, value }
            }
            CoreError::InvalidArg { what } | CoreError::Invariant { what } => {
                FluidError::InvalidArg { what }
            }
        }
    }
}

impl From<FluidError> for CoreError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::Range { what, value } => CoreError::OutOfRange { what, value },
            FluidError::InvalidArg { what } => CoreError::InvalidArg { what },
            other => CoreError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
