//! Error types for the command-line front end.

use std::path::PathBuf;
use th_fluids::{FluidError, UnitError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read case file: {path}")]
    CaseFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse case YAML: {0}")]
    CaseParse(String),

    #[error("Case validation failed: {0}")]
    Validation(String),

    #[error("Invalid value '{text}' for {field}: {source}")]
    Unit {
        field: String,
        text: String,
        source: UnitError,
    },

    #[error("Step {step} ({label}) failed: {source}")]
    Step {
        step: usize,
        label: String,
        source: FluidError,
    },

    #[error(transparent)]
    Fluid(#[from] FluidError),

    #[error("Failed to render report: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
