//! th-fluids: thermodynamic and psychrometric states for thermostate.
//!
//! Provides:
//! - keyed inputs and input-pair resolution
//! - per-state property caching
//! - fluid, mixture and humid air states on a pluggable property oracle
//! - standard processes (compression, expansion, heat exchange, mixing, psychrometrics)
//! - fluid registry and unit parsing
//!
//! # Architecture
//!
//! Every state delegates property evaluation to a [`PropertyOracle`]. Native
//! CoolProp (via `rfluids`, default `coolprop` feature) backs the
//! [`default_oracle`]. The closed-form [`IdealOracle`] is always available and
//! is passed explicitly where deterministic reference values are wanted; it
//! stands in as the default only when the crate is built without `coolprop`.
//!
//! # Example
//!
//! ```no_run
//! use th_fluids::{AbstractFluid, Fluid, FluidInput, FluidName, FluidProcesses};
//!
//! let mut water = Fluid::new(FluidName::Water)?;
//! water.update(FluidInput::pressure(101_325.0), FluidInput::temperature(423.15))?;
//! let outlet = water.compression_to(202_650.0, 0.8)?;
//! println!("T2 = {} K", outlet.temperature()?);
//! # Ok::<(), th_fluids::FluidError>(())
//! ```

pub mod cache;
pub mod catalog;
pub mod composition;
pub mod error;
pub mod extended;
pub mod fluid;
pub mod humid_air;
pub mod input;
pub mod mixture;
pub mod oracle;
pub mod params;
pub mod process;
pub mod psychro;
pub mod resolver;
pub mod state;
pub mod units;

// Re-exports for ergonomics
pub use cache::PropertyCache;
pub use catalog::{FluidInfo, FluidName, filter_fluid_catalog, fluid_catalog};
pub use composition::Composition;
pub use error::{FluidError, FluidResult};
pub use extended::{Extended, ExtendedHumidAir};
pub use fluid::Fluid;
pub use humid_air::{AbstractHumidAir, HumidAir, HumidAirCore};
pub use input::{FluidInput, HumidAirInput, KeyedInput};
pub use mixture::Mixture;
pub use oracle::{
    HandleId, IdealOracle, OracleError, OracleHandle, OracleResult, PropertyOracle,
    default_oracle,
};
pub use params::{FluidParam, HumidAirParam, InputPair, Phase};
pub use process::{FluidProcesses, HeatTarget, SaturationAt};
pub use psychro::{HumidAirProcesses, HumidityTarget};
pub use resolver::{ResolvedPair, combination_name, resolve_pair};
pub use state::{AbstractFluid, StateCore};
pub use units::{Quantity, UnitError, parse_quantity};

#[cfg(feature = "coolprop")]
pub use oracle::CoolPropOracle;
