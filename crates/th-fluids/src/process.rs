//! Standard processes on fluid and mixture states.
//!
//! Every process validates its arguments first and then builds a new state
//! through [`AbstractFluid::with_state`]; the source state is never modified.

use crate::error::{FluidError, FluidResult};
use crate::input::FluidInput;
use crate::state::AbstractFluid;
use th_core::numeric::{Tolerances, ensure_finite, ensure_fraction, nearly_equal, weighted_mean};

/// Target of a heating or cooling process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeatTarget {
    /// Outlet temperature [K].
    Temperature(f64),
    /// Outlet mass specific enthalpy [J/kg].
    Enthalpy(f64),
}

impl HeatTarget {
    pub(crate) fn input(self) -> FluidInput {
        match self {
            HeatTarget::Temperature(t) => FluidInput::temperature(t),
            HeatTarget::Enthalpy(h) => FluidInput::enthalpy(h),
        }
    }
}

pub(crate) fn check_efficiency(machine: &'static str, value: f64) -> FluidResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(FluidError::Efficiency { machine, value })
    }
}

pub(crate) fn check_pressure_drop(value: f64) -> FluidResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(FluidError::Range {
            what: "pressure drop",
            value,
        })
    }
}

pub(crate) fn check_flow_weight(value: f64) -> FluidResult<()> {
    const WHAT: &str = "mass flow rate of a mixed stream";
    if ensure_finite(value, WHAT)? > 0.0 {
        Ok(())
    } else {
        Err(FluidError::Range { what: WHAT, value })
    }
}

pub(crate) fn check_same_pressure(first: f64, second: f64) -> FluidResult<()> {
    if nearly_equal(first, second, Tolerances::PRESSURE) {
        Ok(())
    } else {
        Err(FluidError::Consistency {
            what: "mixing possible only for flows with the same pressure",
        })
    }
}

/// Processes available on every [`AbstractFluid`].
pub trait FluidProcesses: AbstractFluid {
    /// Compression at constant entropy.
    fn isentropic_compression_to(&self, pressure: f64) -> FluidResult<Self> {
        if !(pressure > self.pressure()?) {
            return Err(FluidError::Direction {
                what: "compressor outlet pressure must exceed inlet pressure",
            });
        }
        self.with_state(
            FluidInput::pressure(pressure),
            FluidInput::entropy(self.entropy()?),
        )
    }

    /// Compression with an isentropic efficiency in (0, 1).
    fn compression_to(&self, pressure: f64, efficiency: f64) -> FluidResult<Self> {
        check_efficiency("compressor", efficiency)?;
        let ideal = self.isentropic_compression_to(pressure)?;
        let h1 = self.enthalpy()?;
        let h2s = ideal.enthalpy()?;
        self.with_state(
            FluidInput::pressure(pressure),
            FluidInput::enthalpy(h1 + (h2s - h1) / efficiency),
        )
    }

    /// Throttling at constant enthalpy.
    fn isenthalpic_expansion_to(&self, pressure: f64) -> FluidResult<Self> {
        check_expansion(self.pressure()?, pressure)?;
        self.with_state(
            FluidInput::pressure(pressure),
            FluidInput::enthalpy(self.enthalpy()?),
        )
    }

    /// Expansion at constant entropy.
    fn isentropic_expansion_to(&self, pressure: f64) -> FluidResult<Self> {
        check_expansion(self.pressure()?, pressure)?;
        self.with_state(
            FluidInput::pressure(pressure),
            FluidInput::entropy(self.entropy()?),
        )
    }

    /// Expansion with an isentropic efficiency in (0, 1).
    fn expansion_to(&self, pressure: f64, efficiency: f64) -> FluidResult<Self> {
        check_efficiency("expander", efficiency)?;
        let ideal = self.isentropic_expansion_to(pressure)?;
        let h1 = self.enthalpy()?;
        let h2s = ideal.enthalpy()?;
        self.with_state(
            FluidInput::pressure(pressure),
            FluidInput::enthalpy(h1 - (h1 - h2s) * efficiency),
        )
    }

    /// Heat removal to a lower temperature or enthalpy; `pressure_drop` [Pa] ≥ 0.
    fn cooling_to(&self, target: HeatTarget, pressure_drop: f64) -> FluidResult<Self> {
        let decreases = match target {
            HeatTarget::Temperature(t) => t < self.temperature()?,
            HeatTarget::Enthalpy(h) => h < self.enthalpy()?,
        };
        if !decreases {
            return Err(FluidError::Direction {
                what: match target {
                    HeatTarget::Temperature(_) => {
                        "during the cooling process, the temperature should decrease"
                    }
                    HeatTarget::Enthalpy(_) => {
                        "during the cooling process, the enthalpy should decrease"
                    }
                },
            });
        }
        check_pressure_drop(pressure_drop)?;
        self.with_state(
            FluidInput::pressure(self.pressure()? - pressure_drop),
            target.input(),
        )
    }

    /// Heat addition to a higher temperature or enthalpy; `pressure_drop` [Pa] ≥ 0.
    fn heating_to(&self, target: HeatTarget, pressure_drop: f64) -> FluidResult<Self> {
        let increases = match target {
            HeatTarget::Temperature(t) => t > self.temperature()?,
            HeatTarget::Enthalpy(h) => h > self.enthalpy()?,
        };
        if !increases {
            return Err(FluidError::Direction {
                what: match target {
                    HeatTarget::Temperature(_) => {
                        "during the heating process, the temperature should increase"
                    }
                    HeatTarget::Enthalpy(_) => {
                        "during the heating process, the enthalpy should increase"
                    }
                },
            });
        }
        check_pressure_drop(pressure_drop)?;
        self.with_state(
            FluidInput::pressure(self.pressure()? - pressure_drop),
            target.input(),
        )
    }

    /// Saturated liquid at the given pressure or temperature.
    fn bubble_point_at(&self, at: SaturationAt) -> FluidResult<Self> {
        self.with_state(at.input(), FluidInput::quality(0.0))
    }

    /// Saturated vapor at the given pressure or temperature.
    fn dew_point_at(&self, at: SaturationAt) -> FluidResult<Self> {
        self.with_state(at.input(), FluidInput::quality(1.0))
    }

    /// Two-phase point at a pressure and vapor quality (decimal).
    fn two_phase_point_at(&self, pressure: f64, quality: f64) -> FluidResult<Self> {
        ensure_fraction(quality, "vapor quality")?;
        self.with_state(FluidInput::pressure(pressure), FluidInput::quality(quality))
    }

    /// Adiabatic mixing of two streams at the same pressure.
    ///
    /// Both streams must have the receiver's composition; weights are mass flow rates.
    fn mixing(
        &self,
        first_weight: f64,
        first: &Self,
        second_weight: f64,
        second: &Self,
    ) -> FluidResult<Self> {
        if !(self.same_composition(first) && self.same_composition(second)) {
            return Err(FluidError::Consistency {
                what: "mixing possible only for the same fluids",
            });
        }
        let pressure = first.pressure()?;
        check_same_pressure(pressure, second.pressure()?)?;
        check_flow_weight(first_weight)?;
        check_flow_weight(second_weight)?;
        let enthalpy = weighted_mean(
            first_weight,
            first.enthalpy()?,
            second_weight,
            second.enthalpy()?,
        );
        self.with_state(
            FluidInput::pressure(pressure),
            FluidInput::enthalpy(enthalpy),
        )
    }
}

impl<T: AbstractFluid> FluidProcesses for T {}

/// Saturation-line anchor for bubble and dew points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaturationAt {
    /// Pressure [Pa].
    Pressure(f64),
    /// Temperature [K].
    Temperature(f64),
}

impl SaturationAt {
    fn input(self) -> FluidInput {
        match self {
            SaturationAt::Pressure(p) => FluidInput::pressure(p),
            SaturationAt::Temperature(t) => FluidInput::temperature(t),
        }
    }
}

fn check_expansion(inlet: f64, outlet: f64) -> FluidResult<()> {
    if outlet < inlet {
        Ok(())
    } else {
        Err(FluidError::Direction {
            what: "expansion outlet pressure must be lower than inlet pressure",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_is_an_open_interval() {
        assert!(check_efficiency("compressor", 0.8).is_ok());
        for value in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                check_efficiency("compressor", value),
                Err(FluidError::Efficiency { .. })
            ));
        }
    }

    #[test]
    fn pressure_drop_must_be_non_negative() {
        assert!(check_pressure_drop(0.0).is_ok());
        assert!(check_pressure_drop(5e3).is_ok());
        assert!(matches!(
            check_pressure_drop(-1.0),
            Err(FluidError::Range { .. })
        ));
    }

    #[test]
    fn flow_weights_must_be_positive() {
        assert!(check_flow_weight(1.0).is_ok());
        for value in [0.0, -2.0, f64::INFINITY, f64::NAN] {
            assert!(check_flow_weight(value).is_err());
        }
    }

    #[test]
    fn pressure_check_uses_tolerance() {
        assert!(check_same_pressure(101_325.0, 101_325.0 + 1e-7).is_ok());
        assert!(matches!(
            check_same_pressure(101_325.0, 2e5),
            Err(FluidError::Consistency { .. })
        ));
    }
}
