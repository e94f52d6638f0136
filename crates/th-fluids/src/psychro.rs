//! Psychrometric processes on humid air states.

use crate::error::{FluidError, FluidResult};
use crate::humid_air::AbstractHumidAir;
use crate::input::HumidAirInput;
use crate::process::{HeatTarget, check_flow_weight, check_pressure_drop, check_same_pressure};
use th_core::numeric::weighted_mean;

/// Outlet humidity of a psychrometric process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HumidityTarget {
    /// Relative humidity (decimal).
    Relative(f64),
    /// Humidity ratio [kg water / kg dry air].
    Absolute(f64),
}

impl HumidityTarget {
    fn input(self) -> HumidAirInput {
        match self {
            HumidityTarget::Relative(r) => HumidAirInput::relative_humidity(r),
            HumidityTarget::Absolute(w) => HumidAirInput::humidity(w),
        }
    }
}

fn heat_input(target: HeatTarget) -> HumidAirInput {
    match target {
        HeatTarget::Temperature(t) => HumidAirInput::temperature(t),
        HeatTarget::Enthalpy(h) => HumidAirInput::enthalpy(h),
    }
}

/// Whether `target` lies below (`lower`) or above the state's temperature or enthalpy.
fn moves<S: AbstractHumidAir>(state: &S, target: HeatTarget, lower: bool) -> FluidResult<bool> {
    let (new, current) = match target {
        HeatTarget::Temperature(t) => (t, state.temperature()?),
        HeatTarget::Enthalpy(h) => (h, state.enthalpy()?),
    };
    Ok(if lower { new < current } else { new > current })
}

fn cooling_direction(process: Process, target: HeatTarget) -> FluidError {
    let what = match (process, target) {
        (Process::Dry, HeatTarget::Temperature(_)) => {
            "during the dry cooling process, the temperature should decrease"
        }
        (Process::Dry, HeatTarget::Enthalpy(_)) => {
            "during the dry cooling process, the enthalpy should decrease"
        }
        (Process::Wet, HeatTarget::Temperature(_)) => {
            "during the wet cooling process, the temperature should decrease"
        }
        (Process::Wet, HeatTarget::Enthalpy(_)) => {
            "during the wet cooling process, the enthalpy should decrease"
        }
    };
    FluidError::Direction { what }
}

#[derive(Clone, Copy)]
enum Process {
    Dry,
    Wet,
}

/// Processes available on every [`AbstractHumidAir`].
pub trait HumidAirProcesses: AbstractHumidAir {
    /// Sensible cooling at constant humidity ratio; the outlet must not reach condensation.
    fn dry_cooling_to(&self, target: HeatTarget, pressure_drop: f64) -> FluidResult<Self> {
        if !moves(self, target, true)? {
            return Err(cooling_direction(Process::Dry, target));
        }
        let dew_temperature = self.dew_temperature()?;
        let above_dew_point = match target {
            HeatTarget::Temperature(t) => t >= dew_temperature,
            HeatTarget::Enthalpy(h) => {
                let saturated = self.with_state(
                    HumidAirInput::pressure(self.pressure()?),
                    HumidAirInput::temperature(dew_temperature),
                    HumidAirInput::relative_humidity(1.0),
                )?;
                h >= saturated.enthalpy()?
            }
        };
        if !above_dew_point {
            return Err(FluidError::Direction {
                what: "during the dry cooling process, the outlet must stay above the dew point",
            });
        }
        check_pressure_drop(pressure_drop)?;
        self.with_state(
            HumidAirInput::pressure(self.pressure()? - pressure_drop),
            heat_input(target),
            HumidAirInput::humidity(self.humidity()?),
        )
    }

    /// Cooling with dehumidification to an outlet humidity.
    fn wet_cooling_to(
        &self,
        target: HeatTarget,
        humidity: HumidityTarget,
        pressure_drop: f64,
    ) -> FluidResult<Self> {
        if !moves(self, target, true)? {
            return Err(cooling_direction(Process::Wet, target));
        }
        check_pressure_drop(pressure_drop)?;
        let result = self.with_state(
            HumidAirInput::pressure(self.pressure()? - pressure_drop),
            heat_input(target),
            humidity.input(),
        )?;
        if !(result.humidity()? < self.humidity()?) {
            return Err(FluidError::Direction {
                what: "during the wet cooling process, the absolute humidity ratio should decrease",
            });
        }
        Ok(result)
    }

    /// Sensible heating at constant humidity ratio.
    fn heating_to(&self, target: HeatTarget, pressure_drop: f64) -> FluidResult<Self> {
        if !moves(self, target, false)? {
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
            HumidAirInput::pressure(self.pressure()? - pressure_drop),
            heat_input(target),
            HumidAirInput::humidity(self.humidity()?),
        )
    }

    /// Adiabatic humidification by liquid water (constant enthalpy).
    fn humidification_by_water_to(&self, humidity: HumidityTarget) -> FluidResult<Self> {
        let result = self.with_state(
            HumidAirInput::pressure(self.pressure()?),
            HumidAirInput::enthalpy(self.enthalpy()?),
            humidity.input(),
        )?;
        check_humidification(self, &result)?;
        Ok(result)
    }

    /// Humidification by steam (constant temperature).
    fn humidification_by_steam_to(&self, humidity: HumidityTarget) -> FluidResult<Self> {
        let result = self.with_state(
            HumidAirInput::pressure(self.pressure()?),
            HumidAirInput::temperature(self.temperature()?),
            humidity.input(),
        )?;
        check_humidification(self, &result)?;
        Ok(result)
    }

    /// Adiabatic mixing of two humid air streams at the same pressure.
    ///
    /// Weights are mass flow rates of humid air. The outlet humidity ratio
    /// follows from the water and dry-air balances.
    fn mixing(
        &self,
        first_weight: f64,
        first: &Self,
        second_weight: f64,
        second: &Self,
    ) -> FluidResult<Self> {
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
        let (w1, w2) = (first.humidity()?, second.humidity()?);
        let dry1 = first_weight / (1.0 + w1);
        let dry2 = second_weight / (1.0 + w2);
        let humidity = weighted_mean(dry1, w1, dry2, w2);
        self.with_state(
            HumidAirInput::pressure(pressure),
            HumidAirInput::enthalpy(enthalpy),
            HumidAirInput::humidity(humidity),
        )
    }
}

impl<T: AbstractHumidAir> HumidAirProcesses for T {}

fn check_humidification<S: AbstractHumidAir>(source: &S, result: &S) -> FluidResult<()> {
    if result.humidity()? > source.humidity()? {
        Ok(())
    } else {
        Err(FluidError::Direction {
            what: "during the humidification process, the absolute humidity ratio should increase",
        })
    }
}
