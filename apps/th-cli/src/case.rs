//! Case files: YAML schema and validation into SI-valued steps.
//!
//! A case names a working medium, its defining inputs (text with units) and an
//! ordered chain of processes, each applied to the previous outlet.
//!
//! ```yaml
//! name: steam compression
//! medium:
//!   kind: fluid
//!   name: Water
//! inputs:
//!   pressure: 1 atm
//!   temperature: 150 C
//! processes:
//!   - type: compression
//!     pressure: 2 atm
//!     efficiency: 80 %
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use th_fluids::{
    Composition, FluidInput, FluidName, FluidProcesses, FluidResult, HeatTarget, HumidAirInput,
    HumidAirProcesses, HumidityTarget, Phase, Quantity, SaturationAt, parse_quantity,
};

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDef {
    pub name: String,
    pub medium: MediumDef,
    pub inputs: BTreeMap<InputKeyDef, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PhaseDef>,
    #[serde(default)]
    pub processes: Vec<ProcessDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediumDef {
    Fluid {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fraction: Option<String>,
    },
    Mixture {
        components: Vec<ComponentDef>,
    },
    HumidAir,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    pub fraction: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InputKeyDef {
    Pressure,
    Temperature,
    Density,
    Enthalpy,
    Entropy,
    InternalEnergy,
    Quality,
    Altitude,
    Humidity,
    RelativeHumidity,
    DewTemperature,
    WetBulbTemperature,
    PartialPressure,
}

impl InputKeyDef {
    fn name(self) -> &'static str {
        match self {
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::Density => "density",
            Self::Enthalpy => "enthalpy",
            Self::Entropy => "entropy",
            Self::InternalEnergy => "internal_energy",
            Self::Quality => "quality",
            Self::Altitude => "altitude",
            Self::Humidity => "humidity",
            Self::RelativeHumidity => "relative_humidity",
            Self::DewTemperature => "dew_temperature",
            Self::WetBulbTemperature => "wet_bulb_temperature",
            Self::PartialPressure => "partial_pressure",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDef {
    Liquid,
    Gas,
    TwoPhase,
    Supercritical,
    SupercriticalGas,
    SupercriticalLiquid,
    CriticalPoint,
}

impl From<PhaseDef> for Phase {
    fn from(def: PhaseDef) -> Self {
        match def {
            PhaseDef::Liquid => Phase::Liquid,
            PhaseDef::Gas => Phase::Gas,
            PhaseDef::TwoPhase => Phase::TwoPhase,
            PhaseDef::Supercritical => Phase::Supercritical,
            PhaseDef::SupercriticalGas => Phase::SupercriticalGas,
            PhaseDef::SupercriticalLiquid => Phase::SupercriticalLiquid,
            PhaseDef::CriticalPoint => Phase::CriticalPoint,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessDef {
    IsentropicCompression { pressure: String },
    Compression { pressure: String, efficiency: String },
    IsenthalpicExpansion { pressure: String },
    IsentropicExpansion { pressure: String },
    Expansion { pressure: String, efficiency: String },
    Cooling(HeatDef),
    Heating(HeatDef),
    BubblePoint(SaturationDef),
    DewPoint(SaturationDef),
    TwoPhasePoint { pressure: String, quality: String },
    DryCooling(HeatDef),
    WetCooling(WetCoolingDef),
    HumidificationByWater(HumidityDef),
    HumidificationBySteam(HumidityDef),
}

/// Heat exchanger outlet: exactly one of `temperature` / `enthalpy`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HeatDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enthalpy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_drop: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SaturationDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HumidityDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WetCoolingDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enthalpy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_drop: Option<String>,
}

/// A validated case with every value in SI.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub name: String,
    pub phase: Option<Phase>,
    pub medium: Medium,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Medium {
    Fluid {
        name: FluidName,
        fraction: Option<f64>,
        inputs: [FluidInput; 2],
        steps: Vec<FluidStep>,
    },
    Mixture {
        composition: Composition,
        inputs: [FluidInput; 2],
        steps: Vec<FluidStep>,
    },
    HumidAir {
        inputs: [HumidAirInput; 3],
        steps: Vec<AirStep>,
    },
}

impl Medium {
    pub fn step_count(&self) -> usize {
        match self {
            Medium::Fluid { steps, .. } | Medium::Mixture { steps, .. } => steps.len(),
            Medium::HumidAir { steps, .. } => steps.len(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Medium::Fluid {
                name,
                fraction: Some(x),
                ..
            } => format!("{name} ({:.1} %)", x * 100.0),
            Medium::Fluid { name, .. } => name.to_string(),
            Medium::Mixture { composition, .. } => composition
                .fluids()
                .zip(composition.fractions())
                .map(|(fluid, x)| format!("{fluid} {x}"))
                .collect::<Vec<_>>()
                .join(" / "),
            Medium::HumidAir { .. } => "Humid air".to_string(),
        }
    }
}

/// A process on a fluid or mixture stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluidStep {
    IsentropicCompression { pressure: f64 },
    Compression { pressure: f64, efficiency: f64 },
    IsenthalpicExpansion { pressure: f64 },
    IsentropicExpansion { pressure: f64 },
    Expansion { pressure: f64, efficiency: f64 },
    Cooling { target: HeatTarget, pressure_drop: f64 },
    Heating { target: HeatTarget, pressure_drop: f64 },
    BubblePoint(SaturationAt),
    DewPoint(SaturationAt),
    TwoPhasePoint { pressure: f64, quality: f64 },
}

impl FluidStep {
    pub fn label(&self) -> &'static str {
        match self {
            Self::IsentropicCompression { .. } => "isentropic compression",
            Self::Compression { .. } => "compression",
            Self::IsenthalpicExpansion { .. } => "isenthalpic expansion",
            Self::IsentropicExpansion { .. } => "isentropic expansion",
            Self::Expansion { .. } => "expansion",
            Self::Cooling { .. } => "cooling",
            Self::Heating { .. } => "heating",
            Self::BubblePoint(_) => "bubble point",
            Self::DewPoint(_) => "dew point",
            Self::TwoPhasePoint { .. } => "two-phase point",
        }
    }

    pub fn apply<S: FluidProcesses>(&self, state: &S) -> FluidResult<S> {
        match *self {
            Self::IsentropicCompression { pressure } => state.isentropic_compression_to(pressure),
            Self::Compression {
                pressure,
                efficiency,
            } => state.compression_to(pressure, efficiency),
            Self::IsenthalpicExpansion { pressure } => state.isenthalpic_expansion_to(pressure),
            Self::IsentropicExpansion { pressure } => state.isentropic_expansion_to(pressure),
            Self::Expansion {
                pressure,
                efficiency,
            } => state.expansion_to(pressure, efficiency),
            Self::Cooling {
                target,
                pressure_drop,
            } => state.cooling_to(target, pressure_drop),
            Self::Heating {
                target,
                pressure_drop,
            } => FluidProcesses::heating_to(state, target, pressure_drop),
            Self::BubblePoint(at) => state.bubble_point_at(at),
            Self::DewPoint(at) => state.dew_point_at(at),
            Self::TwoPhasePoint { pressure, quality } => {
                state.two_phase_point_at(pressure, quality)
            }
        }
    }
}

/// A psychrometric process on a humid air stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AirStep {
    DryCooling {
        target: HeatTarget,
        pressure_drop: f64,
    },
    WetCooling {
        target: HeatTarget,
        humidity: HumidityTarget,
        pressure_drop: f64,
    },
    Heating {
        target: HeatTarget,
        pressure_drop: f64,
    },
    HumidificationByWater(HumidityTarget),
    HumidificationBySteam(HumidityTarget),
}

impl AirStep {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DryCooling { .. } => "dry cooling",
            Self::WetCooling { .. } => "wet cooling",
            Self::Heating { .. } => "heating",
            Self::HumidificationByWater(_) => "humidification by water",
            Self::HumidificationBySteam(_) => "humidification by steam",
        }
    }

    pub fn apply<S: HumidAirProcesses>(&self, state: &S) -> FluidResult<S> {
        match *self {
            Self::DryCooling {
                target,
                pressure_drop,
            } => state.dry_cooling_to(target, pressure_drop),
            Self::WetCooling {
                target,
                humidity,
                pressure_drop,
            } => state.wet_cooling_to(target, humidity, pressure_drop),
            Self::Heating {
                target,
                pressure_drop,
            } => HumidAirProcesses::heating_to(state, target, pressure_drop),
            Self::HumidificationByWater(humidity) => state.humidification_by_water_to(humidity),
            Self::HumidificationBySteam(humidity) => state.humidification_by_steam_to(humidity),
        }
    }
}

/// Load and validate a case from a YAML file.
pub fn load_case(path: &Path) -> CliResult<Case> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::CaseFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_case(&content)
}

/// Parse and validate a case from YAML text.
pub fn parse_case(content: &str) -> CliResult<Case> {
    let def: CaseDef =
        serde_yaml::from_str(content).map_err(|e| CliError::CaseParse(e.to_string()))?;
    Case::from_def(&def)
}

impl Case {
    pub fn from_def(def: &CaseDef) -> CliResult<Self> {
        if def.name.trim().is_empty() {
            return Err(CliError::Validation("case name must not be empty".to_string()));
        }
        let phase = def.phase.map(Phase::from);

        let medium = match &def.medium {
            MediumDef::Fluid { name, fraction } => {
                let name: FluidName = name.parse()?;
                let fraction = fraction
                    .as_deref()
                    .map(|text| quantity("medium.fraction", text, Quantity::Fraction))
                    .transpose()?;
                name.check_fraction(fraction)?;
                Medium::Fluid {
                    name,
                    fraction,
                    inputs: fluid_inputs(&def.inputs)?,
                    steps: fluid_steps(&def.processes)?,
                }
            }
            MediumDef::Mixture { components } => {
                let mut fluids = Vec::with_capacity(components.len());
                let mut fractions = Vec::with_capacity(components.len());
                for (i, component) in components.iter().enumerate() {
                    fluids.push(component.name.parse::<FluidName>()?);
                    fractions.push(quantity(
                        &format!("medium.components[{i}].fraction"),
                        &component.fraction,
                        Quantity::Fraction,
                    )?);
                }
                Medium::Mixture {
                    composition: Composition::new(&fluids, &fractions)?,
                    inputs: fluid_inputs(&def.inputs)?,
                    steps: fluid_steps(&def.processes)?,
                }
            }
            MediumDef::HumidAir => {
                if phase.is_some() {
                    return Err(CliError::Validation(
                        "a phase cannot be imposed on humid air".to_string(),
                    ));
                }
                Medium::HumidAir {
                    inputs: humid_air_inputs(&def.inputs)?,
                    steps: air_steps(&def.processes)?,
                }
            }
        };

        Ok(Self {
            name: def.name.clone(),
            phase,
            medium,
        })
    }
}

fn quantity(field: &str, text: &str, quantity: Quantity) -> CliResult<f64> {
    parse_quantity(text, quantity).map_err(|source| CliError::Unit {
        field: field.to_string(),
        text: text.to_string(),
        source,
    })
}

fn optional(field: &str, text: Option<&String>, q: Quantity) -> CliResult<Option<f64>> {
    text.map(|t| quantity(field, t, q)).transpose()
}

fn fluid_inputs(inputs: &BTreeMap<InputKeyDef, String>) -> CliResult<[FluidInput; 2]> {
    let parsed = inputs
        .iter()
        .map(|(&key, text)| {
            let field = format!("inputs.{}", key.name());
            let input = match key {
                InputKeyDef::Pressure => {
                    FluidInput::pressure(quantity(&field, text, Quantity::Pressure)?)
                }
                InputKeyDef::Temperature => {
                    FluidInput::temperature(quantity(&field, text, Quantity::Temperature)?)
                }
                InputKeyDef::Density => {
                    FluidInput::density(quantity(&field, text, Quantity::Density)?)
                }
                InputKeyDef::Enthalpy => {
                    FluidInput::enthalpy(quantity(&field, text, Quantity::SpecificEnergy)?)
                }
                InputKeyDef::InternalEnergy => {
                    FluidInput::internal_energy(quantity(&field, text, Quantity::SpecificEnergy)?)
                }
                InputKeyDef::Entropy => {
                    FluidInput::entropy(quantity(&field, text, Quantity::SpecificEntropy)?)
                }
                InputKeyDef::Quality => {
                    FluidInput::quality(quantity(&field, text, Quantity::Fraction)?)
                }
                other => {
                    return Err(CliError::Validation(format!(
                        "input '{}' does not apply to a fluid",
                        other.name()
                    )));
                }
            };
            Ok(input)
        })
        .collect::<CliResult<Vec<_>>>()?;

    <[FluidInput; 2]>::try_from(parsed).map_err(|parsed| {
        CliError::Validation(format!(
            "a fluid state needs exactly 2 inputs, got {}",
            parsed.len()
        ))
    })
}

fn humid_air_inputs(inputs: &BTreeMap<InputKeyDef, String>) -> CliResult<[HumidAirInput; 3]> {
    let parsed = inputs
        .iter()
        .map(|(&key, text)| {
            let field = format!("inputs.{}", key.name());
            let input = match key {
                InputKeyDef::Pressure => {
                    HumidAirInput::pressure(quantity(&field, text, Quantity::Pressure)?)
                }
                InputKeyDef::Altitude => {
                    HumidAirInput::altitude(quantity(&field, text, Quantity::Length)?)?
                }
                InputKeyDef::Temperature => {
                    HumidAirInput::temperature(quantity(&field, text, Quantity::Temperature)?)
                }
                InputKeyDef::Density => {
                    HumidAirInput::density(quantity(&field, text, Quantity::Density)?)
                }
                InputKeyDef::Enthalpy => {
                    HumidAirInput::enthalpy(quantity(&field, text, Quantity::SpecificEnergy)?)
                }
                InputKeyDef::Entropy => {
                    HumidAirInput::entropy(quantity(&field, text, Quantity::SpecificEntropy)?)
                }
                InputKeyDef::Humidity => {
                    HumidAirInput::humidity(quantity(&field, text, Quantity::HumidityRatio)?)
                }
                InputKeyDef::RelativeHumidity => HumidAirInput::relative_humidity(quantity(
                    &field,
                    text,
                    Quantity::Fraction,
                )?),
                InputKeyDef::DewTemperature => {
                    HumidAirInput::dew_temperature(quantity(&field, text, Quantity::Temperature)?)
                }
                InputKeyDef::WetBulbTemperature => HumidAirInput::wet_bulb_temperature(
                    quantity(&field, text, Quantity::Temperature)?,
                ),
                InputKeyDef::PartialPressure => {
                    HumidAirInput::partial_pressure(quantity(&field, text, Quantity::Pressure)?)
                }
                other => {
                    return Err(CliError::Validation(format!(
                        "input '{}' does not apply to humid air",
                        other.name()
                    )));
                }
            };
            Ok(input)
        })
        .collect::<CliResult<Vec<_>>>()?;

    <[HumidAirInput; 3]>::try_from(parsed).map_err(|parsed| {
        CliError::Validation(format!(
            "a humid air state needs exactly 3 inputs, got {}",
            parsed.len()
        ))
    })
}

fn heat_target(
    field: &str,
    temperature: Option<&String>,
    enthalpy: Option<&String>,
) -> CliResult<HeatTarget> {
    match (temperature, enthalpy) {
        (Some(t), None) => Ok(HeatTarget::Temperature(quantity(
            &format!("{field}.temperature"),
            t,
            Quantity::Temperature,
        )?)),
        (None, Some(h)) => Ok(HeatTarget::Enthalpy(quantity(
            &format!("{field}.enthalpy"),
            h,
            Quantity::SpecificEnergy,
        )?)),
        _ => Err(CliError::Validation(format!(
            "{field}: give exactly one of 'temperature' or 'enthalpy'"
        ))),
    }
}

fn humidity_target(
    field: &str,
    relative: Option<&String>,
    absolute: Option<&String>,
) -> CliResult<HumidityTarget> {
    match (relative, absolute) {
        (Some(r), None) => Ok(HumidityTarget::Relative(quantity(
            &format!("{field}.relative_humidity"),
            r,
            Quantity::Fraction,
        )?)),
        (None, Some(w)) => Ok(HumidityTarget::Absolute(quantity(
            &format!("{field}.humidity"),
            w,
            Quantity::HumidityRatio,
        )?)),
        _ => Err(CliError::Validation(format!(
            "{field}: give exactly one of 'relative_humidity' or 'humidity'"
        ))),
    }
}

fn pressure_drop(field: &str, text: Option<&String>) -> CliResult<f64> {
    Ok(optional(&format!("{field}.pressure_drop"), text, Quantity::PressureDrop)?.unwrap_or(0.0))
}

fn saturation(field: &str, def: &SaturationDef) -> CliResult<SaturationAt> {
    match (&def.pressure, &def.temperature) {
        (Some(p), None) => Ok(SaturationAt::Pressure(quantity(
            &format!("{field}.pressure"),
            p,
            Quantity::Pressure,
        )?)),
        (None, Some(t)) => Ok(SaturationAt::Temperature(quantity(
            &format!("{field}.temperature"),
            t,
            Quantity::Temperature,
        )?)),
        _ => Err(CliError::Validation(format!(
            "{field}: give exactly one of 'pressure' or 'temperature'"
        ))),
    }
}

fn fluid_steps(processes: &[ProcessDef]) -> CliResult<Vec<FluidStep>> {
    processes
        .iter()
        .enumerate()
        .map(|(i, process)| {
            let field = format!("processes[{i}]");
            let pressure = |text: &str| quantity(&format!("{field}.pressure"), text, Quantity::Pressure);
            let efficiency =
                |text: &str| quantity(&format!("{field}.efficiency"), text, Quantity::Fraction);
            let step = match process {
                ProcessDef::IsentropicCompression { pressure: p } => {
                    FluidStep::IsentropicCompression {
                        pressure: pressure(p)?,
                    }
                }
                ProcessDef::Compression {
                    pressure: p,
                    efficiency: e,
                } => FluidStep::Compression {
                    pressure: pressure(p)?,
                    efficiency: efficiency(e)?,
                },
                ProcessDef::IsenthalpicExpansion { pressure: p } => {
                    FluidStep::IsenthalpicExpansion {
                        pressure: pressure(p)?,
                    }
                }
                ProcessDef::IsentropicExpansion { pressure: p } => {
                    FluidStep::IsentropicExpansion {
                        pressure: pressure(p)?,
                    }
                }
                ProcessDef::Expansion {
                    pressure: p,
                    efficiency: e,
                } => FluidStep::Expansion {
                    pressure: pressure(p)?,
                    efficiency: efficiency(e)?,
                },
                ProcessDef::Cooling(heat) => FluidStep::Cooling {
                    target: heat_target(&field, heat.temperature.as_ref(), heat.enthalpy.as_ref())?,
                    pressure_drop: pressure_drop(&field, heat.pressure_drop.as_ref())?,
                },
                ProcessDef::Heating(heat) => FluidStep::Heating {
                    target: heat_target(&field, heat.temperature.as_ref(), heat.enthalpy.as_ref())?,
                    pressure_drop: pressure_drop(&field, heat.pressure_drop.as_ref())?,
                },
                ProcessDef::BubblePoint(at) => FluidStep::BubblePoint(saturation(&field, at)?),
                ProcessDef::DewPoint(at) => FluidStep::DewPoint(saturation(&field, at)?),
                ProcessDef::TwoPhasePoint {
                    pressure: p,
                    quality,
                } => FluidStep::TwoPhasePoint {
                    pressure: pressure(p)?,
                    quality: quantity(&format!("{field}.quality"), quality, Quantity::Fraction)?,
                },
                other => {
                    return Err(CliError::Validation(format!(
                        "{field}: {} applies only to humid air",
                        process_name(other)
                    )));
                }
            };
            Ok(step)
        })
        .collect()
}

fn air_steps(processes: &[ProcessDef]) -> CliResult<Vec<AirStep>> {
    processes
        .iter()
        .enumerate()
        .map(|(i, process)| {
            let field = format!("processes[{i}]");
            let step = match process {
                ProcessDef::DryCooling(heat) => AirStep::DryCooling {
                    target: heat_target(&field, heat.temperature.as_ref(), heat.enthalpy.as_ref())?,
                    pressure_drop: pressure_drop(&field, heat.pressure_drop.as_ref())?,
                },
                ProcessDef::WetCooling(wet) => AirStep::WetCooling {
                    target: heat_target(&field, wet.temperature.as_ref(), wet.enthalpy.as_ref())?,
                    humidity: humidity_target(
                        &field,
                        wet.relative_humidity.as_ref(),
                        wet.humidity.as_ref(),
                    )?,
                    pressure_drop: pressure_drop(&field, wet.pressure_drop.as_ref())?,
                },
                ProcessDef::Heating(heat) => AirStep::Heating {
                    target: heat_target(&field, heat.temperature.as_ref(), heat.enthalpy.as_ref())?,
                    pressure_drop: pressure_drop(&field, heat.pressure_drop.as_ref())?,
                },
                ProcessDef::HumidificationByWater(h) => AirStep::HumidificationByWater(
                    humidity_target(&field, h.relative_humidity.as_ref(), h.humidity.as_ref())?,
                ),
                ProcessDef::HumidificationBySteam(h) => AirStep::HumidificationBySteam(
                    humidity_target(&field, h.relative_humidity.as_ref(), h.humidity.as_ref())?,
                ),
                other => {
                    return Err(CliError::Validation(format!(
                        "{field}: {} does not apply to humid air",
                        process_name(other)
                    )));
                }
            };
            Ok(step)
        })
        .collect()
}

fn process_name(process: &ProcessDef) -> &'static str {
    match process {
        ProcessDef::IsentropicCompression { .. } => "isentropic_compression",
        ProcessDef::Compression { .. } => "compression",
        ProcessDef::IsenthalpicExpansion { .. } => "isenthalpic_expansion",
        ProcessDef::IsentropicExpansion { .. } => "isentropic_expansion",
        ProcessDef::Expansion { .. } => "expansion",
        ProcessDef::Cooling(_) => "cooling",
        ProcessDef::Heating(_) => "heating",
        ProcessDef::BubblePoint(_) => "bubble_point",
        ProcessDef::DewPoint(_) => "dew_point",
        ProcessDef::TwoPhasePoint { .. } => "two_phase_point",
        ProcessDef::DryCooling(_) => "dry_cooling",
        ProcessDef::WetCooling(_) => "wet_cooling",
        ProcessDef::HumidificationByWater(_) => "humidification_by_water",
        ProcessDef::HumidificationBySteam(_) => "humidification_by_steam",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use th_fluids::{FluidError, HumidAirParam, KeyedInput};

    const STEAM: &str = r#"
name: steam compression
medium:
  kind: fluid
  name: water
inputs:
  pressure: 1 atm
  temperature: 150 C
phase: gas
processes:
  - type: compression
    pressure: 2 atm
    efficiency: 80 %
  - type: cooling
    temperature: 400 K
    pressure_drop: 1 kPa
"#;

    #[test]
    fn parses_a_fluid_case_into_si() {
        let case = parse_case(STEAM).unwrap();
        assert_eq!(case.name, "steam compression");
        assert_eq!(case.phase, Some(Phase::Gas));
        let Medium::Fluid {
            name,
            fraction,
            inputs,
            steps,
        } = case.medium
        else {
            panic!("expected a fluid medium");
        };
        assert_eq!(name, FluidName::Water);
        assert_eq!(fraction, None);
        let values: Vec<f64> = inputs.iter().map(|input| input.value()).collect();
        assert!(values.contains(&101_325.0));
        assert!(values.iter().any(|v| (v - 423.15).abs() < 1e-9));
        assert_eq!(
            steps[0],
            FluidStep::Compression {
                pressure: 202_650.0,
                efficiency: 0.8
            }
        );
        assert_eq!(
            steps[1],
            FluidStep::Cooling {
                target: HeatTarget::Temperature(400.0),
                pressure_drop: 1_000.0
            }
        );
    }

    #[test]
    fn parses_a_humid_air_case() {
        let case = parse_case(
            r#"
name: air handling
medium:
  kind: humid_air
inputs:
  altitude: 0 m
  temperature: 30 C
  relative_humidity: 50 %
processes:
  - type: wet_cooling
    temperature: 15 C
    relative_humidity: 90 %
  - type: heating
    temperature: 22 C
    pressure_drop: 100 Pa
"#,
        )
        .unwrap();
        let Medium::HumidAir { inputs, steps } = case.medium else {
            panic!("expected humid air");
        };
        assert!(inputs.iter().any(|input| input.key() == HumidAirParam::P));
        assert_eq!(steps.len(), 2);
        match steps[0] {
            AirStep::WetCooling {
                target: HeatTarget::Temperature(t),
                humidity: HumidityTarget::Relative(r),
                pressure_drop,
            } => {
                assert_relative_eq!(t, 288.15, max_relative = 1e-12);
                assert_relative_eq!(r, 0.9, max_relative = 1e-12);
                assert_eq!(pressure_drop, 0.0);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn parses_a_mixture_case() {
        let case = parse_case(
            r#"
name: blend
medium:
  kind: mixture
  components:
    - { name: R32, fraction: "50 %" }
    - { name: R134a, fraction: "0.5" }
inputs:
  pressure: 2 bar
  temperature: 300 K
"#,
        )
        .unwrap();
        assert_eq!(case.medium.describe(), "R32 0.5 / R134a 0.5");
        assert_eq!(case.medium.step_count(), 0);
    }

    #[test]
    fn rejects_wrong_input_counts() {
        let err = parse_case(
            r#"
name: one input
medium: { kind: fluid, name: Water }
inputs:
  pressure: 1 bar
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly 2 inputs"));

        let err = parse_case(
            r#"
name: two inputs
medium: { kind: humid_air }
inputs:
  pressure: 1 bar
  temperature: 20 C
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly 3 inputs"));
    }

    #[test]
    fn rejects_inputs_and_processes_for_the_wrong_medium() {
        let err = parse_case(
            r#"
name: humid water
medium: { kind: fluid, name: Water }
inputs:
  pressure: 1 bar
  relative_humidity: 50 %
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not apply to a fluid"));

        let err = parse_case(
            r#"
name: wet steam
medium: { kind: fluid, name: Water }
inputs:
  pressure: 1 bar
  temperature: 150 C
processes:
  - type: dry_cooling
    temperature: 120 C
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("applies only to humid air"));

        let err = parse_case(
            r#"
name: compressed air
medium: { kind: humid_air }
inputs:
  pressure: 1 bar
  temperature: 20 C
  relative_humidity: 50 %
processes:
  - type: isentropic_compression
    pressure: 2 bar
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not apply to humid air"));
    }

    #[test]
    fn heat_targets_need_exactly_one_value() {
        let err = parse_case(
            r#"
name: ambiguous
medium: { kind: fluid, name: Water }
inputs: { pressure: 1 bar, temperature: 150 C }
processes:
  - type: heating
    temperature: 200 C
    enthalpy: 2900 kJ/kg
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }

    #[test]
    fn fractions_are_checked_on_load() {
        let err = parse_case(
            r#"
name: glycol
medium: { kind: fluid, name: MEG }
inputs: { pressure: 1 bar, temperature: 20 C }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Fluid(FluidError::InvalidArg { .. })));

        let err = parse_case(
            r#"
name: unknown
medium: { kind: fluid, name: Unobtainium }
inputs: { pressure: 1 bar, temperature: 20 C }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown fluid"));
    }

    #[test]
    fn unit_errors_name_the_field() {
        let err = parse_case(
            r#"
name: bad units
medium: { kind: fluid, name: Water }
inputs: { pressure: 1 furlong, temperature: 20 C }
"#,
        )
        .unwrap_err();
        match err {
            CliError::Unit { field, text, .. } => {
                assert_eq!(field, "inputs.pressure");
                assert_eq!(text, "1 furlong");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn humid_air_rejects_a_phase() {
        let err = parse_case(
            r#"
name: phased air
medium: { kind: humid_air }
inputs: { pressure: 1 bar, temperature: 20 C, relative_humidity: 50 % }
phase: gas
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot be imposed"));
    }

    #[test]
    fn bundled_cases_are_valid() {
        let steam = parse_case(include_str!("../cases/steam_cycle.yaml")).unwrap();
        assert_eq!(steam.medium.step_count(), 3);
        let air = parse_case(include_str!("../cases/air_handling.yaml")).unwrap();
        assert_eq!(air.medium.describe(), "Humid air");
        assert_eq!(air.medium.step_count(), 2);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            parse_case("name: [unclosed"),
            Err(CliError::CaseParse(_))
        ));
    }
}
