//! Running a case and rendering its state points.

use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use th_core::units::{k, pa};
use th_fluids::{
    AbstractFluid, AbstractHumidAir, Fluid, FluidError, FluidInput, FluidProcesses, HumidAir,
    HumidAirInput, Mixture, Phase, PropertyOracle,
};
use tracing::{debug, info};
use uom::si::pressure::kilopascal;
use uom::si::thermodynamic_temperature::degree_celsius;

use crate::case::{AirStep, Case, FluidStep, Medium};
use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CaseReport {
    pub case: String,
    pub medium: String,
    pub points: Vec<PointReport>,
}

/// One state point; SI units throughout.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PointReport {
    pub label: String,
    pub pressure_pa: f64,
    pub temperature_k: f64,
    pub enthalpy_j_kg: f64,
    pub entropy_j_kg_k: f64,
    pub density_kg_m3: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dew_temperature_k: Option<f64>,
}

pub fn run_case(case: &Case, oracle: Arc<dyn PropertyOracle>) -> CliResult<CaseReport> {
    info!(case = %case.name, steps = case.medium.step_count(), "running case");
    let points = match &case.medium {
        Medium::Fluid {
            name,
            fraction,
            inputs,
            steps,
        } => {
            let fluid = Fluid::with_oracle(*name, *fraction, oracle)?;
            fluid_chain(fluid, case.phase, inputs, steps)?
        }
        Medium::Mixture {
            composition,
            inputs,
            steps,
        } => {
            let mixture = Mixture::from_composition(composition.clone(), oracle)?;
            fluid_chain(mixture, case.phase, inputs, steps)?
        }
        Medium::HumidAir { inputs, steps } => {
            air_chain(HumidAir::with_oracle(oracle), inputs, steps)?
        }
    };

    Ok(CaseReport {
        case: case.name.clone(),
        medium: case.medium.describe(),
        points,
    })
}

fn step_error(step: usize, label: &str) -> impl FnOnce(FluidError) -> CliError + '_ {
    move |source| CliError::Step {
        step,
        label: label.to_string(),
        source,
    }
}

fn fluid_chain<S: FluidProcesses>(
    mut state: S,
    phase: Option<Phase>,
    inputs: &[FluidInput; 2],
    steps: &[FluidStep],
) -> CliResult<Vec<PointReport>> {
    if let Some(phase) = phase {
        state.specify_phase(phase)?;
    }
    state.update(inputs[0], inputs[1])?;

    let mut points = vec![fluid_point("inlet", &state)?];
    for (i, step) in steps.iter().enumerate() {
        let outlet = step.apply(&state).map_err(step_error(i + 1, step.label()))?;
        debug!(step = i + 1, process = step.label(), "process applied");
        points.push(fluid_point(step.label(), &outlet)?);
        state.dispose();
        state = outlet;
    }
    state.dispose();
    Ok(points)
}

fn air_chain(
    mut state: HumidAir,
    inputs: &[HumidAirInput; 3],
    steps: &[AirStep],
) -> CliResult<Vec<PointReport>> {
    state.update(inputs[0], inputs[1], inputs[2])?;

    let mut points = vec![air_point("inlet", &state)?];
    for (i, step) in steps.iter().enumerate() {
        let outlet = step.apply(&state).map_err(step_error(i + 1, step.label()))?;
        debug!(step = i + 1, process = step.label(), "process applied");
        points.push(air_point(step.label(), &outlet)?);
        state = outlet;
    }
    Ok(points)
}

fn fluid_point<S: AbstractFluid>(label: &str, state: &S) -> CliResult<PointReport> {
    Ok(PointReport {
        label: label.to_string(),
        pressure_pa: state.pressure()?,
        temperature_k: state.temperature()?,
        enthalpy_j_kg: state.enthalpy()?,
        entropy_j_kg_k: state.entropy()?,
        density_kg_m3: state.density()?,
        phase: Some(state.phase()?.to_string()),
        quality: state.quality()?,
        humidity_ratio: None,
        relative_humidity: None,
        dew_temperature_k: None,
    })
}

fn air_point<S: AbstractHumidAir>(label: &str, state: &S) -> CliResult<PointReport> {
    Ok(PointReport {
        label: label.to_string(),
        pressure_pa: state.pressure()?,
        temperature_k: state.temperature()?,
        enthalpy_j_kg: state.enthalpy()?,
        entropy_j_kg_k: state.entropy()?,
        density_kg_m3: state.density()?,
        phase: None,
        quality: None,
        humidity_ratio: Some(state.humidity()?),
        relative_humidity: Some(state.relative_humidity()?),
        dew_temperature_k: Some(state.dew_temperature()?),
    })
}

pub fn render_json(report: &CaseReport) -> CliResult<String> {
    serde_json::to_string_pretty(report).map_err(|e| CliError::Report(e.to_string()))
}

/// Engineering units: kPa, °C, kJ/kg.
pub fn render_text(report: &CaseReport) -> String {
    let humid = report.points.iter().any(|p| p.humidity_ratio.is_some());
    let mut out = String::new();
    let _ = writeln!(out, "Case: {} ({})", report.case, report.medium);

    if humid {
        let _ = writeln!(
            out,
            "{:<26} {:>10} {:>8} {:>10} {:>8} {:>7} {:>9}",
            "point", "P [kPa]", "T [°C]", "h [kJ/kg]", "W [g/kg]", "RH [%]", "Tdp [°C]"
        );
    } else {
        let _ = writeln!(
            out,
            "{:<26} {:>10} {:>8} {:>10} {:>12} {:>11}  phase",
            "point", "P [kPa]", "T [°C]", "h [kJ/kg]", "s [kJ/kg/K]", "ρ [kg/m³]"
        );
    }

    for p in &report.points {
        let common = format!(
            "{:<26} {:>10.3} {:>8.2} {:>10.2}",
            p.label,
            pa(p.pressure_pa).get::<kilopascal>(),
            k(p.temperature_k).get::<degree_celsius>(),
            p.enthalpy_j_kg / 1e3
        );
        if humid {
            let _ = writeln!(
                out,
                "{common} {:>8.3} {:>7.1} {:>9.2}",
                p.humidity_ratio.unwrap_or(f64::NAN) * 1e3,
                p.relative_humidity.unwrap_or(f64::NAN) * 100.0,
                p.dew_temperature_k
                    .map_or(f64::NAN, |t| k(t).get::<degree_celsius>())
            );
        } else {
            let mut phase = p.phase.clone().unwrap_or_default();
            if let Some(x) = p.quality {
                let _ = write!(phase, " (x = {x:.3})");
            }
            let _ = writeln!(
                out,
                "{common} {:>12.4} {:>11.3}  {phase}",
                p.entropy_j_kg_k / 1e3,
                p.density_kg_m3
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::parse_case;
    use approx::assert_relative_eq;
    use th_fluids::IdealOracle;

    fn oracle() -> Arc<dyn PropertyOracle> {
        Arc::new(IdealOracle::new())
    }

    #[test]
    fn runs_a_fluid_chain() {
        let case = parse_case(
            r#"
name: steam
medium: { kind: fluid, name: Water }
inputs: { pressure: 1 atm, temperature: 150 C }
processes:
  - type: isentropic_compression
    pressure: 2 atm
  - type: cooling
    temperature: 400 K
    pressure_drop: 1 kPa
"#,
        )
        .unwrap();
        let report = run_case(&case, oracle()).unwrap();
        assert_eq!(report.medium, "Water");
        assert_eq!(report.points.len(), 3);

        let (inlet, compressed, cooled) = (&report.points[0], &report.points[1], &report.points[2]);
        assert_eq!(inlet.label, "inlet");
        assert_eq!(inlet.phase.as_deref(), Some("Gas"));
        assert_eq!(compressed.pressure_pa, 202_650.0);
        assert_eq!(compressed.entropy_j_kg_k, inlet.entropy_j_kg_k);
        assert!(compressed.temperature_k > inlet.temperature_k);
        assert_relative_eq!(cooled.pressure_pa, 201_650.0, max_relative = 1e-12);
        assert_eq!(cooled.temperature_k, 400.0);
    }

    #[test]
    fn reports_the_failing_step() {
        let case = parse_case(
            r#"
name: wrong way
medium: { kind: fluid, name: Water }
inputs: { pressure: 1 atm, temperature: 150 C }
processes:
  - type: heating
    temperature: 200 C
  - type: heating
    temperature: 100 C
"#,
        )
        .unwrap();
        match run_case(&case, oracle()).unwrap_err() {
            CliError::Step {
                step,
                label,
                source,
            } => {
                assert_eq!(step, 2);
                assert_eq!(label, "heating");
                assert!(matches!(source, FluidError::Direction { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn runs_a_humid_air_chain() {
        let case = parse_case(
            r#"
name: air handling
medium: { kind: humid_air }
inputs: { pressure: 1 atm, temperature: 30 C, relative_humidity: 50 % }
processes:
  - type: wet_cooling
    temperature: 15 C
    relative_humidity: 90 %
  - type: heating
    temperature: 22 C
"#,
        )
        .unwrap();
        let report = run_case(&case, oracle()).unwrap();
        assert_eq!(report.points.len(), 3);
        let w: Vec<f64> = report
            .points
            .iter()
            .map(|p| p.humidity_ratio.unwrap())
            .collect();
        assert!(w[1] < w[0]);
        assert_eq!(w[2], w[1]);
        assert!(report.points.iter().all(|p| p.phase.is_none()));
    }

    #[test]
    fn text_report_uses_engineering_units() {
        let report = CaseReport {
            case: "demo".into(),
            medium: "Water".into(),
            points: vec![PointReport {
                label: "inlet".into(),
                pressure_pa: 101_325.0,
                temperature_k: 373.15,
                enthalpy_j_kg: 2.5e6,
                entropy_j_kg_k: 7_000.0,
                density_kg_m3: 0.6,
                phase: Some("Two-phase".into()),
                quality: Some(0.5),
                humidity_ratio: None,
                relative_humidity: None,
                dew_temperature_k: None,
            }],
        };
        let text = render_text(&report);
        assert!(text.starts_with("Case: demo (Water)"));
        assert!(text.contains("101.325"));
        assert!(text.contains("100.00"));
        assert!(text.contains("2500.00"));
        assert!(text.contains("(x = 0.500)"));
    }

    #[test]
    fn json_report_omits_missing_fields() {
        let report = CaseReport {
            case: "demo".into(),
            medium: "Humid air".into(),
            points: vec![PointReport {
                label: "inlet".into(),
                pressure_pa: 101_325.0,
                temperature_k: 293.15,
                enthalpy_j_kg: 38_000.0,
                entropy_j_kg_k: 140.0,
                density_kg_m3: 1.2,
                phase: None,
                quality: None,
                humidity_ratio: Some(0.007),
                relative_humidity: Some(0.5),
                dew_temperature_k: Some(282.4),
            }],
        };
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        let point = &json["points"][0];
        assert_eq!(point["humidity_ratio"], 0.007);
        assert!(point.get("phase").is_none());
        assert!(point.get("quality").is_none());
    }
}
