//! Closed-form reference oracle.
//!
//! A coarse property model for offline use and tests:
//! - vapour: ideal gas with constant cp
//! - liquid: incompressible with constant specific heat
//! - saturation: Clausius-Clapeyron through the normal boiling point
//! - incompressible solutions: properties linear in the solution fraction
//!
//! Mixtures are treated as pseudo-pure fluids with blended parameters, so the
//! bubble and dew points coincide (no temperature glide).

use super::ideal_air;
use super::{HandleId, OracleError, OracleResult, PropertyOracle};
use crate::params::{FluidParam, HumidAirParam, InputPair, Phase};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use th_core::timing::{self, oracle_timing};
use th_core::units::constants::{P_ATM_PA, R_MOLAR, T0_K};

/// Parameters of a pure (or pseudo-pure) fluid.
#[derive(Debug, Clone, Copy)]
struct Params {
    /// Molar mass [kg/mol]
    molar_mass: f64,
    /// Vapour isobaric specific heat [J/(kg·K)]
    cp_vapor: f64,
    /// Liquid specific heat [J/(kg·K)]
    c_liquid: f64,
    /// Liquid density [kg/m³]
    rho_liquid: f64,
    /// Latent heat at the reference boiling point [J/kg]
    latent_heat: f64,
    /// Saturation temperature at `p_boil` [K]
    t_boil: f64,
    p_boil: f64,
    t_crit: f64,
    p_crit: f64,
    t_triple: f64,
    p_triple: f64,
    t_min: f64,
    t_max: f64,
    p_max: f64,
    mu_liquid: f64,
    mu_vapor: f64,
    k_liquid: f64,
    k_vapor: f64,
    /// Surface tension coefficient of `sigma0 * (1 - T/Tc)^1.26` [N/m]
    sigma0: f64,
}

struct Species {
    name: &'static str,
    params: Params,
}

const SPECIES: &[Species] = &[
    Species {
        name: "Water",
        params: Params {
            molar_mass: 0.018_015_268,
            cp_vapor: 1996.0,
            c_liquid: 4186.0,
            rho_liquid: 958.0,
            latent_heat: 2_257e3,
            t_boil: 373.124,
            p_boil: P_ATM_PA,
            t_crit: 647.096,
            p_crit: 22.064e6,
            t_triple: 273.16,
            p_triple: 611.655,
            t_min: 273.16,
            t_max: 2000.0,
            p_max: 1e9,
            mu_liquid: 2.8e-4,
            mu_vapor: 1.2e-5,
            k_liquid: 0.68,
            k_vapor: 0.025,
            sigma0: 0.155,
        },
    },
    Species {
        name: "Nitrogen",
        params: Params {
            molar_mass: 0.028_013_4,
            cp_vapor: 1040.0,
            c_liquid: 2040.0,
            rho_liquid: 806.0,
            latent_heat: 199.2e3,
            t_boil: 77.355,
            p_boil: P_ATM_PA,
            t_crit: 126.192,
            p_crit: 3.3958e6,
            t_triple: 63.151,
            p_triple: 12_523.0,
            t_min: 63.151,
            t_max: 2000.0,
            p_max: 2.2e9,
            mu_liquid: 1.6e-4,
            mu_vapor: 1.78e-5,
            k_liquid: 0.14,
            k_vapor: 0.026,
            sigma0: 0.029,
        },
    },
    Species {
        name: "Air",
        params: Params {
            molar_mass: 0.028_965_86,
            cp_vapor: 1006.0,
            c_liquid: 1970.0,
            rho_liquid: 875.0,
            latent_heat: 205e3,
            t_boil: 78.903,
            p_boil: P_ATM_PA,
            t_crit: 132.5306,
            p_crit: 3.786e6,
            t_triple: 59.75,
            p_triple: 5_265.0,
            t_min: 59.75,
            t_max: 2000.0,
            p_max: 2e9,
            mu_liquid: 1.7e-4,
            mu_vapor: 1.81e-5,
            k_liquid: 0.14,
            k_vapor: 0.0257,
            sigma0: 0.031,
        },
    },
    Species {
        name: "CarbonDioxide",
        params: Params {
            molar_mass: 0.044_009_8,
            cp_vapor: 844.0,
            c_liquid: 2500.0,
            rho_liquid: 928.0,
            latent_heat: 231e3,
            t_boil: 273.15,
            p_boil: 3.4851e6,
            t_crit: 304.1282,
            p_crit: 7.3773e6,
            t_triple: 216.592,
            p_triple: 517_950.0,
            t_min: 216.592,
            t_max: 2000.0,
            p_max: 8e8,
            mu_liquid: 1.0e-4,
            mu_vapor: 1.47e-5,
            k_liquid: 0.11,
            k_vapor: 0.0166,
            sigma0: 0.078,
        },
    },
    Species {
        name: "Ammonia",
        params: Params {
            molar_mass: 0.017_030_26,
            cp_vapor: 2170.0,
            c_liquid: 4700.0,
            rho_liquid: 682.0,
            latent_heat: 1_369e3,
            t_boil: 239.82,
            p_boil: P_ATM_PA,
            t_crit: 405.4,
            p_crit: 11.3339e6,
            t_triple: 195.495,
            p_triple: 6_091.2,
            t_min: 195.495,
            t_max: 700.0,
            p_max: 1e9,
            mu_liquid: 2.5e-4,
            mu_vapor: 1.0e-5,
            k_liquid: 0.55,
            k_vapor: 0.025,
            sigma0: 0.091,
        },
    },
    Species {
        name: "R134a",
        params: Params {
            molar_mass: 0.102_032,
            cp_vapor: 850.0,
            c_liquid: 1280.0,
            rho_liquid: 1377.0,
            latent_heat: 217e3,
            t_boil: 247.076,
            p_boil: P_ATM_PA,
            t_crit: 374.21,
            p_crit: 4.059_28e6,
            t_triple: 169.85,
            p_triple: 389.6,
            t_min: 169.85,
            t_max: 455.0,
            p_max: 7e7,
            mu_liquid: 3.9e-4,
            mu_vapor: 1.0e-5,
            k_liquid: 0.105,
            k_vapor: 0.0096,
            sigma0: 0.06,
        },
    },
    Species {
        name: "R32",
        params: Params {
            molar_mass: 0.052_024,
            cp_vapor: 820.0,
            c_liquid: 1600.0,
            rho_liquid: 1214.0,
            latent_heat: 382e3,
            t_boil: 221.499,
            p_boil: P_ATM_PA,
            t_crit: 351.255,
            p_crit: 5.782e6,
            t_triple: 136.34,
            p_triple: 48.0,
            t_min: 136.34,
            t_max: 435.0,
            p_max: 7e7,
            mu_liquid: 2.9e-4,
            mu_vapor: 9.6e-6,
            k_liquid: 0.19,
            k_vapor: 0.0093,
            sigma0: 0.07,
        },
    },
    Species {
        name: "n-Propane",
        params: Params {
            molar_mass: 0.044_095_62,
            cp_vapor: 1680.0,
            c_liquid: 2240.0,
            rho_liquid: 581.0,
            latent_heat: 426e3,
            t_boil: 231.036,
            p_boil: P_ATM_PA,
            t_crit: 369.89,
            p_crit: 4.2512e6,
            t_triple: 85.525,
            p_triple: 1.7e-4,
            t_min: 85.525,
            t_max: 650.0,
            p_max: 1e9,
            mu_liquid: 2.0e-4,
            mu_vapor: 6.5e-6,
            k_liquid: 0.13,
            k_vapor: 0.012,
            sigma0: 0.052,
        },
    },
];

/// Aqueous solution whose properties are linear in the solution fraction `x`:
/// `value = a + b * x`.
struct Solution {
    name: &'static str,
    specific_heat: (f64, f64),
    density: (f64, f64),
    viscosity: (f64, f64),
    conductivity: (f64, f64),
    /// Freezing-point depression per unit fraction [K]
    freezing_drop: f64,
    t_max: f64,
}

const SOLUTIONS: &[Solution] = &[
    Solution {
        name: "MPG",
        specific_heat: (4186.0, -1700.0),
        density: (1000.0, 120.0),
        viscosity: (1.0e-3, 1.5e-2),
        conductivity: (0.6, -0.4),
        freezing_drop: 85.0,
        t_max: 373.15,
    },
    Solution {
        name: "MEG",
        specific_heat: (4186.0, -1900.0),
        density: (1000.0, 170.0),
        viscosity: (1.0e-3, 1.0e-2),
        conductivity: (0.6, -0.35),
        freezing_drop: 90.0,
        t_max: 373.15,
    },
];

impl Solution {
    fn at(&self, x: f64) -> Params {
        let linear = |(a, b): (f64, f64)| a + b * x;
        let t_freeze = T0_K - self.freezing_drop * x;
        Params {
            molar_mass: f64::NAN,
            cp_vapor: f64::NAN,
            c_liquid: linear(self.specific_heat),
            rho_liquid: linear(self.density),
            latent_heat: f64::NAN,
            t_boil: f64::NAN,
            p_boil: f64::NAN,
            t_crit: f64::NAN,
            p_crit: f64::NAN,
            t_triple: f64::NAN,
            p_triple: f64::NAN,
            t_min: t_freeze,
            t_max: self.t_max,
            p_max: 1e8,
            mu_liquid: linear(self.viscosity),
            mu_vapor: f64::NAN,
            k_liquid: linear(self.conductivity),
            k_vapor: f64::NAN,
            sigma0: f64::NAN,
        }
    }
}

impl Params {
    /// Specific gas constant [J/(kg·K)].
    fn gas_constant(&self) -> f64 {
        R_MOLAR / self.molar_mass
    }

    fn t_sat(&self, p: f64) -> Option<f64> {
        if !(p >= self.p_triple && p < self.p_crit) {
            return None;
        }
        let inv = 1.0 / self.t_boil - self.gas_constant() / self.latent_heat * (p / self.p_boil).ln();
        let t = 1.0 / inv;
        (t.is_finite() && t > 0.0 && t < self.t_crit).then_some(t)
    }

    /// Clausius-Clapeyron vapour pressure, unbounded by the critical point.
    fn vapor_pressure(&self, t: f64) -> f64 {
        self.p_boil
            * (-(self.latent_heat / self.gas_constant()) * (1.0 / t - 1.0 / self.t_boil)).exp()
    }

    fn p_sat(&self, t: f64) -> Option<f64> {
        if !(t >= self.t_triple && t < self.t_crit) {
            return None;
        }
        let p = self.vapor_pressure(t);
        (p.is_finite() && p < self.p_crit).then_some(p)
    }

    fn h_liquid(&self, t: f64) -> f64 {
        self.c_liquid * (t - T0_K)
    }

    fn s_liquid(&self, t: f64) -> f64 {
        self.c_liquid * (t / T0_K).ln()
    }

    fn h_vapor(&self, t: f64) -> f64 {
        self.h_liquid(self.t_boil) + self.latent_heat + self.cp_vapor * (t - self.t_boil)
    }

    fn s_vapor(&self, t: f64, p: f64) -> f64 {
        self.s_liquid(self.t_boil) + self.latent_heat / self.t_boil
            + self.cp_vapor * (t / self.t_boil).ln()
            - self.gas_constant() * (p / self.p_boil).ln()
    }

    fn t_liquid_from_h(&self, h: f64) -> f64 {
        T0_K + h / self.c_liquid
    }

    fn t_liquid_from_s(&self, s: f64) -> f64 {
        T0_K * (s / self.c_liquid).exp()
    }

    fn t_vapor_from_h(&self, h: f64) -> f64 {
        self.t_boil + (h - self.h_liquid(self.t_boil) - self.latent_heat) / self.cp_vapor
    }

    fn t_vapor_from_s(&self, s: f64, p: f64) -> f64 {
        let reduced = s - self.s_liquid(self.t_boil) - self.latent_heat / self.t_boil
            + self.gas_constant() * (p / self.p_boil).ln();
        self.t_boil * (reduced / self.cp_vapor).exp()
    }

    /// Single-phase region of a (T, P) point.
    fn classify(&self, t: f64, p: f64) -> Phase {
        if t >= self.t_crit {
            return if p >= self.p_crit {
                Phase::Supercritical
            } else {
                Phase::SupercriticalGas
            };
        }
        if p >= self.p_crit {
            return Phase::SupercriticalLiquid;
        }
        // Below the critical pressure the curve may reach p_crit before t_crit;
        // everything under it is vapour.
        let boundary = if t >= self.t_triple {
            self.vapor_pressure(t)
        } else {
            self.p_triple
        };
        if p < boundary {
            Phase::Gas
        } else {
            Phase::Liquid
        }
    }

    /// Blend pure-component parameters with mole fractions.
    fn blend(components: &[Params], fractions: &[f64]) -> Params {
        let molar_mass: f64 = mole_mean(components, fractions, |c| c.molar_mass);
        let mass_fractions: Vec<f64> = components
            .iter()
            .zip(fractions)
            .map(|(c, x)| x * c.molar_mass / molar_mass)
            .collect();
        let mass_mean = |f: fn(&Params) -> f64| -> f64 {
            components
                .iter()
                .zip(&mass_fractions)
                .map(|(c, y)| y * f(c))
                .sum()
        };
        let specific_volume = mass_mean(|c| 1.0 / c.rho_liquid);
        let t_boil: f64 = components
            .iter()
            .zip(fractions)
            .map(|(c, x)| x * c.t_sat(P_ATM_PA).unwrap_or(c.t_boil))
            .sum();
        let max_of = |f: fn(&Params) -> f64| components.iter().map(f).fold(f64::MIN, f64::max);
        let min_of = |f: fn(&Params) -> f64| components.iter().map(f).fold(f64::MAX, f64::min);

        Params {
            molar_mass,
            cp_vapor: mass_mean(|c| c.cp_vapor),
            c_liquid: mass_mean(|c| c.c_liquid),
            rho_liquid: 1.0 / specific_volume,
            latent_heat: mass_mean(|c| c.latent_heat),
            t_boil,
            p_boil: P_ATM_PA,
            t_crit: mole_mean(components, fractions, |c| c.t_crit),
            p_crit: mole_mean(components, fractions, |c| c.p_crit),
            t_triple: max_of(|c| c.t_triple),
            p_triple: min_of(|c| c.p_triple),
            t_min: max_of(|c| c.t_min),
            t_max: min_of(|c| c.t_max),
            p_max: min_of(|c| c.p_max),
            mu_liquid: mole_mean(components, fractions, |c| c.mu_liquid),
            mu_vapor: mole_mean(components, fractions, |c| c.mu_vapor),
            k_liquid: mole_mean(components, fractions, |c| c.k_liquid),
            k_vapor: mole_mean(components, fractions, |c| c.k_vapor),
            sigma0: mole_mean(components, fractions, |c| c.sigma0),
        }
    }
}

fn mole_mean(components: &[Params], fractions: &[f64], f: fn(&Params) -> f64) -> f64 {
    components.iter().zip(fractions).map(|(c, x)| x * f(c)).sum()
}

fn is_vapor_like(phase: Phase) -> bool {
    matches!(
        phase,
        Phase::Gas | Phase::Supercritical | Phase::SupercriticalGas
    )
}

/// Fluid definition attached to a handle.
#[derive(Debug, Clone)]
enum Model {
    Pure(Params),
    Mixture {
        components: Vec<Params>,
        fractions: Option<Vec<f64>>,
    },
    Incompressible {
        solution: &'static str,
        fraction: Option<f64>,
    },
}

/// Resolved parameters of a handle's fluid.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    params: Params,
    kind: Kind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Pure,
    Mixture,
    Incompressible,
}

impl Model {
    fn resolve(&self) -> OracleResult<Resolved> {
        match self {
            Model::Pure(params) => Ok(Resolved {
                params: *params,
                kind: Kind::Pure,
            }),
            Model::Mixture {
                components,
                fractions,
            } => {
                let fractions = fractions
                    .as_ref()
                    .ok_or_else(|| OracleError::failed("mole fractions have not been set"))?;
                Ok(Resolved {
                    params: Params::blend(components, fractions),
                    kind: Kind::Mixture,
                })
            }
            Model::Incompressible { solution, fraction } => {
                let fraction =
                    fraction.ok_or_else(|| OracleError::failed("solution fraction has not been set"))?;
                let solution = SOLUTIONS
                    .iter()
                    .find(|s| s.name == *solution)
                    .ok_or_else(|| OracleError::failed(format!("unknown solution {solution}")))?;
                Ok(Resolved {
                    params: solution.at(fraction),
                    kind: Kind::Incompressible,
                })
            }
        }
    }
}

/// Committed state point.
#[derive(Debug, Clone, Copy)]
struct Point {
    t: f64,
    p: f64,
    phase: Phase,
    /// Vapour quality, meaningful in the two-phase region only.
    q: f64,
}

#[derive(Debug)]
struct Slot {
    model: Model,
    imposed: Option<Phase>,
    point: Option<(Resolved, Point)>,
}

#[derive(Debug, Default)]
struct HandleTable {
    next: HandleId,
    slots: HashMap<HandleId, Slot>,
}

/// Closed-form reference implementation of [`PropertyOracle`].
#[derive(Debug, Default)]
pub struct IdealOracle {
    table: Mutex<HandleTable>,
}

const SUPPORTED_PAIRS: [InputPair; 7] = [
    InputPair::PT,
    InputPair::PQ,
    InputPair::QT,
    InputPair::HMassP,
    InputPair::PSMass,
    InputPair::DMassP,
    InputPair::DMassT,
];

impl IdealOracle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> OracleResult<MutexGuard<'_, HandleTable>> {
        self.table.lock().map_err(|_| OracleError::Lock)
    }

    fn with_slot<T>(
        &self,
        handle: HandleId,
        f: impl FnOnce(&mut Slot) -> OracleResult<T>,
    ) -> OracleResult<T> {
        let mut table = self.lock()?;
        let slot = table
            .slots
            .get_mut(&handle)
            .ok_or(OracleError::InvalidHandle { handle })?;
        f(slot)
    }
}

fn lookup_species(name: &str) -> Option<&'static Species> {
    SPECIES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

fn check_bounds(params: &Params, t: f64, p: f64) -> OracleResult<()> {
    if !(t.is_finite() && p.is_finite()) || t <= 0.0 || p <= 0.0 {
        return Err(OracleError::failed(format!(
            "state out of range: T = {t} K, P = {p} Pa"
        )));
    }
    if t < params.t_min || t > params.t_max {
        return Err(OracleError::failed(format!(
            "temperature {t} K outside [{}, {}] K",
            params.t_min, params.t_max
        )));
    }
    if p > params.p_max {
        return Err(OracleError::failed(format!(
            "pressure {p} Pa above maximum {} Pa",
            params.p_max
        )));
    }
    Ok(())
}

fn solve(
    resolved: &Resolved,
    imposed: Option<Phase>,
    pair: InputPair,
    first: f64,
    second: f64,
) -> OracleResult<Point> {
    let params = &resolved.params;
    if !(first.is_finite() && second.is_finite()) {
        return Err(OracleError::failed(format!(
            "non-finite inputs for {pair}: {first}, {second}"
        )));
    }
    if resolved.kind == Kind::Incompressible {
        return solve_incompressible(params, pair, first, second);
    }
    let forced_vapor = imposed.map(is_vapor_like);
    let point = match pair {
        InputPair::PT => {
            let (p, t) = (first, second);
            let phase = match imposed {
                Some(phase @ (Phase::Gas | Phase::Liquid)) => phase,
                _ => params.classify(t, p),
            };
            single_phase(t, p, phase)
        }
        InputPair::PQ => {
            let (p, q) = (first, second);
            check_quality(q)?;
            let t = params.t_sat(p).ok_or_else(|| {
                OracleError::failed(format!("no saturation state at P = {p} Pa"))
            })?;
            two_phase(t, p, q)
        }
        InputPair::QT => {
            let (q, t) = (first, second);
            check_quality(q)?;
            let p = params.p_sat(t).ok_or_else(|| {
                OracleError::failed(format!("no saturation state at T = {t} K"))
            })?;
            two_phase(t, p, q)
        }
        InputPair::HMassP => {
            let (h, p) = (first, second);
            split_by_saturation(
                params,
                p,
                h,
                forced_vapor,
                |t| params.h_liquid(t),
                |t| params.h_vapor(t),
                |h| params.t_liquid_from_h(h),
                |h| params.t_vapor_from_h(h),
            )?
        }
        InputPair::PSMass => {
            let (p, s) = (first, second);
            split_by_saturation(
                params,
                p,
                s,
                forced_vapor,
                |t| params.s_liquid(t),
                |t| params.s_vapor(t, p),
                |s| params.t_liquid_from_s(s),
                |s| params.t_vapor_from_s(s, p),
            )?
        }
        InputPair::DMassP => {
            let (rho, p) = (first, second);
            let t = p / (rho * params.gas_constant());
            vapor_only(params, t, p)?
        }
        InputPair::DMassT => {
            let (rho, t) = (first, second);
            let p = rho * params.gas_constant() * t;
            vapor_only(params, t, p)?
        }
        other => {
            return Err(OracleError::failed(format!(
                "input pair {other} is not supported by the reference backend"
            )));
        }
    };
    check_bounds(params, point.t, point.p)?;
    Ok(point)
}

fn check_quality(q: f64) -> OracleResult<()> {
    if (0.0..=1.0).contains(&q) {
        Ok(())
    } else {
        Err(OracleError::failed(format!("vapor quality {q} outside [0, 1]")))
    }
}

fn single_phase(t: f64, p: f64, phase: Phase) -> Point {
    Point {
        t,
        p,
        phase,
        q: f64::NAN,
    }
}

fn two_phase(t: f64, p: f64, q: f64) -> Point {
    Point {
        t,
        p,
        phase: Phase::TwoPhase,
        q,
    }
}

fn vapor_only(params: &Params, t: f64, p: f64) -> OracleResult<Point> {
    let phase = params.classify(t, p);
    if is_vapor_like(phase) {
        Ok(single_phase(t, p, phase))
    } else {
        Err(OracleError::failed(
            "density inputs are supported for vapour states only",
        ))
    }
}

/// Invert a caloric property `y` at pressure `p` across the saturation dome.
#[allow(clippy::too_many_arguments)]
fn split_by_saturation(
    params: &Params,
    p: f64,
    y: f64,
    forced_vapor: Option<bool>,
    y_liquid: impl Fn(f64) -> f64,
    y_vapor: impl Fn(f64) -> f64,
    t_liquid: impl Fn(f64) -> f64,
    t_vapor: impl Fn(f64) -> f64,
) -> OracleResult<Point> {
    match forced_vapor {
        Some(true) => return Ok(single_phase(t_vapor(y), p, Phase::Gas)),
        Some(false) => return Ok(single_phase(t_liquid(y), p, Phase::Liquid)),
        None => {}
    }
    match params.t_sat(p) {
        Some(t_sat) => {
            let (y_f, y_g) = (y_liquid(t_sat), y_vapor(t_sat));
            if y < y_f {
                let t = t_liquid(y);
                Ok(single_phase(t, p, Phase::Liquid))
            } else if y > y_g {
                let t = t_vapor(y);
                Ok(single_phase(t, p, params.classify(t, p)))
            } else {
                Ok(two_phase(t_sat, p, (y - y_f) / (y_g - y_f)))
            }
        }
        None => {
            let t = t_vapor(y);
            if t >= params.t_crit || p < params.p_triple {
                Ok(single_phase(t, p, params.classify(t, p)))
            } else {
                let t = t_liquid(y);
                Ok(single_phase(t, p, params.classify(t, p)))
            }
        }
    }
}

fn solve_incompressible(params: &Params, pair: InputPair, first: f64, second: f64) -> OracleResult<Point> {
    let (t, p) = match pair {
        InputPair::PT => (second, first),
        InputPair::HMassP => (params.t_liquid_from_h(first), second),
        InputPair::PSMass => (params.t_liquid_from_s(second), first),
        other => {
            return Err(OracleError::failed(format!(
                "input pair {other} is not supported for incompressible fluids"
            )));
        }
    };
    check_bounds(params, t, p)?;
    Ok(single_phase(t, p, Phase::Liquid))
}

fn trivial_output(resolved: &Resolved, key: FluidParam) -> Option<OracleResult<f64>> {
    let params = &resolved.params;
    let incompressible = resolved.kind == Kind::Incompressible;
    let heos_only = |value: f64| {
        if incompressible {
            Err(OracleError::not_available(key))
        } else {
            Ok(value)
        }
    };
    let value = match key {
        FluidParam::MolarMass => heos_only(params.molar_mass),
        FluidParam::GasConstant => heos_only(R_MOLAR),
        FluidParam::TCritical => heos_only(params.t_crit),
        FluidParam::PCritical => heos_only(params.p_crit),
        FluidParam::TTriple | FluidParam::PTriple if resolved.kind != Kind::Pure => {
            Err(OracleError::not_available(key))
        }
        FluidParam::TTriple => Ok(params.t_triple),
        FluidParam::PTriple => Ok(params.p_triple),
        FluidParam::TMax => Ok(params.t_max),
        FluidParam::TMin => Ok(params.t_min),
        FluidParam::PMax => Ok(params.p_max),
        FluidParam::PMin if incompressible => Ok(0.0),
        FluidParam::PMin => Ok(params.p_triple),
        FluidParam::TFreeze if incompressible => Ok(params.t_min),
        FluidParam::TFreeze => Err(OracleError::not_available(key)),
        _ => return None,
    };
    Some(value)
}

fn state_output(resolved: &Resolved, point: &Point, key: FluidParam) -> OracleResult<f64> {
    let params = &resolved.params;
    let Point { t, p, phase, q } = *point;
    let two_phase = phase == Phase::TwoPhase;
    let vapor = is_vapor_like(phase);
    let incompressible = resolved.kind == Kind::Incompressible;
    let unavailable = || -> OracleResult<f64> { Err(OracleError::not_available(key)) };

    let mix = |liquid: f64, vapor_value: f64| (1.0 - q) * liquid + q * vapor_value;
    let pick = |liquid: f64, vapor_value: f64| if vapor { vapor_value } else { liquid };

    let density = || {
        if two_phase {
            let v_g = params.gas_constant() * t / p;
            1.0 / mix(1.0 / params.rho_liquid, v_g)
        } else if vapor {
            p / (params.gas_constant() * t)
        } else {
            params.rho_liquid
        }
    };
    let enthalpy = || {
        if two_phase {
            mix(params.h_liquid(t), params.h_vapor(t))
        } else {
            pick(params.h_liquid(t), params.h_vapor(t))
        }
    };
    let entropy = || {
        if two_phase {
            mix(params.s_liquid(t), params.s_vapor(t, p))
        } else {
            pick(params.s_liquid(t), params.s_vapor(t, p))
        }
    };
    let cp = || pick(params.c_liquid, params.cp_vapor);
    let cv = || pick(params.c_liquid, params.cp_vapor - params.gas_constant());
    let molar = |value: f64| {
        if incompressible {
            Err(OracleError::not_available(key))
        } else {
            Ok(value * params.molar_mass)
        }
    };

    match key {
        FluidParam::T => Ok(t),
        FluidParam::P => Ok(p),
        FluidParam::Q if incompressible => unavailable(),
        FluidParam::Q => Ok(if two_phase { q } else { -1.0 }),
        FluidParam::Phase => Ok(f64::from(phase.index())),
        FluidParam::DMass => Ok(density()),
        FluidParam::HMass => Ok(enthalpy()),
        FluidParam::SMass => Ok(entropy()),
        FluidParam::UMass => Ok(enthalpy() - p / density()),
        FluidParam::DMolar if incompressible => unavailable(),
        FluidParam::DMolar => Ok(density() / params.molar_mass),
        FluidParam::HMolar => molar(enthalpy()),
        FluidParam::SMolar => molar(entropy()),
        FluidParam::UMolar => molar(enthalpy() - p / density()),
        _ if two_phase
            && matches!(
                key,
                FluidParam::CpMass
                    | FluidParam::CpMolar
                    | FluidParam::CvMass
                    | FluidParam::CvMolar
                    | FluidParam::Conductivity
                    | FluidParam::DynamicViscosity
                    | FluidParam::Prandtl
                    | FluidParam::SoundSpeed
            ) =>
        {
            unavailable()
        }
        FluidParam::CpMass => Ok(cp()),
        FluidParam::CvMass => Ok(cv()),
        FluidParam::CpMolar => molar(cp()),
        FluidParam::CvMolar => molar(cv()),
        FluidParam::Conductivity => Ok(pick(params.k_liquid, params.k_vapor)),
        FluidParam::DynamicViscosity => Ok(pick(params.mu_liquid, params.mu_vapor)),
        FluidParam::Prandtl => {
            Ok(cp() * pick(params.mu_liquid, params.mu_vapor) / pick(params.k_liquid, params.k_vapor))
        }
        FluidParam::SoundSpeed if vapor => {
            let gamma = params.cp_vapor / (params.cp_vapor - params.gas_constant());
            Ok((gamma * params.gas_constant() * t).sqrt())
        }
        FluidParam::SoundSpeed => unavailable(),
        FluidParam::SurfaceTension if two_phase => {
            Ok(params.sigma0 * (1.0 - t / params.t_crit).powf(1.26))
        }
        FluidParam::SurfaceTension => unavailable(),
        FluidParam::Compressibility if incompressible => unavailable(),
        FluidParam::Compressibility => Ok(p / (density() * params.gas_constant() * t)),
        _ => trivial_output(resolved, key).unwrap_or_else(unavailable),
    }
}

impl PropertyOracle for IdealOracle {
    fn name(&self) -> &str {
        "ideal"
    }

    fn resolve_combination(&self, name: &str) -> Option<InputPair> {
        InputPair::from_name(name).filter(|pair| SUPPORTED_PAIRS.contains(pair))
    }

    fn create_handle(&self, backend: &str, fluids: &str) -> OracleResult<HandleId> {
        let unknown = || OracleError::UnknownFluid {
            backend: backend.to_string(),
            fluid: fluids.to_string(),
        };
        let model = match backend {
            "HEOS" => {
                let components = fluids
                    .split('&')
                    .map(|name| lookup_species(name.trim()).map(|s| s.params))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(unknown)?;
                match components.len() {
                    0 => return Err(unknown()),
                    1 => Model::Pure(components[0]),
                    _ => Model::Mixture {
                        components,
                        fractions: None,
                    },
                }
            }
            "INCOMP" => {
                let solution = SOLUTIONS
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(fluids))
                    .ok_or_else(unknown)?;
                Model::Incompressible {
                    solution: solution.name,
                    fraction: None,
                }
            }
            other => {
                return Err(OracleError::failed(format!("unsupported backend {other}")));
            }
        };

        let mut table = self.lock()?;
        table.next += 1;
        let id = table.next;
        table.slots.insert(
            id,
            Slot {
                model,
                imposed: None,
                point: None,
            },
        );
        Ok(id)
    }

    fn set_fractions(&self, handle: HandleId, fractions: &[f64]) -> OracleResult<()> {
        if fractions.iter().any(|x| !(0.0..=1.0).contains(x)) {
            return Err(OracleError::failed(format!(
                "fractions must lie in [0, 1], got {fractions:?}"
            )));
        }
        self.with_slot(handle, |slot| {
            slot.point = None;
            match &mut slot.model {
                Model::Pure(_) if fractions.len() == 1 => Ok(()),
                Model::Mixture {
                    components,
                    fractions: current,
                } if components.len() == fractions.len() => {
                    let sum: f64 = fractions.iter().sum();
                    if (sum - 1.0).abs() > 1e-10 {
                        return Err(OracleError::failed(format!(
                            "mole fractions must sum to 1, got {sum}"
                        )));
                    }
                    *current = Some(fractions.to_vec());
                    Ok(())
                }
                Model::Incompressible { fraction, .. } if fractions.len() == 1 => {
                    *fraction = Some(fractions[0]);
                    Ok(())
                }
                _ => Err(OracleError::failed(format!(
                    "wrong number of fractions: {}",
                    fractions.len()
                ))),
            }
        })
    }

    fn release_handle(&self, handle: HandleId) -> OracleResult<()> {
        let mut table = self.lock()?;
        table
            .slots
            .remove(&handle)
            .map(|_| ())
            .ok_or(OracleError::InvalidHandle { handle })
    }

    fn evaluate(
        &self,
        handle: HandleId,
        pair: InputPair,
        first: f64,
        second: f64,
    ) -> OracleResult<()> {
        self.with_slot(handle, |slot| {
            slot.point = None;
            let resolved = slot.model.resolve()?;
            let point = solve(&resolved, slot.imposed, pair, first, second)?;
            slot.point = Some((resolved, point));
            Ok(())
        })
    }

    fn keyed_output(&self, handle: HandleId, key: FluidParam) -> OracleResult<f64> {
        self.with_slot(handle, |slot| match &slot.point {
            Some((resolved, point)) => state_output(resolved, point, key),
            None => {
                let resolved = slot.model.resolve()?;
                trivial_output(&resolved, key).unwrap_or_else(|| {
                    Err(OracleError::failed(format!(
                        "no state has been committed (requested {key})"
                    )))
                })
            }
        })
    }

    fn specify_phase(&self, handle: HandleId, phase: Phase) -> OracleResult<()> {
        self.with_slot(handle, |slot| {
            slot.imposed = Some(phase);
            Ok(())
        })
    }

    fn unspecify_phase(&self, handle: HandleId) -> OracleResult<()> {
        self.with_slot(handle, |slot| {
            slot.imposed = None;
            Ok(())
        })
    }

    fn ha_props(
        &self,
        output: HumidAirParam,
        inputs: [(HumidAirParam, f64); 3],
    ) -> OracleResult<f64> {
        let _timer = timing::Timer::start(&oracle_timing::HA_PROPS);
        ideal_air::props(output, inputs)
    }
}
