//! Ideal-gas psychrometrics for the reference oracle.
//!
//! Dry air and water vapour are ideal gases; saturation over liquid water
//! follows the Magnus formula. Any three distinct inputs that include the
//! pressure are supported.

use super::{OracleError, OracleResult};
use crate::params::HumidAirParam;
use th_core::units::constants::{P_ATM_PA, T0_K};

/// Ratio of the molar masses of water and dry air.
const EPS: f64 = 0.621_945;
/// Specific gas constant of dry air [J/(kg·K)]
const R_DA: f64 = 287.042;
/// Specific gas constant of water vapour [J/(kg·K)]
const R_W: f64 = 461.52;
const CP_DA: f64 = 1006.0;
const CP_W: f64 = 1860.0;
/// Latent heat of vaporization at 0 °C [J/kg]
const H_FG0: f64 = 2_501_000.0;
/// Vapour entropy at the triple point [J/(kg·K)]
const S_W0: f64 = 9155.6;
const P_TRIPLE_W: f64 = 611.657;
/// `1 / EPS - 1`
const VOLUME_FACTOR: f64 = 1.607_858;

const T_LO: f64 = 173.15;
const T_HI: f64 = 473.15;
const SCAN_STEPS: usize = 400;
const BISECTION_STEPS: usize = 200;

/// Saturation pressure of water vapour over liquid water [Pa].
fn p_sat(t: f64) -> f64 {
    let tc = t - T0_K;
    611.2 * (17.62 * tc / (243.12 + tc)).exp()
}

/// Inverse of [`p_sat`] [K].
fn t_sat(pw: f64) -> f64 {
    let gamma = (pw / 611.2).ln();
    T0_K + 243.12 * gamma / (17.62 - gamma)
}

fn ratio_from_partial_pressure(p: f64, pw: f64) -> f64 {
    if pw >= p {
        f64::NAN
    } else {
        EPS * pw / (p - pw)
    }
}

fn partial_pressure(p: f64, w: f64) -> f64 {
    p * w / (EPS + w)
}

/// Humidity ratio from dry-bulb and wet-bulb temperatures (psychrometer equation).
fn ratio_from_wet_bulb(t: f64, t_wb: f64, p: f64) -> f64 {
    let (tc, tc_wb) = (t - T0_K, t_wb - T0_K);
    let w_sat = ratio_from_partial_pressure(p, p_sat(t_wb));
    ((2501.0 - 2.326 * tc_wb) * w_sat - 1.006 * (tc - tc_wb))
        / (2501.0 + 1.86 * tc - 4.186 * tc_wb)
}

fn wet_bulb(t: f64, p: f64, w: f64) -> OracleResult<f64> {
    if (ratio_from_wet_bulb(t, t, p) - w).abs() <= 1e-12 {
        return Ok(t);
    }
    bracket_root(|t_wb| ratio_from_wet_bulb(t, t_wb, p) - w, T_LO, t)
}

/// Humidity ratios that do not depend on the dry-bulb temperature.
fn is_temperature_free(key: HumidAirParam) -> bool {
    matches!(
        key,
        HumidAirParam::W | HumidAirParam::DewPoint | HumidAirParam::PartialPressure
    )
}

/// Humidity ratio at a known dry-bulb temperature from one more input.
fn humidity_at(t: f64, p: f64, key: HumidAirParam, value: f64) -> OracleResult<f64> {
    let tc = t - T0_K;
    let w = match key {
        HumidAirParam::W => value,
        HumidAirParam::R => ratio_from_partial_pressure(p, value * p_sat(t)),
        HumidAirParam::PartialPressure => ratio_from_partial_pressure(p, value),
        HumidAirParam::DewPoint => ratio_from_partial_pressure(p, p_sat(value)),
        HumidAirParam::Hda => (value - CP_DA * tc) / (H_FG0 + CP_W * tc),
        HumidAirParam::Hha => (value - CP_DA * tc) / (H_FG0 + CP_W * tc - value),
        HumidAirParam::Vda => (value * p / (R_DA * t) - 1.0) / VOLUME_FACTOR,
        HumidAirParam::Vha => {
            let a = R_DA * t / p;
            (value - a) / (VOLUME_FACTOR * a - value)
        }
        HumidAirParam::WetBulb => ratio_from_wet_bulb(t, value, p),
        HumidAirParam::T | HumidAirParam::P => {
            return Err(OracleError::failed(format!(
                "{key} does not determine the humidity"
            )));
        }
        other => {
            let w_max = ratio_from_partial_pressure(p, p_sat(t)).min(1.0);
            let w_max = if w_max.is_finite() { w_max } else { 1.0 };
            return bracket_root(
                |w| output_at(other, t, p, w).unwrap_or(f64::NAN) - value,
                0.0,
                w_max,
            );
        }
    };
    Ok(w)
}

/// Property of humid air at dry-bulb temperature `t`, pressure `p` and humidity ratio `w`.
fn output_at(key: HumidAirParam, t: f64, p: f64, w: f64) -> OracleResult<f64> {
    let tc = t - T0_K;
    let pw = partial_pressure(p, w);
    let per_humid_air = |v: f64| v / (1.0 + w);
    let enthalpy_da = CP_DA * tc + w * (H_FG0 + CP_W * tc);
    let volume_da = R_DA * t * (1.0 + VOLUME_FACTOR * w) / p;

    let value = match key {
        HumidAirParam::T => t,
        HumidAirParam::P => p,
        HumidAirParam::W => w,
        HumidAirParam::R => pw / p_sat(t),
        HumidAirParam::Hda => enthalpy_da,
        HumidAirParam::Hha => per_humid_air(enthalpy_da),
        HumidAirParam::Vda => volume_da,
        HumidAirParam::Vha => per_humid_air(volume_da),
        HumidAirParam::Sda => entropy_da(t, p, w),
        HumidAirParam::Sha => per_humid_air(entropy_da(t, p, w)),
        HumidAirParam::Cda => CP_DA + w * CP_W,
        HumidAirParam::Cha => per_humid_air(CP_DA + w * CP_W),
        HumidAirParam::CVha => per_humid_air((CP_DA - R_DA) + w * (CP_W - R_W)),
        HumidAirParam::DewPoint if pw <= 0.0 => {
            return Err(OracleError::not_available(key));
        }
        HumidAirParam::DewPoint => t_sat(pw),
        HumidAirParam::WetBulb => wet_bulb(t, p, w)?,
        HumidAirParam::PartialPressure => pw,
        HumidAirParam::Viscosity => {
            let x = pw / p;
            let mu_da = 1.716e-5 * (t / T0_K).powf(1.5) * (T0_K + 110.4) / (t + 110.4);
            let mu_w = 8.02e-6 + 4.0e-8 * tc;
            (1.0 - x) * mu_da + x * mu_w
        }
        HumidAirParam::Conductivity => {
            let x = pw / p;
            let k_da = 0.0241 * (t / T0_K).powf(0.81);
            let k_w = 0.0171 + 8.0e-5 * tc;
            (1.0 - x) * k_da + x * k_w
        }
        HumidAirParam::Compressibility => 1.0,
    };
    Ok(value)
}

/// Entropy per kg dry air, referenced to dry air at 0 °C / 1 atm and vapour at the triple point.
fn entropy_da(t: f64, p: f64, w: f64) -> f64 {
    let pw = partial_pressure(p, w);
    let dry = CP_DA * (t / T0_K).ln() - R_DA * ((p - pw) / P_ATM_PA).ln();
    if w > 0.0 {
        let vapor = S_W0 + CP_W * (t / T0_K).ln() - R_W * (pw / P_TRIPLE_W).ln();
        dry + w * vapor
    } else {
        dry
    }
}

/// Root of `f` on `[lo, hi]`: scan for the first sign change among finite
/// samples, then bisect.
fn bracket_root(f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> OracleResult<f64> {
    let step = (hi - lo) / SCAN_STEPS as f64;
    let mut prev: Option<(f64, f64)> = None;
    for i in 0..=SCAN_STEPS {
        let x = lo + step * i as f64;
        let fx = f(x);
        if !fx.is_finite() {
            prev = None;
            continue;
        }
        if fx == 0.0 {
            return Ok(x);
        }
        if let Some((x0, f0)) = prev
            && f0.signum() != fx.signum()
        {
            return Ok(bisect(&f, x0, f0, x));
        }
        prev = Some((x, fx));
    }
    Err(OracleError::failed(
        "humid air inputs do not define a state in the supported range",
    ))
}

fn bisect(f: &impl Fn(f64) -> f64, mut lo: f64, mut f_lo: f64, mut hi: f64) -> f64 {
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 || (hi - lo).abs() < 1e-12 {
            return mid;
        }
        if f_mid.is_finite() && f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Residual with invalid humidity ratios mapped to NaN.
fn residual(key: HumidAirParam, t: f64, p: f64, w: f64, target: f64) -> f64 {
    if !(w >= 0.0) {
        return f64::NAN;
    }
    output_at(key, t, p, w).map_or(f64::NAN, |v| v - target)
}

/// Dry-bulb temperature and humidity ratio from pressure and two more inputs.
fn solve(p: f64, a: (HumidAirParam, f64), b: (HumidAirParam, f64)) -> OracleResult<(f64, f64)> {
    if a.0 == HumidAirParam::T {
        return Ok((a.1, humidity_at(a.1, p, b.0, b.1)?));
    }
    if b.0 == HumidAirParam::T {
        return Ok((b.1, humidity_at(b.1, p, a.0, a.1)?));
    }
    let (known, other) = if is_temperature_free(a.0) {
        (a, b)
    } else if is_temperature_free(b.0) {
        (b, a)
    } else {
        let t = bracket_root(
            |t| match humidity_at(t, p, a.0, a.1) {
                Ok(w) => residual(b.0, t, p, w, b.1),
                Err(_) => f64::NAN,
            },
            T_LO,
            T_HI,
        )?;
        return Ok((t, humidity_at(t, p, a.0, a.1)?));
    };
    let w = humidity_at(T0_K, p, known.0, known.1)?;
    let t = bracket_root(|t| residual(other.0, t, p, w, other.1), T_LO, T_HI)?;
    Ok((t, w))
}

pub(super) fn props(
    output: HumidAirParam,
    inputs: [(HumidAirParam, f64); 3],
) -> OracleResult<f64> {
    if let Some((key, value)) = inputs.iter().find(|(_, v)| !v.is_finite()) {
        return Err(OracleError::failed(format!("non-finite input {key} = {value}")));
    }
    let p_index = inputs
        .iter()
        .position(|(key, _)| *key == HumidAirParam::P)
        .ok_or_else(|| OracleError::failed("pressure must be one of the humid air inputs"))?;
    let p = inputs[p_index].1;
    if p <= 0.0 {
        return Err(OracleError::failed(format!("invalid pressure {p} Pa")));
    }
    let mut rest = inputs
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != p_index)
        .map(|(_, input)| *input);
    let (Some(a), Some(b)) = (rest.next(), rest.next()) else {
        return Err(OracleError::failed("three humid air inputs are required"));
    };
    if a.0 == b.0 {
        return Err(OracleError::failed(format!("duplicate humid air input {}", a.0)));
    }

    let (t, w) = solve(p, a, b)?;
    if !(t.is_finite() && w.is_finite()) || w < 0.0 || t <= 0.0 {
        return Err(OracleError::failed(format!(
            "humid air inputs give an invalid state (T = {t} K, W = {w})"
        )));
    }
    let rh = partial_pressure(p, w) / p_sat(t);
    if rh > 1.0 + 1e-6 {
        return Err(OracleError::failed(format!(
            "humid air is supersaturated (relative humidity {rh})"
        )));
    }
    output_at(output, t, p, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: (HumidAirParam, f64) = (HumidAirParam::P, P_ATM_PA);
    const T20: (HumidAirParam, f64) = (HumidAirParam::T, 293.15);
    const R50: (HumidAirParam, f64) = (HumidAirParam::R, 0.5);

    #[test]
    fn humidity_ratio_at_twenty_degrees() {
        let w = props(HumidAirParam::W, [P, T20, R50]).unwrap();
        assert_relative_eq!(w, 0.007_24, max_relative = 5e-3);
        let dew = props(HumidAirParam::DewPoint, [P, T20, R50]).unwrap();
        assert_relative_eq!(dew, 282.4, max_relative = 1e-3);
    }

    #[test]
    fn inputs_are_order_independent() {
        let a = props(HumidAirParam::Hha, [P, T20, R50]).unwrap();
        let b = props(HumidAirParam::Hha, [R50, P, T20]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn enthalpy_and_humidity_recover_temperature() {
        let h = props(HumidAirParam::Hha, [P, T20, R50]).unwrap();
        let w = props(HumidAirParam::W, [P, T20, R50]).unwrap();
        let t = props(
            HumidAirParam::T,
            [P, (HumidAirParam::Hha, h), (HumidAirParam::W, w)],
        )
        .unwrap();
        assert_relative_eq!(t, 293.15, max_relative = 1e-9);
    }

    #[test]
    fn enthalpy_and_relative_humidity_recover_temperature() {
        let h = props(HumidAirParam::Hha, [P, T20, R50]).unwrap();
        let t = props(HumidAirParam::T, [P, (HumidAirParam::Hha, h), R50]).unwrap();
        assert_relative_eq!(t, 293.15, max_relative = 1e-6);
    }

    #[test]
    fn wet_bulb_lies_between_dew_point_and_dry_bulb() {
        let wb = props(HumidAirParam::WetBulb, [P, T20, R50]).unwrap();
        let dew = props(HumidAirParam::DewPoint, [P, T20, R50]).unwrap();
        assert!(wb > dew && wb < 293.15);

        let w = props(HumidAirParam::W, [P, T20, (HumidAirParam::WetBulb, wb)]).unwrap();
        assert_relative_eq!(w, props(HumidAirParam::W, [P, T20, R50]).unwrap(), max_relative = 1e-6);
    }

    #[test]
    fn saturated_air_has_wet_bulb_equal_to_dry_bulb() {
        let wb = props(HumidAirParam::WetBulb, [P, T20, (HumidAirParam::R, 1.0)]).unwrap();
        assert_relative_eq!(wb, 293.15, max_relative = 1e-6);
    }

    #[test]
    fn dry_air_has_no_dew_point() {
        let err = props(HumidAirParam::DewPoint, [P, T20, (HumidAirParam::W, 0.0)]).unwrap_err();
        assert!(matches!(err, OracleError::NotAvailable { .. }));
    }

    #[test]
    fn supersaturated_air_is_rejected() {
        assert!(props(HumidAirParam::W, [P, T20, (HumidAirParam::R, 1.2)]).is_err());
        assert!(props(HumidAirParam::R, [P, T20, (HumidAirParam::W, 0.1)]).is_err());
    }

    #[test]
    fn pressure_is_required() {
        let err = props(
            HumidAirParam::W,
            [T20, R50, (HumidAirParam::Hha, 40_000.0)],
        )
        .unwrap_err();
        assert!(matches!(err, OracleError::Failed { .. }));
    }

    #[test]
    fn specific_volume_is_per_humid_air() {
        let v_da = props(HumidAirParam::Vda, [P, T20, R50]).unwrap();
        let v_ha = props(HumidAirParam::Vha, [P, T20, R50]).unwrap();
        let w = props(HumidAirParam::W, [P, T20, R50]).unwrap();
        assert_relative_eq!(v_ha, v_da / (1.0 + w), max_relative = 1e-12);
        let t = props(HumidAirParam::T, [P, (HumidAirParam::Vha, v_ha), R50]).unwrap();
        assert_relative_eq!(t, 293.15, max_relative = 1e-6);
    }
}
