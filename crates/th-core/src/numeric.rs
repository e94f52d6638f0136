use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Tolerance used when two streams must share a pressure [Pa].
    pub const PRESSURE: Tolerances = Tolerances {
        abs: 1e-6,
        rel: 1e-9,
    };

    /// Tolerance used when comparing mixture or solution fractions.
    pub const FRACTION: Tolerances = Tolerances {
        abs: 1e-10,
        rel: 1e-10,
    };
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Ensure `v` is a decimal fraction in the closed interval `[0, 1]`.
pub fn ensure_fraction(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(CoreError::OutOfRange { what, value: v })
    }
}

/// Flow-weighted average of two values.
///
/// Weights must be positive; callers validate them.
pub fn weighted_mean(w1: Real, v1: Real, w2: Real, v2: Real) -> Real {
    (w1 * v1 + w2 * v2) / (w1 + w2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn pressure_tolerance_is_relative_at_high_pressure() {
        assert!(nearly_equal(10.0e6, 10.0e6 + 1e-3, Tolerances::PRESSURE));
        assert!(!nearly_equal(101_325.0, 101_326.0, Tolerances::PRESSURE));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_fraction_bounds() {
        assert_eq!(ensure_fraction(0.0, "q").unwrap(), 0.0);
        assert_eq!(ensure_fraction(1.0, "q").unwrap(), 1.0);
        assert!(matches!(
            ensure_fraction(1.5, "q"),
            Err(CoreError::OutOfRange { .. })
        ));
        assert!(matches!(
            ensure_fraction(Real::INFINITY, "q"),
            Err(CoreError::NonFinite { .. })
        ));
    }

    #[test]
    fn weighted_mean_of_equal_weights_is_midpoint() {
        assert_eq!(weighted_mean(2.0, 10.0, 2.0, 20.0), 15.0);
        assert_eq!(weighted_mean(3.0, 10.0, 1.0, 20.0), 12.5);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn weighted_mean_stays_between_inputs(
            w1 in 1e-3_f64..1e3,
            w2 in 1e-3_f64..1e3,
            a in -1e6_f64..1e6,
            b in -1e6_f64..1e6,
        ) {
            let m = weighted_mean(w1, a, w2, b);
            let lo = a.min(b);
            let hi = a.max(b);
            let slack = 1e-9 * lo.abs().max(hi.abs()).max(1.0);
            prop_assert!(m >= lo - slack && m <= hi + slack);
        }
    }
}
