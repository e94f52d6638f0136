//! Mixture composition.

use crate::catalog::FluidName;
use crate::error::{FluidError, FluidResult};
use th_core::numeric::{Tolerances, nearly_equal};

/// Components of a mixture and their mole fractions.
///
/// Always at least two distinct pure components, every fraction in (0, 1),
/// fractions summing to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    items: Vec<(FluidName, f64)>,
}

impl Composition {
    /// Build a composition from parallel lists of fluids and mole fractions.
    pub fn new(fluids: &[FluidName], fractions: &[f64]) -> FluidResult<Self> {
        if fluids.len() != fractions.len() {
            return Err(FluidError::InvalidArg {
                what: "fluids and fractions should be of the same length".into(),
            });
        }
        if fluids.len() < 2 {
            return Err(FluidError::InvalidArg {
                what: "a mixture needs at least two components".into(),
            });
        }
        if let Some(fluid) = fluids.iter().find(|fluid| !fluid.is_pure()) {
            return Err(FluidError::InvalidArg {
                what: format!("all mixture components must be pure fluids ({fluid} is not)"),
            });
        }
        for (i, fluid) in fluids.iter().enumerate() {
            if fluids[..i].contains(fluid) {
                return Err(FluidError::InvalidArg {
                    what: format!("duplicate mixture component {fluid}"),
                });
            }
        }

        let sum: f64 = fractions.iter().sum();
        let in_range = fractions
            .iter()
            .all(|x| x.is_finite() && *x > 0.0 && *x < 1.0);
        if !in_range || !nearly_equal(sum, 1.0, Tolerances::FRACTION) {
            return Err(FluidError::InvalidArg {
                what: "invalid component fractions: all of them should be in (0, 1) \
                       and their sum should be equal to 1"
                    .into(),
            });
        }

        Ok(Self {
            items: fluids.iter().copied().zip(fractions.iter().copied()).collect(),
        })
    }

    pub fn fluids(&self) -> impl Iterator<Item = FluidName> + '_ {
        self.items.iter().map(|(fluid, _)| *fluid)
    }

    pub fn fractions(&self) -> Vec<f64> {
        self.items.iter().map(|(_, x)| *x).collect()
    }

    /// `&`-joined oracle names, e.g. `Water&Ammonia`.
    pub fn oracle_fluids(&self) -> String {
        self.items
            .iter()
            .map(|(fluid, _)| fluid.coolprop_name())
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Same components in the same order with fractions equal within tolerance.
    pub fn same_as(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|((a, x), (b, y))| a == b && nearly_equal(*x, *y, Tolerances::FRACTION))
    }

    pub(crate) fn identity_bits(&self) -> Vec<(FluidName, u64)> {
        self.items.iter().map(|(f, x)| (*f, x.to_bits())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_mixture() {
        let comp = Composition::new(&[FluidName::Water, FluidName::Ammonia], &[0.6, 0.4]).unwrap();
        assert_eq!(comp.oracle_fluids(), "Water&Ammonia");
        assert_eq!(comp.fractions(), vec![0.6, 0.4]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let result = Composition::new(&[FluidName::Water, FluidName::Ammonia], &[1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn single_component_is_rejected() {
        assert!(Composition::new(&[FluidName::Water], &[1.0]).is_err());
    }

    #[test]
    fn solutions_are_rejected() {
        let result = Composition::new(&[FluidName::Water, FluidName::MPG], &[0.5, 0.5]);
        assert!(result.is_err());
    }

    #[test]
    fn duplicates_are_rejected() {
        let result = Composition::new(&[FluidName::Water, FluidName::Water], &[0.5, 0.5]);
        assert!(result.is_err());
    }

    #[test]
    fn fractions_must_be_open_and_sum_to_one() {
        let fluids = [FluidName::Water, FluidName::Ammonia];
        assert!(Composition::new(&fluids, &[0.0, 1.0]).is_err());
        assert!(Composition::new(&fluids, &[0.5, 0.6]).is_err());
        assert!(Composition::new(&fluids, &[f64::NAN, 0.5]).is_err());
    }

    #[test]
    fn same_as_uses_fraction_tolerance() {
        let fluids = [FluidName::Water, FluidName::Ammonia];
        let a = Composition::new(&fluids, &[0.6, 0.4]).unwrap();
        let b = Composition::new(&fluids, &[0.6 + 1e-12, 0.4 - 1e-12]).unwrap();
        let c = Composition::new(&fluids, &[0.5, 0.5]).unwrap();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn complementary_fractions_are_accepted(x in 0.001_f64..0.999_f64) {
            let comp = Composition::new(&[FluidName::R32, FluidName::R134a], &[x, 1.0 - x]);
            prop_assert!(comp.is_ok());
            let sum: f64 = comp.unwrap().fractions().iter().sum();
            prop_assert!(nearly_equal(sum, 1.0, Tolerances::FRACTION));
        }
    }
}
