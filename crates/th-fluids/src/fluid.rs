//! Pure fluids and incompressible solutions.

use crate::catalog::FluidName;
use crate::error::FluidResult;
use crate::oracle::{PropertyOracle, default_oracle};
use crate::state::{AbstractFluid, StateCore};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use th_core::numeric::{Tolerances, nearly_equal};

/// State of a pure fluid or an incompressible solution.
///
/// ```no_run
/// use th_fluids::{AbstractFluid, Fluid, FluidInput, FluidName};
///
/// let mut water = Fluid::new(FluidName::Water)?;
/// water.update(FluidInput::pressure(101_325.0), FluidInput::temperature(423.15))?;
/// println!("h = {} J/kg", water.enthalpy()?);
/// # Ok::<(), th_fluids::FluidError>(())
/// ```
#[derive(Debug)]
pub struct Fluid {
    name: FluidName,
    fraction: Option<f64>,
    core: StateCore,
}

impl Fluid {
    /// Pure fluid on the default oracle.
    pub fn new(name: FluidName) -> FluidResult<Self> {
        Self::with_oracle(name, None, default_oracle())
    }

    /// Incompressible solution with a mass or volume fraction (decimal) on the default oracle.
    pub fn with_fraction(name: FluidName, fraction: f64) -> FluidResult<Self> {
        Self::with_oracle(name, Some(fraction), default_oracle())
    }

    pub fn with_oracle(
        name: FluidName,
        fraction: Option<f64>,
        oracle: Arc<dyn PropertyOracle>,
    ) -> FluidResult<Self> {
        name.check_fraction(fraction)?;
        let info = name.info();
        let fractions = fraction.map(|x| [x]);
        let core = StateCore::new(
            oracle,
            info.backend,
            info.coolprop_name,
            fractions.as_ref().map(|x| x.as_slice()),
        )?;
        Ok(Self {
            name,
            fraction,
            core,
        })
    }

    pub fn name(&self) -> FluidName {
        self.name
    }

    /// Solution fraction; `None` for pure fluids.
    pub fn fraction(&self) -> Option<f64> {
        self.fraction
    }

    pub fn backend(&self) -> &'static str {
        self.name.info().backend
    }
}

impl AbstractFluid for Fluid {
    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn factory(&self) -> FluidResult<Self> {
        Self::with_oracle(self.name, self.fraction, self.core.oracle().clone())
    }

    fn same_composition(&self, other: &Self) -> bool {
        self.name == other.name
            && match (self.fraction, other.fraction) {
                (None, None) => true,
                (Some(a), Some(b)) => nearly_equal(a, b, Tolerances::FRACTION),
                _ => false,
            }
    }
}

impl PartialEq for Fluid {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fraction.map(f64::to_bits) == other.fraction.map(f64::to_bits)
            && self.core.canonical_inputs() == other.core.canonical_inputs()
    }
}

impl Eq for Fluid {}

impl Hash for Fluid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.fraction.map(f64::to_bits).hash(state);
        self.core.canonical_inputs().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FluidError;
    use crate::input::FluidInput;
    use crate::oracle::IdealOracle;
    use crate::params::Phase;
    use approx::assert_relative_eq;

    fn water() -> Fluid {
        Fluid::with_oracle(FluidName::Water, None, Arc::new(IdealOracle::new())).unwrap()
    }

    #[test]
    fn fresh_fluid_has_unknown_phase() {
        let fluid = water();
        assert_eq!(fluid.phase().unwrap(), Phase::Unknown);
        assert!(matches!(
            fluid.temperature(),
            Err(FluidError::Definition { count: 2 })
        ));
    }

    #[test]
    fn defining_inputs_are_echoed_exactly() {
        let mut fluid = water();
        fluid
            .update(FluidInput::pressure(101_325.0), FluidInput::temperature(423.15))
            .unwrap();
        assert_eq!(fluid.pressure().unwrap(), 101_325.0);
        assert_eq!(fluid.temperature().unwrap(), 423.15);
        assert_eq!(fluid.phase().unwrap(), Phase::Gas);
    }

    #[test]
    fn kinematic_viscosity_is_dynamic_over_density() {
        let mut fluid = water();
        fluid
            .update(FluidInput::pressure(101_325.0), FluidInput::temperature(293.15))
            .unwrap();
        let mu = fluid.dynamic_viscosity().unwrap().unwrap();
        let rho = fluid.density().unwrap();
        assert_relative_eq!(
            fluid.kinematic_viscosity().unwrap().unwrap(),
            mu / rho,
            max_relative = 1e-12
        );
    }

    #[test]
    fn solution_requires_fraction() {
        let oracle: Arc<dyn PropertyOracle> = Arc::new(IdealOracle::new());
        assert!(Fluid::with_oracle(FluidName::MPG, None, oracle.clone()).is_err());
        assert!(Fluid::with_oracle(FluidName::Water, Some(0.2), oracle.clone()).is_err());

        let mut glycol = Fluid::with_oracle(FluidName::MPG, Some(0.4), oracle).unwrap();
        assert_eq!(glycol.backend(), "INCOMP");
        glycol
            .update(FluidInput::pressure(2e5), FluidInput::temperature(263.15))
            .unwrap();
        assert_eq!(glycol.phase().unwrap(), Phase::Liquid);
        assert_relative_eq!(
            glycol.freezing_temperature().unwrap().unwrap(),
            273.15 - 85.0 * 0.4,
            max_relative = 1e-12
        );
        assert_eq!(glycol.molar_mass().unwrap(), None);
    }

    #[test]
    fn factory_shares_composition_but_not_state() {
        let mut fluid = water();
        fluid
            .update(FluidInput::pressure(101_325.0), FluidInput::temperature(300.0))
            .unwrap();
        let empty = fluid.factory().unwrap();
        assert!(fluid.same_composition(&empty));
        assert!(empty.inputs().is_empty());
        assert_eq!(empty.phase().unwrap(), Phase::Unknown);
    }
}
