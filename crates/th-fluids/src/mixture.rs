//! Mixtures of pure fluids.

use crate::catalog::FluidName;
use crate::composition::Composition;
use crate::error::FluidResult;
use crate::oracle::{PropertyOracle, default_oracle};
use crate::state::{AbstractFluid, StateCore};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const MIXTURE_BACKEND: &str = "HEOS";

/// State of a mixture of pure fluids with fixed mole fractions.
#[derive(Debug)]
pub struct Mixture {
    composition: Composition,
    core: StateCore,
}

impl Mixture {
    /// Mixture on the default oracle. `fractions` are mole fractions (decimal).
    pub fn new(fluids: &[FluidName], fractions: &[f64]) -> FluidResult<Self> {
        Self::from_composition(Composition::new(fluids, fractions)?, default_oracle())
    }

    pub fn with_oracle(
        fluids: &[FluidName],
        fractions: &[f64],
        oracle: Arc<dyn PropertyOracle>,
    ) -> FluidResult<Self> {
        Self::from_composition(Composition::new(fluids, fractions)?, oracle)
    }

    pub fn from_composition(
        composition: Composition,
        oracle: Arc<dyn PropertyOracle>,
    ) -> FluidResult<Self> {
        let core = StateCore::new(
            oracle,
            MIXTURE_BACKEND,
            &composition.oracle_fluids(),
            Some(&composition.fractions()),
        )?;
        Ok(Self { composition, core })
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn fluids(&self) -> Vec<FluidName> {
        self.composition.fluids().collect()
    }

    pub fn fractions(&self) -> Vec<f64> {
        self.composition.fractions()
    }
}

impl AbstractFluid for Mixture {
    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn factory(&self) -> FluidResult<Self> {
        Self::from_composition(self.composition.clone(), self.core.oracle().clone())
    }

    fn same_composition(&self, other: &Self) -> bool {
        self.composition.same_as(&other.composition)
    }
}

impl PartialEq for Mixture {
    fn eq(&self, other: &Self) -> bool {
        self.composition.identity_bits() == other.composition.identity_bits()
            && self.core.canonical_inputs() == other.core.canonical_inputs()
    }
}

impl Eq for Mixture {}

impl Hash for Mixture {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.composition.identity_bits().hash(state);
        self.core.canonical_inputs().hash(state);
    }
}
