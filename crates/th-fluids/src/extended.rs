//! States with additional molar and volumetric properties.

use crate::error::FluidResult;
use crate::humid_air::{AbstractHumidAir, HumidAir, HumidAirCore};
use crate::params::{FluidParam, HumidAirParam};
use crate::state::{AbstractFluid, StateCore};

/// Fluid or mixture state with molar and volumetric properties.
///
/// Processes run on the wrapper return wrapped states as well.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Extended<S> {
    base: S,
}

impl<S: AbstractFluid> Extended<S> {
    pub fn new(base: S) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &S {
        &self.base
    }

    pub fn into_base(self) -> S {
        self.base
    }

    /// Molar density [mol/m³].
    pub fn molar_density(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::DMolar)
    }

    /// Molar specific enthalpy [J/mol].
    pub fn molar_enthalpy(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::HMolar)
    }

    /// Molar specific entropy [J/(mol·K)].
    pub fn molar_entropy(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::SMolar)
    }

    /// Molar specific internal energy [J/mol].
    pub fn molar_internal_energy(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::UMolar)
    }

    /// Molar isobaric specific heat [J/(mol·K)].
    pub fn molar_specific_heat(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::CpMolar)
    }

    /// Mass isochoric specific heat [J/(kg·K)].
    pub fn isochoric_specific_heat(&self) -> FluidResult<f64> {
        self.core().value_of(FluidParam::CvMass)
    }

    /// Mass specific volume [m³/kg].
    pub fn specific_volume(&self) -> FluidResult<f64> {
        Ok(1.0 / self.density()?)
    }

    /// Molar gas constant [J/(mol·K)].
    pub fn gas_constant(&self) -> FluidResult<Option<f64>> {
        self.core().nullable_value_of(FluidParam::GasConstant)
    }
}

impl<S: AbstractFluid> From<S> for Extended<S> {
    fn from(base: S) -> Self {
        Self::new(base)
    }
}

impl<S: AbstractFluid> AbstractFluid for Extended<S> {
    fn core(&self) -> &StateCore {
        self.base.core()
    }

    fn core_mut(&mut self) -> &mut StateCore {
        self.base.core_mut()
    }

    fn factory(&self) -> FluidResult<Self> {
        Ok(Self::new(self.base.factory()?))
    }

    fn same_composition(&self, other: &Self) -> bool {
        self.base.same_composition(&other.base)
    }
}

/// Humid air state with dry-air based and volumetric properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExtendedHumidAir {
    base: HumidAir,
}

impl ExtendedHumidAir {
    pub fn new(base: HumidAir) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &HumidAir {
        &self.base
    }

    /// Specific volume per kg humid air [m³/kg].
    pub fn specific_volume(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Vha)
    }

    /// Specific volume per kg dry air [m³/kg].
    pub fn specific_volume_dry_air(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Vda)
    }

    /// Enthalpy per kg dry air [J/kg].
    pub fn enthalpy_dry_air(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Hda)
    }

    /// Entropy per kg dry air [J/(kg·K)].
    pub fn entropy_dry_air(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Sda)
    }

    /// Isobaric specific heat per kg dry air [J/(kg·K)].
    pub fn specific_heat_dry_air(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::Cda)
    }

    /// Isochoric specific heat per kg humid air [J/(kg·K)].
    pub fn isochoric_specific_heat(&self) -> FluidResult<f64> {
        self.core().value_of(HumidAirParam::CVha)
    }
}

impl From<HumidAir> for ExtendedHumidAir {
    fn from(base: HumidAir) -> Self {
        Self::new(base)
    }
}

impl AbstractHumidAir for ExtendedHumidAir {
    fn core(&self) -> &HumidAirCore {
        self.base.core()
    }

    fn core_mut(&mut self) -> &mut HumidAirCore {
        self.base.core_mut()
    }

    fn factory(&self) -> Self {
        Self::new(self.base.factory())
    }
}
