// th-core/src/units.rs

use uom::si::f64::{
    Length as UomLength, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

pub mod constants {
    /// Standard atmospheric pressure [Pa].
    pub const P_ATM_PA: f64 = 101_325.0;

    /// Offset between the Kelvin and Celsius scales [K].
    pub const T0_K: f64 = 273.15;

    /// Molar gas constant [J/(mol·K)].
    pub const R_MOLAR: f64 = 8.314_462_618;
}
