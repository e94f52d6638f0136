//! Canonical keys shared with the property oracle.
//!
//! Names follow the CoolProp vocabulary: [`FluidParam::high_level_key`] is the
//! string used to build input-pair names, [`HumidAirParam::as_str`] is the key
//! passed to the humid-air routine.

use std::fmt;

/// Keyed output / input parameter of a fluid or mixture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FluidParam {
    /// Molar density [mol/m³]
    DMolar,
    /// Mass density [kg/m³]
    DMass,
    /// Molar specific enthalpy [J/mol]
    HMolar,
    /// Mass specific enthalpy [J/kg]
    HMass,
    /// Pressure [Pa]
    P,
    /// Vapor quality [-]
    Q,
    /// Molar specific entropy [J/(mol·K)]
    SMolar,
    /// Mass specific entropy [J/(kg·K)]
    SMass,
    /// Temperature [K]
    T,
    /// Molar specific internal energy [J/mol]
    UMolar,
    /// Mass specific internal energy [J/kg]
    UMass,
    CpMass,
    CpMolar,
    CvMass,
    CvMolar,
    Conductivity,
    DynamicViscosity,
    Prandtl,
    SoundSpeed,
    SurfaceTension,
    Phase,
    Compressibility,
    MolarMass,
    TCritical,
    PCritical,
    TMax,
    TMin,
    PMax,
    PMin,
    TTriple,
    PTriple,
    TFreeze,
    GasConstant,
}

impl FluidParam {
    /// CoolProp high-level key, used to build `"{first}{second}_INPUTS"` names.
    pub fn high_level_key(self) -> &'static str {
        match self {
            Self::DMolar => "Dmolar",
            Self::DMass => "Dmass",
            Self::HMolar => "Hmolar",
            Self::HMass => "Hmass",
            Self::P => "P",
            Self::Q => "Q",
            Self::SMolar => "Smolar",
            Self::SMass => "Smass",
            Self::T => "T",
            Self::UMolar => "Umolar",
            Self::UMass => "Umass",
            Self::CpMass => "Cpmass",
            Self::CpMolar => "Cpmolar",
            Self::CvMass => "Cvmass",
            Self::CvMolar => "Cvmolar",
            Self::Conductivity => "conductivity",
            Self::DynamicViscosity => "viscosity",
            Self::Prandtl => "Prandtl",
            Self::SoundSpeed => "speed_of_sound",
            Self::SurfaceTension => "surface_tension",
            Self::Phase => "Phase",
            Self::Compressibility => "Z",
            Self::MolarMass => "molar_mass",
            Self::TCritical => "Tcrit",
            Self::PCritical => "pcrit",
            Self::TMax => "Tmax",
            Self::TMin => "Tmin",
            Self::PMax => "pmax",
            Self::PMin => "pmin",
            Self::TTriple => "Ttriple",
            Self::PTriple => "ptriple",
            Self::TFreeze => "T_freeze",
            Self::GasConstant => "gas_constant",
        }
    }
}

impl fmt::Display for FluidParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.high_level_key())
    }
}

/// Ordered input pair accepted by the oracle's state update.
///
/// Declared in CoolProp's `input_pairs` order; [`InputPair::index`] is the
/// native enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPair {
    QT,
    PQ,
    QSMolar,
    QSMass,
    HMolarQ,
    HMassQ,
    DMolarQ,
    DMassQ,
    PT,
    DMassT,
    DMolarT,
    HMolarT,
    HMassT,
    SMolarT,
    SMassT,
    TUMolar,
    TUMass,
    DMassP,
    DMolarP,
    HMassP,
    HMolarP,
    PSMass,
    PSMolar,
    PUMass,
    PUMolar,
    HMassSMass,
    HMolarSMolar,
    SMassUMass,
    SMolarUMolar,
    DMassHMass,
    DMolarHMolar,
    DMassSMass,
    DMolarSMolar,
    DMassUMass,
    DMolarUMolar,
}

const INPUT_PAIRS: [(InputPair, &str); 35] = [
    (InputPair::QT, "QT_INPUTS"),
    (InputPair::PQ, "PQ_INPUTS"),
    (InputPair::QSMolar, "QSmolar_INPUTS"),
    (InputPair::QSMass, "QSmass_INPUTS"),
    (InputPair::HMolarQ, "HmolarQ_INPUTS"),
    (InputPair::HMassQ, "HmassQ_INPUTS"),
    (InputPair::DMolarQ, "DmolarQ_INPUTS"),
    (InputPair::DMassQ, "DmassQ_INPUTS"),
    (InputPair::PT, "PT_INPUTS"),
    (InputPair::DMassT, "DmassT_INPUTS"),
    (InputPair::DMolarT, "DmolarT_INPUTS"),
    (InputPair::HMolarT, "HmolarT_INPUTS"),
    (InputPair::HMassT, "HmassT_INPUTS"),
    (InputPair::SMolarT, "SmolarT_INPUTS"),
    (InputPair::SMassT, "SmassT_INPUTS"),
    (InputPair::TUMolar, "TUmolar_INPUTS"),
    (InputPair::TUMass, "TUmass_INPUTS"),
    (InputPair::DMassP, "DmassP_INPUTS"),
    (InputPair::DMolarP, "DmolarP_INPUTS"),
    (InputPair::HMassP, "HmassP_INPUTS"),
    (InputPair::HMolarP, "HmolarP_INPUTS"),
    (InputPair::PSMass, "PSmass_INPUTS"),
    (InputPair::PSMolar, "PSmolar_INPUTS"),
    (InputPair::PUMass, "PUmass_INPUTS"),
    (InputPair::PUMolar, "PUmolar_INPUTS"),
    (InputPair::HMassSMass, "HmassSmass_INPUTS"),
    (InputPair::HMolarSMolar, "HmolarSmolar_INPUTS"),
    (InputPair::SMassUMass, "SmassUmass_INPUTS"),
    (InputPair::SMolarUMolar, "SmolarUmolar_INPUTS"),
    (InputPair::DMassHMass, "DmassHmass_INPUTS"),
    (InputPair::DMolarHMolar, "DmolarHmolar_INPUTS"),
    (InputPair::DMassSMass, "DmassSmass_INPUTS"),
    (InputPair::DMolarSMolar, "DmolarSmolar_INPUTS"),
    (InputPair::DMassUMass, "DmassUmass_INPUTS"),
    (InputPair::DMolarUMolar, "DmolarUmolar_INPUTS"),
];

impl InputPair {
    /// Look up a pair by its CoolProp name (e.g. `"HmassP_INPUTS"`).
    pub fn from_name(name: &str) -> Option<Self> {
        INPUT_PAIRS
            .iter()
            .find(|(_, candidate)| *candidate == name)
            .map(|(pair, _)| *pair)
    }

    /// CoolProp name of this pair.
    pub fn name(self) -> &'static str {
        INPUT_PAIRS[self.position()].1
    }

    /// Native `input_pairs` enum value (1-based; 0 is the invalid pair).
    pub fn index(self) -> u8 {
        self.position() as u8 + 1
    }

    fn position(self) -> usize {
        INPUT_PAIRS
            .iter()
            .position(|(pair, _)| *pair == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for InputPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phase region of a state, in CoolProp's `phases` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    Liquid,
    Supercritical,
    SupercriticalGas,
    SupercriticalLiquid,
    CriticalPoint,
    Gas,
    TwoPhase,
    #[default]
    Unknown,
    NotImposed,
}

impl Phase {
    const ALL: [Phase; 9] = [
        Phase::Liquid,
        Phase::Supercritical,
        Phase::SupercriticalGas,
        Phase::SupercriticalLiquid,
        Phase::CriticalPoint,
        Phase::Gas,
        Phase::TwoPhase,
        Phase::Unknown,
        Phase::NotImposed,
    ];

    /// Native enum value.
    pub fn index(self) -> u8 {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(7) as u8
    }

    /// Decode the keyed output of [`FluidParam::Phase`]; anything unexpected is `Unknown`.
    pub fn from_output(value: f64) -> Self {
        if !value.is_finite() || value < 0.0 {
            return Phase::Unknown;
        }
        Self::ALL
            .get(value.round() as usize)
            .copied()
            .unwrap_or(Phase::Unknown)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Liquid => "Liquid",
            Phase::Supercritical => "Supercritical",
            Phase::SupercriticalGas => "Supercritical gas",
            Phase::SupercriticalLiquid => "Supercritical liquid",
            Phase::CriticalPoint => "Critical point",
            Phase::Gas => "Gas",
            Phase::TwoPhase => "Two-phase",
            Phase::Unknown => "Unknown",
            Phase::NotImposed => "Not imposed",
        };
        f.write_str(name)
    }
}

/// Key of the stateless humid-air routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HumidAirParam {
    /// Pressure [Pa]
    P,
    /// Dry-bulb temperature [K]
    T,
    /// Humidity ratio [kg water / kg dry air]
    W,
    /// Relative humidity [-]
    R,
    /// Enthalpy per kg humid air [J/kg]
    Hha,
    /// Enthalpy per kg dry air [J/kg]
    Hda,
    /// Entropy per kg humid air [J/(kg·K)]
    Sha,
    /// Entropy per kg dry air [J/(kg·K)]
    Sda,
    /// Specific volume per kg humid air [m³/kg]
    Vha,
    /// Specific volume per kg dry air [m³/kg]
    Vda,
    /// Isobaric specific heat per kg humid air [J/(kg·K)]
    Cha,
    /// Isobaric specific heat per kg dry air [J/(kg·K)]
    Cda,
    /// Isochoric specific heat per kg humid air [J/(kg·K)]
    CVha,
    /// Dew-point temperature [K]
    DewPoint,
    /// Wet-bulb temperature [K]
    WetBulb,
    /// Partial pressure of water vapor [Pa]
    PartialPressure,
    /// Dynamic viscosity [Pa·s]
    Viscosity,
    /// Thermal conductivity [W/(m·K)]
    Conductivity,
    /// Compressibility factor [-]
    Compressibility,
}

impl HumidAirParam {
    /// Canonical string key passed to the humid-air routine.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P => "P",
            Self::T => "T",
            Self::W => "W",
            Self::R => "R",
            Self::Hha => "Hha",
            Self::Hda => "Hda",
            Self::Sha => "Sha",
            Self::Sda => "Sda",
            Self::Vha => "Vha",
            Self::Vda => "Vda",
            Self::Cha => "Cha",
            Self::Cda => "C",
            Self::CVha => "CVha",
            Self::DewPoint => "D",
            Self::WetBulb => "B",
            Self::PartialPressure => "P_w",
            Self::Viscosity => "M",
            Self::Conductivity => "K",
            Self::Compressibility => "Z",
        }
    }
}

impl fmt::Display for HumidAirParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_pair_indices_follow_native_order() {
        assert_eq!(InputPair::QT.index(), 1);
        assert_eq!(InputPair::PT.index(), 9);
        assert_eq!(InputPair::HMassP.index(), 20);
        assert_eq!(InputPair::DMolarUMolar.index(), 35);
    }

    #[test]
    fn input_pair_names_round_trip() {
        for (pair, name) in INPUT_PAIRS {
            assert_eq!(InputPair::from_name(name), Some(pair));
            assert_eq!(pair.name(), name);
        }
        assert_eq!(InputPair::from_name("PHmass_INPUTS"), None);
    }

    #[test]
    fn phase_decodes_keyed_output() {
        assert_eq!(Phase::from_output(0.0), Phase::Liquid);
        assert_eq!(Phase::from_output(5.0), Phase::Gas);
        assert_eq!(Phase::from_output(6.0), Phase::TwoPhase);
        assert_eq!(Phase::from_output(42.0), Phase::Unknown);
        assert_eq!(Phase::from_output(f64::NAN), Phase::Unknown);
        assert_eq!(Phase::Gas.index(), 5);
    }

    #[test]
    fn humid_air_keys_are_distinct() {
        use std::collections::HashSet;
        let keys = [
            HumidAirParam::P,
            HumidAirParam::T,
            HumidAirParam::W,
            HumidAirParam::R,
            HumidAirParam::Hha,
            HumidAirParam::Hda,
            HumidAirParam::Sha,
            HumidAirParam::Sda,
            HumidAirParam::Vha,
            HumidAirParam::Vda,
            HumidAirParam::Cha,
            HumidAirParam::Cda,
            HumidAirParam::CVha,
            HumidAirParam::DewPoint,
            HumidAirParam::WetBulb,
            HumidAirParam::PartialPressure,
            HumidAirParam::Viscosity,
            HumidAirParam::Conductivity,
            HumidAirParam::Compressibility,
        ];
        let unique: HashSet<&str> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(unique.len(), keys.len());
    }
}
