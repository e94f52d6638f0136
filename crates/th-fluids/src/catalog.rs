//! Fluid registry: name → backend metadata.

use crate::error::{FluidError, FluidResult};
use std::fmt;
use std::str::FromStr;

/// Fluids known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FluidName {
    Air,
    Ammonia,
    CarbonDioxide,
    Nitrogen,
    Propane,
    R134a,
    R32,
    Water,
    /// Aqueous solution of propylene glycol
    MPG,
    /// Aqueous solution of ethylene glycol
    MEG,
}

/// Backend metadata of a fluid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidInfo {
    pub name: FluidName,
    /// Name understood by the property oracle.
    pub coolprop_name: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    /// Oracle backend id (`HEOS` or `INCOMP`).
    pub backend: &'static str,
    /// Pure fluids take no fraction and may be mixture components.
    pub pure: bool,
    /// Solution fraction bounds (decimal) for fluids that need one.
    pub fraction_min: f64,
    pub fraction_max: f64,
}

impl FluidInfo {
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return true;
        }

        self.coolprop_name.to_ascii_lowercase().contains(&query)
            || self.display_name.to_ascii_lowercase().contains(&query)
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_ascii_lowercase().contains(&query))
    }

    fn matches_exactly(&self, name: &str) -> bool {
        self.coolprop_name.eq_ignore_ascii_case(name)
            || self.display_name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

const PURE: (f64, f64) = (0.0, 1.0);

const FLUIDS: [FluidInfo; 10] = [
    FluidInfo {
        name: FluidName::Air,
        coolprop_name: "Air",
        display_name: "Air",
        aliases: &["atmosphere", "R729"],
        backend: "HEOS",
        pure: true,
        fraction_min: PURE.0,
        fraction_max: PURE.1,
    },
    FluidInfo {
        name: FluidName::Ammonia,
        coolprop_name: "Ammonia",
        display_name: "Ammonia",
        aliases: &["NH3", "R717"],
        backend: "HEOS",
        pure: true,
        fraction_min: PURE.0,
        fraction_max: PURE.1,
    },
    FluidInfo {
        name: FluidName::CarbonDioxide,
        coolprop_name: "CarbonDioxide",
        display_name: "Carbon Dioxide",
        aliases: &["CO2", "R744"],
        backend: "HEOS",
        pure: true,
        fraction_min: PURE.0,
        fraction_max: PURE.1,
    },
    FluidInfo {
        name: FluidName::Nitrogen,
        coolprop_name: "Nitrogen",
        display_name: "Nitrogen",
        aliases: &["N2", "R728"],
        backend: "HEOS",
        pure: true,
        fraction_min: PURE.0,
        fraction_max: PURE.1,
    },
    FluidInfo {
        name: FluidName::Propane,
        coolprop_name: "n-Propane",
        display_name: "Propane",
        aliases: &["C3H8", "R290"],
        backend: "HEOS",
        pure: true,
        fraction_min: PURE.0,
        fraction_max: PURE.1,
    },
    FluidInfo {
        name: FluidName::R134a,
        coolprop_name: "R134a",
        display_name: "R134a",
        aliases: &[],
        backend: "HEOS",
        pure: true,
        fraction_min: PURE.0,
        fraction_max: PURE.1,
    },
    FluidInfo {
        name: FluidName::R32,
        coolprop_name: "R32",
        display_name: "R32",
        aliases: &[],
        backend: "HEOS",
        pure: true,
        fraction_min: PURE.0,
        fraction_max: PURE.1,
    },
    FluidInfo {
        name: FluidName::Water,
        coolprop_name: "Water",
        display_name: "Water",
        aliases: &["H2O", "R718"],
        backend: "HEOS",
        pure: true,
        fraction_min: PURE.0,
        fraction_max: PURE.1,
    },
    FluidInfo {
        name: FluidName::MPG,
        coolprop_name: "MPG",
        display_name: "Propylene glycol (aq)",
        aliases: &["propylene glycol"],
        backend: "INCOMP",
        pure: false,
        fraction_min: 0.0,
        fraction_max: 0.6,
    },
    FluidInfo {
        name: FluidName::MEG,
        coolprop_name: "MEG",
        display_name: "Ethylene glycol (aq)",
        aliases: &["ethylene glycol"],
        backend: "INCOMP",
        pure: false,
        fraction_min: 0.0,
        fraction_max: 0.6,
    },
];

pub fn fluid_catalog() -> &'static [FluidInfo] {
    &FLUIDS
}

pub fn filter_fluid_catalog(query: &str) -> Vec<FluidInfo> {
    fluid_catalog()
        .iter()
        .copied()
        .filter(|info| info.matches_query(query))
        .collect()
}

impl FluidName {
    pub fn info(self) -> &'static FluidInfo {
        // FLUIDS is declared in enum order
        &FLUIDS[self as usize]
    }

    pub fn coolprop_name(self) -> &'static str {
        self.info().coolprop_name
    }

    pub fn is_pure(self) -> bool {
        self.info().pure
    }

    /// Check a solution fraction against the fluid's needs.
    ///
    /// Pure fluids take no fraction; solutions need one within their bounds.
    pub fn check_fraction(self, fraction: Option<f64>) -> FluidResult<()> {
        let info = self.info();
        match (info.pure, fraction) {
            (true, None) => Ok(()),
            (true, Some(_)) => Err(FluidError::InvalidArg {
                what: format!("{self} is a pure fluid and takes no fraction"),
            }),
            (false, None) => Err(FluidError::InvalidArg {
                what: format!("{self} requires a solution fraction"),
            }),
            (false, Some(x)) if (info.fraction_min..=info.fraction_max).contains(&x) => Ok(()),
            (false, Some(x)) => Err(FluidError::InvalidArg {
                what: format!(
                    "invalid fraction {x} for {self}: expected [{}, {}]",
                    info.fraction_min, info.fraction_max
                ),
            }),
        }
    }
}

impl fmt::Display for FluidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().display_name)
    }
}

impl FromStr for FluidName {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        fluid_catalog()
            .iter()
            .find(|info| info.matches_exactly(name))
            .map(|info| info.name)
            .ok_or_else(|| FluidError::InvalidArg {
                what: format!("unknown fluid '{name}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_is_in_enum_order() {
        for (i, info) in fluid_catalog().iter().enumerate() {
            assert_eq!(info.name as usize, i, "{} out of order", info.coolprop_name);
        }
    }

    #[test]
    fn coolprop_names_are_unique() {
        let mut seen = HashSet::new();
        for info in fluid_catalog() {
            assert!(
                seen.insert(info.coolprop_name),
                "duplicate name: {}",
                info.coolprop_name
            );
        }
    }

    #[test]
    fn lookup_is_case_insensitive_and_accepts_aliases() {
        assert_eq!("water".parse::<FluidName>().unwrap(), FluidName::Water);
        assert_eq!("R744".parse::<FluidName>().unwrap(), FluidName::CarbonDioxide);
        assert_eq!(" n-propane ".parse::<FluidName>().unwrap(), FluidName::Propane);
        assert!("unobtainium".parse::<FluidName>().is_err());
    }

    #[test]
    fn fraction_rules() {
        assert!(FluidName::Water.check_fraction(None).is_ok());
        assert!(FluidName::Water.check_fraction(Some(0.5)).is_err());
        assert!(FluidName::MPG.check_fraction(None).is_err());
        assert!(FluidName::MPG.check_fraction(Some(0.4)).is_ok());
        assert!(FluidName::MPG.check_fraction(Some(0.7)).is_err());
    }

    #[test]
    fn search_finds_glycols() {
        let results = filter_fluid_catalog("glycol");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|info| info.backend == "INCOMP"));
    }
}
