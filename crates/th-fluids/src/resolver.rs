//! Input combination resolution.
//!
//! A fluid or mixture state is pinned by an ordered pair the oracle accepts,
//! e.g. `HmassP_INPUTS`. Callers may pass the two inputs in either order; the
//! pair is tried as given first and swapped second.

use crate::error::{FluidError, FluidResult};
use crate::input::{FluidInput, KeyedInput};
use crate::oracle::PropertyOracle;
use crate::params::InputPair;
use std::collections::HashSet;

/// Input pair plus the values in the oracle's slot order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPair {
    pub pair: InputPair,
    pub first: f64,
    pub second: f64,
    /// Whether the inputs had to be swapped to match the pair.
    pub swapped: bool,
}

/// Oracle name of the ordered combination of two inputs.
pub fn combination_name(first: &FluidInput, second: &FluidInput) -> String {
    format!(
        "{}{}_INPUTS",
        first.key().high_level_key(),
        second.key().high_level_key()
    )
}

/// Resolve two fluid inputs into an oracle input pair.
pub fn resolve_pair(
    oracle: &dyn PropertyOracle,
    first: FluidInput,
    second: FluidInput,
) -> FluidResult<ResolvedPair> {
    if first.key() == second.key() {
        return Err(FluidError::Definition { count: 2 });
    }
    if let Some(pair) = oracle.resolve_combination(&combination_name(&first, &second)) {
        return Ok(ResolvedPair {
            pair,
            first: first.value(),
            second: second.value(),
            swapped: false,
        });
    }
    let swapped_name = combination_name(&second, &first);
    if let Some(pair) = oracle.resolve_combination(&swapped_name) {
        tracing::debug!(pair = %swapped_name, "inputs resolved in swapped order");
        return Ok(ResolvedPair {
            pair,
            first: second.value(),
            second: first.value(),
            swapped: true,
        });
    }
    Err(FluidError::Definition { count: 2 })
}

/// Check that `inputs` holds exactly `count` inputs with pairwise-distinct keys.
pub fn ensure_unique<I: KeyedInput>(inputs: &[I], count: usize) -> FluidResult<()> {
    let keys: HashSet<I::Key> = inputs.iter().map(KeyedInput::key).collect();
    if inputs.len() == count && keys.len() == count {
        Ok(())
    } else {
        Err(FluidError::Definition { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::HumidAirInput;
    use crate::oracle::IdealOracle;

    #[test]
    fn names_follow_high_level_keys() {
        let name = combination_name(&FluidInput::enthalpy(1.0), &FluidInput::pressure(1.0));
        assert_eq!(name, "HmassP_INPUTS");
    }

    #[test]
    fn pair_as_given_is_preferred() {
        let oracle = IdealOracle::new();
        let resolved = resolve_pair(
            &oracle,
            FluidInput::pressure(101_325.0),
            FluidInput::temperature(300.0),
        )
        .unwrap();
        assert_eq!(resolved.pair, InputPair::PT);
        assert!(!resolved.swapped);
        assert_eq!((resolved.first, resolved.second), (101_325.0, 300.0));
    }

    #[test]
    fn swapped_pair_maps_values_to_slots() {
        let oracle = IdealOracle::new();
        let resolved = resolve_pair(
            &oracle,
            FluidInput::temperature(300.0),
            FluidInput::pressure(101_325.0),
        )
        .unwrap();
        assert_eq!(resolved.pair, InputPair::PT);
        assert!(resolved.swapped);
        assert_eq!((resolved.first, resolved.second), (101_325.0, 300.0));
    }

    #[test]
    fn duplicate_keys_are_a_definition_error() {
        let oracle = IdealOracle::new();
        let err = resolve_pair(
            &oracle,
            FluidInput::pressure(1e5),
            FluidInput::pressure(2e5),
        )
        .unwrap_err();
        assert_eq!(err, FluidError::Definition { count: 2 });
    }

    #[test]
    fn unknown_combination_is_a_definition_error() {
        let oracle = IdealOracle::new();
        let err = resolve_pair(
            &oracle,
            FluidInput::enthalpy(1e5),
            FluidInput::entropy(1e3),
        )
        .unwrap_err();
        assert_eq!(err, FluidError::Definition { count: 2 });
    }

    #[test]
    fn humid_air_needs_three_distinct_keys() {
        let ok = [
            HumidAirInput::pressure(101_325.0),
            HumidAirInput::temperature(293.15),
            HumidAirInput::relative_humidity(0.5),
        ];
        assert!(ensure_unique(&ok, 3).is_ok());

        let duplicate = [
            HumidAirInput::pressure(101_325.0),
            HumidAirInput::temperature(293.15),
            HumidAirInput::temperature(300.0),
        ];
        assert_eq!(
            ensure_unique(&duplicate, 3),
            Err(FluidError::Definition { count: 3 })
        );
        assert!(ensure_unique(&ok[..2], 3).is_err());
    }
}
