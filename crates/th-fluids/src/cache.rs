//! Per-state memoization of derived properties.

use crate::error::{FluidError, FluidResult};
use crate::input::KeyedInput;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cached {
    Value(f64),
    /// The oracle could not provide the property for this state.
    Unavailable,
}

/// Lazily filled property cache.
///
/// Reads go through `&self` so getters stay immutable; only `clear` needs
/// `&mut self`, which keeps a reset from racing a read.
#[derive(Debug)]
pub struct PropertyCache<K> {
    entries: RefCell<HashMap<K, Cached>>,
}

impl<K> Default for PropertyCache<K> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<K: Copy + Eq + Hash + fmt::Display> PropertyCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Property that must be defined for the state.
    ///
    /// A defining input with the same key is echoed back as is. Otherwise
    /// `compute` runs at most once; a non-finite result is memoized as
    /// unavailable and reported as an invalid state.
    pub fn value_of<I>(
        &self,
        inputs: &[I],
        key: K,
        compute: impl FnOnce() -> FluidResult<f64>,
    ) -> FluidResult<f64>
    where
        I: KeyedInput<Key = K>,
    {
        if let Some(input) = inputs.iter().find(|input| input.key() == key) {
            return Ok(input.value());
        }
        let invalid = || FluidError::InvalidState {
            key: key.to_string(),
        };
        if let Some(cached) = self.get(key) {
            return match cached {
                Cached::Value(value) => Ok(value),
                Cached::Unavailable => Err(invalid()),
            };
        }
        tracing::trace!(%key, "property cache miss");
        let value = compute()?;
        if value.is_finite() {
            self.insert(key, Cached::Value(value));
            Ok(value)
        } else {
            self.insert(key, Cached::Unavailable);
            Err(invalid())
        }
    }

    /// Property that may be undefined for the state.
    ///
    /// "Not available" results (see [`FluidError::is_unavailable`]) and
    /// non-finite values become `None` and are memoized. Any other error is
    /// returned and not memoized.
    pub fn nullable_value_of<I>(
        &self,
        inputs: &[I],
        key: K,
        compute: impl FnOnce() -> FluidResult<f64>,
    ) -> FluidResult<Option<f64>>
    where
        I: KeyedInput<Key = K>,
    {
        if let Some(input) = inputs.iter().find(|input| input.key() == key) {
            return Ok(Some(input.value()));
        }
        if let Some(cached) = self.get(key) {
            return Ok(match cached {
                Cached::Value(value) => Some(value),
                Cached::Unavailable => None,
            });
        }
        tracing::trace!(%key, "property cache miss");
        match compute() {
            Ok(value) if value.is_finite() => {
                self.insert(key, Cached::Value(value));
                Ok(Some(value))
            }
            Ok(_) => {
                self.insert(key, Cached::Unavailable);
                Ok(None)
            }
            Err(err) if err.is_unavailable() => {
                self.insert(key, Cached::Unavailable);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Drop every memoized property.
    pub fn clear(&mut self) {
        self.entries.get_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: K) -> Option<Cached> {
        self.entries.borrow().get(&key).copied()
    }

    fn insert(&self, key: K, cached: Cached) {
        self.entries.borrow_mut().insert(key, cached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::FluidInput;
    use crate::params::FluidParam;
    use std::cell::Cell;

    const NO_INPUTS: [FluidInput; 0] = [];

    #[test]
    fn computes_once() {
        let cache = PropertyCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(42.0)
        };
        assert_eq!(cache.value_of(&NO_INPUTS, FluidParam::HMass, compute).unwrap(), 42.0);
        assert_eq!(cache.value_of(&NO_INPUTS, FluidParam::HMass, compute).unwrap(), 42.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn defining_inputs_are_echoed() {
        let cache = PropertyCache::new();
        let inputs = [FluidInput::pressure(101_325.0), FluidInput::temperature(300.0)];
        let value = cache
            .value_of(&inputs, FluidParam::T, || panic!("must not query the oracle"))
            .unwrap();
        assert_eq!(value, 300.0);
        assert!(cache.is_empty());
    }

    #[test]
    fn non_finite_values_are_invalid_state() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let cache = PropertyCache::new();
            let err = cache
                .value_of(&NO_INPUTS, FluidParam::DMass, || Ok(value))
                .unwrap_err();
            assert!(matches!(err, FluidError::InvalidState { .. }));

            // memoized: a second read does not recompute
            let err = cache
                .value_of(&NO_INPUTS, FluidParam::DMass, || Ok(1.0))
                .unwrap_err();
            assert!(matches!(err, FluidError::InvalidState { .. }));
        }
    }

    #[test]
    fn nullable_memoizes_unavailable() {
        let cache = PropertyCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Err(FluidError::NotAvailable {
                key: "surface_tension".into(),
            })
        };
        assert_eq!(
            cache
                .nullable_value_of(&NO_INPUTS, FluidParam::SurfaceTension, compute)
                .unwrap(),
            None
        );
        assert_eq!(
            cache
                .nullable_value_of(&NO_INPUTS, FluidParam::SurfaceTension, compute)
                .unwrap(),
            None
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn nullable_propagates_other_errors() {
        let cache = PropertyCache::new();
        let err = cache
            .nullable_value_of(&NO_INPUTS, FluidParam::Prandtl, || {
                Err(FluidError::Definition { count: 2 })
            })
            .unwrap_err();
        assert_eq!(err, FluidError::Definition { count: 2 });
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = PropertyCache::new();
        cache
            .value_of(&NO_INPUTS, FluidParam::HMass, || Ok(1.0))
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(
            cache
                .value_of(&NO_INPUTS, FluidParam::HMass, || Ok(2.0))
                .unwrap(),
            2.0
        );
    }
}
