use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use th_fluids::{
    AbstractFluid, Fluid, FluidError, FluidInput, FluidName, FluidProcesses, IdealOracle, Phase,
    PropertyOracle,
};

const P_ATM: f64 = 101_325.0;

fn oracle() -> Arc<dyn PropertyOracle> {
    Arc::new(IdealOracle::new())
}

fn water(oracle: &Arc<dyn PropertyOracle>) -> Fluid {
    Fluid::with_oracle(FluidName::Water, None, oracle.clone()).unwrap()
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn input_order_does_not_matter() {
    let oracle = oracle();
    let mut a = water(&oracle);
    let mut b = water(&oracle);
    a.update(FluidInput::pressure(P_ATM), FluidInput::temperature(423.15))
        .unwrap();
    b.update(FluidInput::temperature(423.15), FluidInput::pressure(P_ATM))
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(
        a.enthalpy().unwrap().to_bits(),
        b.enthalpy().unwrap().to_bits()
    );
    assert_eq!(a.density().unwrap().to_bits(), b.density().unwrap().to_bits());
}

#[test]
fn repeated_reads_are_identical() {
    let oracle = oracle();
    let mut fluid = water(&oracle);
    fluid
        .update(FluidInput::pressure(P_ATM), FluidInput::temperature(423.15))
        .unwrap();
    let first = fluid.entropy().unwrap();
    for _ in 0..5 {
        assert_eq!(fluid.entropy().unwrap().to_bits(), first.to_bits());
    }
}

#[test]
fn defining_inputs_are_echoed() {
    let oracle = oracle();
    let mut fluid = water(&oracle);
    fluid
        .update(FluidInput::pressure(123_456.789), FluidInput::enthalpy(2.8e6))
        .unwrap();
    assert_eq!(fluid.pressure().unwrap(), 123_456.789);
    assert_eq!(fluid.enthalpy().unwrap(), 2.8e6);
}

#[test]
fn reset_clears_the_state() {
    let oracle = oracle();
    let mut fluid = water(&oracle);
    fluid
        .update(FluidInput::pressure(P_ATM), FluidInput::temperature(423.15))
        .unwrap();
    fluid.enthalpy().unwrap();
    fluid.reset();
    assert_eq!(fluid.enthalpy(), Err(FluidError::Definition { count: 2 }));
    assert_eq!(fluid.quality(), Err(FluidError::Definition { count: 2 }));
    assert_eq!(fluid.phase().unwrap(), Phase::Unknown);
}

#[test]
fn equality_ignores_cached_properties() {
    let oracle = oracle();
    let mut a = water(&oracle);
    let mut b = water(&oracle);
    let p = FluidInput::pressure(P_ATM);
    let t = FluidInput::temperature(300.0);
    a.update(p, t).unwrap();
    b.update(p, t).unwrap();
    a.enthalpy().unwrap();
    a.conductivity().unwrap();
    a.surface_tension().unwrap();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    b.update(p, FluidInput::temperature(301.0)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn equality_includes_fluid_identity() {
    let oracle = oracle();
    let mut a = water(&oracle);
    let mut b = Fluid::with_oracle(FluidName::Nitrogen, None, oracle).unwrap();
    let p = FluidInput::pressure(P_ATM);
    let t = FluidInput::temperature(400.0);
    a.update(p, t).unwrap();
    b.update(p, t).unwrap();
    assert_ne!(a, b);
}

#[test]
fn definition_errors() {
    let oracle = oracle();
    let mut fluid = water(&oracle);
    assert_eq!(
        fluid.update(FluidInput::pressure(1e5), FluidInput::pressure(2e5)),
        Err(FluidError::Definition { count: 2 })
    );
    assert_eq!(
        fluid.update(FluidInput::enthalpy(1e5), FluidInput::entropy(1e3)),
        Err(FluidError::Definition { count: 2 })
    );
}

#[test]
fn rejected_state_leaves_fluid_empty() {
    let oracle = oracle();
    let mut fluid = water(&oracle);
    fluid
        .update(FluidInput::pressure(P_ATM), FluidInput::temperature(300.0))
        .unwrap();
    let err = fluid
        .update(FluidInput::pressure(P_ATM), FluidInput::temperature(5_000.0))
        .unwrap_err();
    assert!(matches!(err, FluidError::Backend { .. }));
    assert!(fluid.inputs().is_empty());
    assert_eq!(fluid.temperature(), Err(FluidError::Definition { count: 2 }));
}

#[test]
fn nullable_properties() {
    let oracle = oracle();
    let mut fluid = water(&oracle);
    fluid
        .update(FluidInput::pressure(P_ATM), FluidInput::temperature(423.15))
        .unwrap();
    assert_eq!(fluid.quality().unwrap(), None);
    assert_eq!(fluid.surface_tension().unwrap(), None);
    assert_eq!(fluid.freezing_temperature().unwrap(), None);
    assert!(fluid.sound_speed().unwrap().is_some());
    assert!(fluid.prandtl().unwrap().is_some());
    assert!(fluid.critical_temperature().unwrap().is_some());
    assert!(fluid.triple_pressure().unwrap().is_some());

    let wet = fluid.two_phase_point_at(P_ATM, 0.5).unwrap();
    assert_eq!(wet.quality().unwrap(), Some(0.5));
    assert!(wet.surface_tension().unwrap().is_some());
    assert_eq!(wet.specific_heat().ok(), None);
    assert_eq!(wet.conductivity().unwrap(), None);
    assert_eq!(wet.phase().unwrap(), Phase::TwoPhase);
}

#[test]
fn clone_and_factory() {
    let oracle = oracle();
    let mut fluid = water(&oracle);
    let empty_clone = fluid.try_clone().unwrap();
    assert!(empty_clone.inputs().is_empty());

    fluid
        .update(FluidInput::pressure(P_ATM), FluidInput::temperature(423.15))
        .unwrap();
    fluid.enthalpy().unwrap();
    let copy = fluid.try_clone().unwrap();
    assert_eq!(copy, fluid);
    assert_eq!(copy.enthalpy().unwrap(), fluid.enthalpy().unwrap());

    let factory = fluid.factory().unwrap();
    assert!(factory.inputs().is_empty());
    assert_eq!(factory.phase().unwrap(), Phase::Unknown);
}

#[test]
fn phase_override_propagates_to_derived_states() {
    let oracle = oracle();
    let mut fluid = water(&oracle);
    fluid.specify_phase(Phase::Gas).unwrap();
    fluid
        .update(FluidInput::pressure(P_ATM), FluidInput::temperature(423.15))
        .unwrap();

    let derived = fluid.isentropic_compression_to(2.0 * P_ATM).unwrap();
    assert_eq!(derived.core().phase_override(), Some(Phase::Gas));
    let copy = derived.try_clone().unwrap();
    assert_eq!(copy.core().phase_override(), Some(Phase::Gas));

    fluid.unspecify_phase().unwrap();
    let released = fluid.isentropic_compression_to(2.0 * P_ATM).unwrap();
    assert_eq!(released.core().phase_override(), None);
}

#[test]
fn dispose_is_idempotent_and_safe_on_empty_states() {
    let oracle = oracle();
    let mut never_updated = water(&oracle);
    never_updated.dispose();
    never_updated.dispose();

    let mut fluid = water(&oracle);
    fluid
        .update(FluidInput::pressure(P_ATM), FluidInput::temperature(300.0))
        .unwrap();
    fluid.dispose();
    assert!(fluid.core().is_disposed());
    assert!(fluid.temperature().is_err());
    fluid.dispose();
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn order_independence(t in 280.0_f64..900.0, p in 1e4_f64..1e6) {
            let oracle = oracle();
            let mut a = water(&oracle);
            let mut b = water(&oracle);
            a.update(FluidInput::pressure(p), FluidInput::temperature(t)).unwrap();
            b.update(FluidInput::temperature(t), FluidInput::pressure(p)).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(hash_of(&a), hash_of(&b));
            prop_assert_eq!(a.enthalpy().unwrap().to_bits(), b.enthalpy().unwrap().to_bits());
            prop_assert_eq!(a.phase().unwrap(), b.phase().unwrap());
        }
    }
}
