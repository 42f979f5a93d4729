//! Event-driven incremental grounding: activation replay, delivery
//! filtering, and registration lifecycle.

use groundflow::ast::builders::AtomBuilder;
use groundflow::{
    ActivationHandler, AtomManager, EventSet, Formula, GroundRuleKey, GroundRuleStore,
    MemoryStore, Partition, PredicateId, PredicateRegistry, RuleKernel, Value,
    WeightedInstantiator,
};
use std::collections::HashMap;
use std::sync::Arc;

const OBSERVATIONS: Partition = Partition::new(1);
const TARGETS: Partition = Partition::new(2);

struct Fixture {
    store: Arc<MemoryStore>,
    registry: Arc<PredicateRegistry>,
    friend: PredicateId,
    likes: PredicateId,
    spam: PredicateId,
}

fn fixture() -> Fixture {
    let mut registry = PredicateRegistry::new();
    let friend = registry.register_standard("Friend", 2);
    let likes = registry.register_standard("Likes", 2);
    let spam = registry.register_standard("Spam", 1);
    let registry = Arc::new(registry);
    let store = Arc::new(MemoryStore::new(Arc::clone(&registry)));

    let people = |a: &str, b: &str| vec![Value::string(a), Value::string(b)];
    store.load(OBSERVATIONS, friend, people("alice", "bob"), 1.0).unwrap();
    store.load(OBSERVATIONS, friend, people("bob", "carol"), 1.0).unwrap();
    store.load(OBSERVATIONS, likes, people("alice", "tea"), 1.0).unwrap();
    store.load(OBSERVATIONS, likes, people("bob", "coffee"), 1.0).unwrap();
    store.load(TARGETS, likes, people("bob", "tea"), 0.0).unwrap();
    store.load(TARGETS, likes, people("carol", "coffee"), 0.0).unwrap();

    Fixture {
        store,
        registry,
        friend,
        likes,
        spam,
    }
}

fn transitivity_rule(f: &Fixture) -> Formula {
    Formula::implies(
        Formula::and(vec![
            AtomBuilder::new(f.friend).var("X").var("Y").formula(),
            AtomBuilder::new(f.likes).var("X").var("Z").formula(),
        ]),
        AtomBuilder::new(f.likes).var("Y").var("Z").formula(),
    )
}

/// Every fact row of the fixture as (predicate, args).
fn store_atoms(f: &Fixture) -> Vec<(PredicateId, Vec<Value>)> {
    let people = |a: &str, b: &str| vec![Value::string(a), Value::string(b)];
    vec![
        (f.friend, people("alice", "bob")),
        (f.friend, people("bob", "carol")),
        (f.likes, people("alice", "tea")),
        (f.likes, people("bob", "coffee")),
        (f.likes, people("bob", "tea")),
        (f.likes, people("carol", "coffee")),
    ]
}

fn multiplicities(store: &GroundRuleStore) -> HashMap<GroundRuleKey, u32> {
    store
        .snapshot()
        .iter()
        .map(|r| (r.identity(), r.multiplicity()))
        .collect()
}

/// Replaying every activation from an empty active set converges to the
/// same ground-rule set as one eager full pass.
fn assert_replay_matches_full(activation_order: &[usize]) {
    // eager reference run
    let f = fixture();
    let db = f
        .store
        .open_database(TARGETS, vec![OBSERVATIONS], vec![])
        .unwrap();
    let manager = AtomManager::new(db);
    let reference = GroundRuleStore::new();
    let kernel = RuleKernel::new(
        transitivity_rule(&f),
        Box::new(WeightedInstantiator::new(1.0)),
        &f.registry,
    )
    .unwrap();
    kernel.ground_all(&manager, &reference).unwrap();
    assert_eq!(reference.len(), 3);

    // lazy replay run
    let f = fixture();
    let db = f
        .store
        .open_database(TARGETS, vec![OBSERVATIONS], vec![])
        .unwrap();
    let manager = AtomManager::with_default_activation(db, false);
    let replayed = GroundRuleStore::new();
    let kernel = Arc::new(
        RuleKernel::new(
            transitivity_rule(&f),
            Box::new(WeightedInstantiator::new(1.0)),
            &f.registry,
        )
        .unwrap(),
    );

    // nothing is active, so the full pass sees nothing
    kernel.ground_all(&manager, &replayed).unwrap();
    assert!(replayed.is_empty());

    manager.register(Arc::clone(&kernel) as Arc<dyn ActivationHandler>, EventSet::ATOM_ACTIVATED);

    let atoms = store_atoms(&f);
    for &i in activation_order {
        let (predicate, args) = &atoms[i];
        let atom = manager.get_atom(*predicate, args.clone()).unwrap();
        manager.activate(&atom);
        manager.dispatch_events(&replayed).unwrap();
    }

    assert_eq!(multiplicities(&reference), multiplicities(&replayed));
}

#[test]
fn test_activation_replay_in_load_order() {
    assert_replay_matches_full(&[0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_activation_replay_in_reverse_order() {
    assert_replay_matches_full(&[5, 4, 3, 2, 1, 0]);
}

#[test]
fn test_activation_replay_interleaved() {
    assert_replay_matches_full(&[2, 0, 5, 1, 4, 3]);
}

#[test]
fn test_batched_dispatch_after_all_activations() {
    let f = fixture();
    let db = f
        .store
        .open_database(TARGETS, vec![OBSERVATIONS], vec![])
        .unwrap();
    let manager = AtomManager::with_default_activation(db, false);
    let rules = GroundRuleStore::new();
    let kernel = Arc::new(
        RuleKernel::new(
            transitivity_rule(&f),
            Box::new(WeightedInstantiator::new(1.0)),
            &f.registry,
        )
        .unwrap(),
    );
    manager.register(Arc::clone(&kernel) as Arc<dyn ActivationHandler>, EventSet::ATOM_ACTIVATED);

    for (predicate, args) in store_atoms(&f) {
        let atom = manager.get_atom(predicate, args).unwrap();
        manager.activate(&atom);
    }
    assert_eq!(manager.pending_events(), 6);

    manager.dispatch_events(&rules).unwrap();
    assert_eq!(manager.pending_events(), 0);
    assert_eq!(rules.len(), 3);
}

#[test]
fn test_unrelated_predicates_are_not_delivered() {
    let f = fixture();
    f.store
        .load(OBSERVATIONS, f.spam, vec![Value::string("m1")], 1.0)
        .unwrap();
    let db = f
        .store
        .open_database(TARGETS, vec![OBSERVATIONS], vec![])
        .unwrap();
    let manager = AtomManager::new(db);
    let rules = GroundRuleStore::new();
    let kernel = Arc::new(
        RuleKernel::new(
            transitivity_rule(&f),
            Box::new(WeightedInstantiator::new(1.0)),
            &f.registry,
        )
        .unwrap(),
    );
    manager.register(Arc::clone(&kernel) as Arc<dyn ActivationHandler>, EventSet::ATOM_ACTIVATED);

    // a Spam activation never reaches the Friend/Likes kernel
    let atom = manager.get_atom(f.spam, vec![Value::string("m1")]).unwrap();
    manager.deactivate(&atom);
    manager.activate(&atom);
    let trace = manager.dispatch_events(&rules).unwrap();
    assert_eq!(trace.total_groundings(), 0);
    assert!(rules.is_empty());
}

#[test]
fn test_unregistered_handler_stops_receiving() {
    let f = fixture();
    let db = f
        .store
        .open_database(TARGETS, vec![OBSERVATIONS], vec![])
        .unwrap();
    let manager = AtomManager::with_default_activation(db, false);
    let rules = GroundRuleStore::new();
    let kernel = Arc::new(
        RuleKernel::new(
            transitivity_rule(&f),
            Box::new(WeightedInstantiator::new(1.0)),
            &f.registry,
        )
        .unwrap(),
    );

    let id = manager.register(Arc::clone(&kernel) as Arc<dyn ActivationHandler>, EventSet::ATOM_ACTIVATED);
    assert_eq!(manager.registration_count(), 1);
    assert!(manager.unregister(id));
    assert!(!manager.unregister(id));
    assert_eq!(manager.registration_count(), 0);

    for (predicate, args) in store_atoms(&f) {
        let atom = manager.get_atom(predicate, args).unwrap();
        manager.activate(&atom);
    }
    manager.dispatch_events(&rules).unwrap();
    assert!(rules.is_empty());
}

#[test]
fn test_closed_predicates_bypass_the_activation_gate() {
    let f = fixture();
    let db = f
        .store
        .open_database(TARGETS, vec![OBSERVATIONS], vec![f.friend])
        .unwrap();
    // lazy manager: only Friend is exempt from the gate
    let manager = AtomManager::with_default_activation(db, false);
    let rules = GroundRuleStore::new();
    let kernel = Arc::new(
        RuleKernel::new(
            transitivity_rule(&f),
            Box::new(WeightedInstantiator::new(1.0)),
            &f.registry,
        )
        .unwrap(),
    );

    kernel.ground_all(&manager, &rules).unwrap();
    assert!(rules.is_empty());

    manager.register(Arc::clone(&kernel) as Arc<dyn ActivationHandler>, EventSet::ATOM_ACTIVATED);

    // activating the Likes atoms alone completes the rows; the Friend
    // atoms never need activation
    for (predicate, args) in store_atoms(&f) {
        if predicate == f.likes {
            let atom = manager.get_atom(predicate, args).unwrap();
            manager.activate(&atom);
        }
    }
    manager.dispatch_events(&rules).unwrap();
    assert_eq!(rules.len(), 3);
}
