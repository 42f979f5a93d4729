//! Grounding performance benchmarks: full passes over growing stores and
//! activation bursts on a lazy manager.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use groundflow::ast::builders::AtomBuilder;
use groundflow::{
    ActivationHandler, AtomManager, EventSet, Formula, GroundRuleStore, MemoryStore, Partition,
    PredicateId, PredicateRegistry, RuleKernel, Value, WeightedInstantiator,
};
use std::sync::Arc;

const OBSERVATIONS: Partition = Partition::new(1);
const TARGETS: Partition = Partition::new(2);

struct Fixture {
    store: Arc<MemoryStore>,
    registry: Arc<PredicateRegistry>,
    spam: PredicateId,
    important: PredicateId,
}

fn constraint_fixture(size: u32) -> Fixture {
    let mut registry = PredicateRegistry::new();
    let spam = registry.register_standard("Spam", 1);
    let important = registry.register_standard("Important", 1);
    let registry = Arc::new(registry);
    let store = Arc::new(MemoryStore::new(Arc::clone(&registry)));

    for i in 0..size {
        let message = Value::string(format!("m{i}"));
        store
            .load(OBSERVATIONS, spam, vec![message.clone()], 1.0)
            .unwrap();
        store.load(OBSERVATIONS, important, vec![message], 0.0).unwrap();
    }

    Fixture {
        store,
        registry,
        spam,
        important,
    }
}

fn constraint_rule(f: &Fixture) -> Formula {
    Formula::or(vec![
        AtomBuilder::new(f.spam).var("X").negated(),
        AtomBuilder::new(f.important).var("X").negated(),
    ])
}

fn bench_full_grounding(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_grounding");
    for size in [100u32, 1_000, 10_000] {
        let f = constraint_fixture(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let db = f
                    .store
                    .open_database(TARGETS, vec![OBSERVATIONS], vec![])
                    .unwrap();
                let manager = AtomManager::new(db);
                let rules = GroundRuleStore::new();
                let kernel = RuleKernel::new(
                    constraint_rule(&f),
                    Box::new(WeightedInstantiator::new(1.0)),
                    &f.registry,
                )
                .unwrap();
                kernel.ground_all(&manager, &rules).unwrap();
                rules.len()
            });
        });
    }
    group.finish();
}

fn bench_activation_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("activation_burst");
    for size in [100u32, 1_000] {
        let f = constraint_fixture(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let db = f
                    .store
                    .open_database(TARGETS, vec![OBSERVATIONS], vec![])
                    .unwrap();
                let manager = AtomManager::with_default_activation(db, false);
                let rules = GroundRuleStore::new();
                let kernel = Arc::new(
                    RuleKernel::new(
                        constraint_rule(&f),
                        Box::new(WeightedInstantiator::new(1.0)),
                        &f.registry,
                    )
                    .unwrap(),
                );
                manager.register(
                    Arc::clone(&kernel) as Arc<dyn ActivationHandler>,
                    EventSet::ATOM_ACTIVATED,
                );

                for i in 0..size {
                    let message = vec![Value::string(format!("m{i}"))];
                    let spam = manager.get_atom(f.spam, message.clone()).unwrap();
                    let important = manager.get_atom(f.important, message).unwrap();
                    manager.activate(&spam);
                    manager.activate(&important);
                }
                manager.dispatch_events(&rules).unwrap();
                rules.len()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_full_grounding, bench_activation_burst);
criterion_main!(benches);
