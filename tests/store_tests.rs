//! Partitioned store behavior seen through the public surface: view
//! exclusivity, lifecycle, and load validation.

use groundflow::{
    MemoryStore, Partition, PredicateRegistry, StoreError, Value,
};
use std::sync::Arc;

fn store() -> (Arc<MemoryStore>, groundflow::PredicateId) {
    let mut registry = PredicateRegistry::new();
    let friend = registry.register_standard("Friend", 2);
    registry.register_derived("Similar", 2);
    let store = Arc::new(MemoryStore::new(Arc::new(registry)));
    (store, friend)
}

#[test]
fn test_write_partition_collisions_fail_deterministically() {
    let (store, _) = store();
    let _db1 = store
        .open_database(Partition::new(10), vec![Partition::new(11), Partition::new(12)], vec![])
        .unwrap();

    // every overlap of a write partition with an open view is refused
    for (write, reads) in [
        (Partition::new(10), vec![]),                      // write == open write
        (Partition::new(11), vec![]),                      // write == open read
        (Partition::new(20), vec![Partition::new(10)]),    // read == open write
    ] {
        let err = store.open_database(write, reads, vec![]).unwrap_err();
        assert!(matches!(err, StoreError::PartitionInUse(_)), "expected collision for write={write}");
    }

    // disjoint views and shared reads are allowed
    let _db2 = store
        .open_database(Partition::new(20), vec![Partition::new(11)], vec![])
        .unwrap();
    assert_eq!(store.open_view_count(), 2);
}

#[test]
fn test_dropping_a_view_releases_its_partitions() {
    let (store, _) = store();
    {
        let _db = store
            .open_database(Partition::new(1), vec![Partition::new(2)], vec![])
            .unwrap();
        assert_eq!(store.open_view_count(), 1);
        assert!(store
            .open_database(Partition::new(1), vec![], vec![])
            .is_err());
    }
    assert_eq!(store.open_view_count(), 0);
    assert!(store
        .open_database(Partition::new(1), vec![], vec![])
        .is_ok());
}

#[test]
fn test_load_rejects_unknown_and_derived_predicates() {
    let mut registry = PredicateRegistry::new();
    registry.register_standard("Friend", 2);
    let similar = registry.register_derived("Similar", 2);
    // an id from a larger, unrelated registry is unknown to this store
    let foreign = {
        let mut other = PredicateRegistry::new();
        other.register_standard("A", 1);
        other.register_standard("B", 1);
        other.register_standard("C", 1)
    };
    let store = Arc::new(MemoryStore::new(Arc::new(registry)));

    let err = store
        .load(Partition::new(1), foreign, vec![Value::Int(1)], 1.0)
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownPredicate(_)));

    let err = store
        .load(
            Partition::new(1),
            similar,
            vec![Value::Int(1), Value::Int(2)],
            1.0,
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::DerivedPredicate(name) if name == "Similar"));
}

#[test]
fn test_insert_lands_in_the_write_partition() {
    let (store, friend) = store();
    let db = store
        .open_database(Partition::new(2), vec![Partition::new(1)], vec![])
        .unwrap();

    db.insert(friend, vec![Value::Int(1), Value::Int(2)], 0.5).unwrap();
    assert_eq!(store.row_count(friend), 1);
    assert_eq!(db.write_partition(), Partition::new(2));
    assert_eq!(db.read_partitions(), [Partition::new(1)]);
}

#[test]
fn test_closed_predicate_flag_is_per_view() {
    let (store, friend) = store();
    let db = store
        .open_database(Partition::new(2), vec![Partition::new(1)], vec![friend])
        .unwrap();
    assert!(db.is_closed(friend));

    drop(db);
    let db = store
        .open_database(Partition::new(2), vec![Partition::new(1)], vec![])
        .unwrap();
    assert!(!db.is_closed(friend));
}

#[test]
fn test_confidence_column_is_accepted() {
    let (store, friend) = store();
    store
        .load_with_confidence(
            Partition::new(1),
            friend,
            vec![Value::Int(1), Value::Int(2)],
            0.9,
            Some(0.75),
        )
        .unwrap();
    assert_eq!(store.row_count(friend), 1);
}
