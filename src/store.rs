//! Partitioned Data Store
//!
//! An in-memory relational store: one row table per standard predicate,
//! every row tagged with an opaque partition id. Grounding reads go through
//! a [`Database`] view pinned to one write partition and a set of read
//! partitions; the store tracks all open views and rejects a write
//! partition that overlaps any other open view's partitions.
//!
//! Rows are scanned in insertion order, so query results are deterministic
//! for a deterministic load order. Query execution takes the row-table read
//! guard for the duration of one query and releases it on every exit path;
//! no lock is held across grounding logic.

use crate::ast::Term;
use crate::error::{StoreError, StoreResult};
use crate::predicate::{PredicateId, PredicateRegistry};
use crate::query::{ConjunctiveQuery, PartialAssignment, ResultList};
use crate::value::Value;
use anyhow::anyhow;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque identifier tagging rows in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Partition(u32);

impl Partition {
    /// Create a partition id
    pub const fn new(id: u32) -> Self {
        Partition(id)
    }

    /// The raw id value
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stored fact: argument tuple, partition tag, truth value, and an
/// optional confidence.
#[derive(Debug, Clone)]
struct Row {
    args: Vec<Value>,
    partition: Partition,
    #[allow(dead_code)]
    value: f64,
    #[allow(dead_code)]
    confidence: Option<f64>,
}

/// Partition scope of one open database view.
#[derive(Debug, Clone)]
struct ViewScope {
    write: Partition,
    reads: Vec<Partition>,
}

/// In-memory partitioned relational store.
#[derive(Debug)]
pub struct MemoryStore {
    registry: Arc<PredicateRegistry>,
    relations: RwLock<HashMap<PredicateId, Vec<Row>>>,
    open_views: Mutex<HashMap<u64, ViewScope>>,
    next_view: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store over the given predicate registry
    pub fn new(registry: Arc<PredicateRegistry>) -> Self {
        MemoryStore {
            registry,
            relations: RwLock::new(HashMap::new()),
            open_views: Mutex::new(HashMap::new()),
            next_view: AtomicU64::new(0),
        }
    }

    /// The predicate registry backing this store
    pub fn registry(&self) -> &Arc<PredicateRegistry> {
        &self.registry
    }

    /// Loader-side write path: append a fact row into a partition.
    pub fn load(
        &self,
        partition: Partition,
        predicate: PredicateId,
        args: Vec<Value>,
        value: f64,
    ) -> StoreResult<()> {
        self.load_with_confidence(partition, predicate, args, value, None)
    }

    /// Append a fact row carrying a confidence score.
    pub fn load_with_confidence(
        &self,
        partition: Partition,
        predicate: PredicateId,
        args: Vec<Value>,
        value: f64,
        confidence: Option<f64>,
    ) -> StoreResult<()> {
        let pred = self
            .registry
            .get(predicate)
            .ok_or(StoreError::UnknownPredicate(predicate.raw()))?;
        if !pred.is_standard() {
            return Err(StoreError::DerivedPredicate(pred.name().to_string()));
        }
        if pred.arity() != args.len() {
            return Err(StoreError::ArityMismatch {
                name: pred.name().to_string(),
                expected: pred.arity(),
                got: args.len(),
            });
        }

        self.relations.write().entry(predicate).or_default().push(Row {
            args,
            partition,
            value,
            confidence,
        });
        Ok(())
    }

    /// Number of rows stored for a predicate, across all partitions
    pub fn row_count(&self, predicate: PredicateId) -> usize {
        self.relations.read().get(&predicate).map_or(0, Vec::len)
    }

    /// Open a database view pinned to `write` with the given read set.
    ///
    /// Fails with [`StoreError::PartitionInUse`] if `write` appears in any
    /// other open view's partitions, or any other open view's write
    /// partition appears in this view's partitions.
    pub fn open_database(
        self: &Arc<Self>,
        write: Partition,
        reads: Vec<Partition>,
        closed_predicates: Vec<PredicateId>,
    ) -> StoreResult<Database> {
        let mut views = self.open_views.lock();
        for scope in views.values() {
            if scope.write == write || scope.reads.contains(&write) {
                return Err(StoreError::PartitionInUse(write.id()));
            }
            if scope.write == write || reads.contains(&scope.write) {
                return Err(StoreError::PartitionInUse(scope.write.id()));
            }
        }
        let id = self.next_view.fetch_add(1, Ordering::Relaxed);
        views.insert(
            id,
            ViewScope {
                write,
                reads: reads.clone(),
            },
        );
        drop(views);

        tracing::debug!(view = id, write = %write, reads = reads.len(), "opened database view");
        Ok(Database {
            store: Arc::clone(self),
            id,
            write,
            reads,
            closed: closed_predicates.into_iter().collect(),
        })
    }

    /// Number of currently open database views
    pub fn open_view_count(&self) -> usize {
        self.open_views.lock().len()
    }

    fn release_view(&self, id: u64) {
        self.open_views.lock().remove(&id);
    }
}

/// A store view pinned to one write partition and a set of read partitions.
///
/// Queries see rows in the write partition and every read partition.
/// Dropping the view releases its partition pins.
#[derive(Debug)]
pub struct Database {
    store: Arc<MemoryStore>,
    id: u64,
    write: Partition,
    reads: Vec<Partition>,
    closed: HashSet<PredicateId>,
}

impl Database {
    /// The pinned write partition
    pub fn write_partition(&self) -> Partition {
        self.write
    }

    /// The pinned read partitions
    pub fn read_partitions(&self) -> &[Partition] {
        &self.reads
    }

    /// True if the predicate was opened as closed (fully observed)
    pub fn is_closed(&self, predicate: PredicateId) -> bool {
        self.closed.contains(&predicate)
    }

    /// The predicate registry backing this view
    pub fn registry(&self) -> &Arc<PredicateRegistry> {
        self.store.registry()
    }

    /// Write a fact into this view's write partition.
    pub fn insert(&self, predicate: PredicateId, args: Vec<Value>, value: f64) -> StoreResult<()> {
        self.store.load(self.write, predicate, args, value)
    }

    /// Execute a conjunctive query, optionally restricted by a partial
    /// assignment applied as extra equality selections.
    ///
    /// Rows come back in store scan order: outer atoms in query order,
    /// relation rows in insertion order.
    pub fn execute_query(
        &self,
        query: &ConjunctiveQuery,
        partial: Option<&PartialAssignment>,
    ) -> StoreResult<ResultList> {
        let relations = self.store.relations.read();
        let mut visible: HashSet<Partition> = self.reads.iter().copied().collect();
        visible.insert(self.write);

        let mut results = ResultList::new(query.projection().to_vec());
        let seed = partial.cloned().unwrap_or_default();
        Self::scan(&relations, &visible, query, 0, seed, &mut results)?;
        Ok(results)
    }

    fn scan(
        relations: &HashMap<PredicateId, Vec<Row>>,
        visible: &HashSet<Partition>,
        query: &ConjunctiveQuery,
        depth: usize,
        binding: PartialAssignment,
        results: &mut ResultList,
    ) -> StoreResult<()> {
        if depth == query.atoms().len() {
            let mut row = Vec::with_capacity(query.projection().len());
            for var in query.projection() {
                let value = binding
                    .get(var)
                    .ok_or_else(|| StoreError::Backend(anyhow!("projection variable '{var}' left unbound")))?;
                row.push(value.clone());
            }
            results.push_row(row);
            return Ok(());
        }

        let atom = &query.atoms()[depth];
        let Some(rows) = relations.get(&atom.predicate) else {
            return Ok(());
        };

        'rows: for stored in rows {
            if !visible.contains(&stored.partition) {
                continue;
            }
            let mut extended = binding.clone();
            for (term, value) in atom.terms.iter().zip(&stored.args) {
                match term {
                    Term::Variable(name) => {
                        if !extended.bind(name, value.clone()) {
                            continue 'rows;
                        }
                    }
                    Term::Constant(constant) => {
                        if constant != value {
                            continue 'rows;
                        }
                    }
                    // wildcard column: matches anything, not projected
                    Term::Placeholder => {}
                }
            }
            Self::scan(relations, visible, query, depth + 1, extended, results)?;
        }
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.store.release_view(self.id);
        tracing::debug!(view = self.id, "released database view");
    }
}
