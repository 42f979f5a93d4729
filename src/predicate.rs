//! Predicate Registry
//!
//! Predicates are named, arity-typed symbols owned by a registry. Atoms and
//! ground atoms reference predicates by stable id, never by pointer, so the
//! term model stays acyclic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable identifier for a registered predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PredicateId(pub(crate) u32);

impl PredicateId {
    /// The raw id value
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PredicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Whether a predicate is backed by a relation or computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateKind {
    /// Backed by a relation in the data store; may be queried
    Standard,
    /// Computed on demand; never queried directly
    Derived,
}

/// A named, arity-typed predicate symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    name: String,
    arity: usize,
    kind: PredicateKind,
}

impl Predicate {
    /// Predicate name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of argument positions
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Standard or derived
    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    /// True for predicates backed by a store relation
    pub fn is_standard(&self) -> bool {
        self.kind == PredicateKind::Standard
    }
}

/// Registry owning all predicate symbols.
///
/// Registration happens up front, before any store or kernel is built; the
/// registry is immutable afterwards and shared behind an `Arc`.
#[derive(Debug, Default, Clone)]
pub struct PredicateRegistry {
    predicates: Vec<Predicate>,
    by_name: HashMap<String, PredicateId>,
}

impl PredicateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        PredicateRegistry::default()
    }

    /// Register a predicate, returning its stable id.
    ///
    /// Re-registering an identical signature returns the existing id.
    /// Re-registering a name with a different arity or kind is a
    /// programming error.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        kind: PredicateKind,
    ) -> PredicateId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            let existing = &self.predicates[id.0 as usize];
            assert!(
                existing.arity == arity && existing.kind == kind,
                "predicate '{name}' re-registered with a different signature"
            );
            return id;
        }
        let id = PredicateId(self.predicates.len() as u32);
        self.predicates.push(Predicate {
            name: name.clone(),
            arity,
            kind,
        });
        self.by_name.insert(name, id);
        id
    }

    /// Register a standard (store-backed) predicate
    pub fn register_standard(&mut self, name: impl Into<String>, arity: usize) -> PredicateId {
        self.register(name, arity, PredicateKind::Standard)
    }

    /// Register a derived (computed) predicate
    pub fn register_derived(&mut self, name: impl Into<String>, arity: usize) -> PredicateId {
        self.register(name, arity, PredicateKind::Derived)
    }

    /// Look up a predicate by id
    pub fn get(&self, id: PredicateId) -> Option<&Predicate> {
        self.predicates.get(id.0 as usize)
    }

    /// Look up a predicate id by name
    pub fn lookup(&self, name: &str) -> Option<PredicateId> {
        self.by_name.get(name).copied()
    }

    /// Printable name for an id, tolerating unknown ids
    pub fn name_of(&self, id: PredicateId) -> &str {
        self.get(id).map_or("<unknown>", Predicate::name)
    }

    /// Number of registered predicates
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// True if no predicates are registered
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
