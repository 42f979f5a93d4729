//! # Groundflow
//!
//! The rule grounding core of a probabilistic-logic reasoning engine. A
//! model is a set of first-order rules over predicates; groundflow
//! instantiates each rule against a partitioned relational store of known
//! and candidate atoms, producing the set of ground rules downstream
//! inference consumes, and keeps that set current as atoms activate.
//!
//! ## Pipeline
//!
//! ```text
//! Rule Formula
//!     ↓
//! [Normalizer]        → single clause of ¬F (DNF)
//!     ↓
//! [Clause Analyzer]   → pos/neg split, binding check, projection
//!     ↓
//! [Query Builder]     → conjunctive query template
//!     ↓
//! [Rule Kernel]       → ground_all / on_atom_activated
//!     ↓                   (rows via AtomManager → partitioned store)
//! [Ground-Rule Store] → merge-on-duplicate set of ground rules
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use groundflow::ast::builders::AtomBuilder;
//! use groundflow::ast::Formula;
//! use groundflow::atoms::AtomManager;
//! use groundflow::ground::GroundRuleStore;
//! use groundflow::kernel::{RuleKernel, WeightedInstantiator};
//! use groundflow::predicate::PredicateRegistry;
//! use groundflow::store::{MemoryStore, Partition};
//! use groundflow::value::Value;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = PredicateRegistry::new();
//! let friend = registry.register_standard("Friend", 2);
//! let likes = registry.register_standard("Likes", 2);
//! let registry = Arc::new(registry);
//!
//! let store = Arc::new(MemoryStore::new(Arc::clone(&registry)));
//! let observations = Partition::new(1);
//! store.load(observations, friend,
//!     vec![Value::string("alice"), Value::string("bob")], 1.0)?;
//! store.load(observations, likes,
//!     vec![Value::string("alice"), Value::string("tea")], 1.0)?;
//!
//! // Friend(X, Y) ∧ Likes(X, Z) → Likes(Y, Z)
//! let rule = Formula::implies(
//!     Formula::and(vec![
//!         AtomBuilder::new(friend).var("X").var("Y").formula(),
//!         AtomBuilder::new(likes).var("X").var("Z").formula(),
//!     ]),
//!     AtomBuilder::new(likes).var("Y").var("Z").formula(),
//! );
//!
//! let db = store.open_database(Partition::new(2), vec![observations], vec![])?;
//! let manager = AtomManager::new(db);
//! let ground_rules = GroundRuleStore::new();
//!
//! let kernel = RuleKernel::new(rule, Box::new(WeightedInstantiator::new(1.0)), &registry)?;
//! let trace = kernel.ground_all(&manager, &ground_rules)?;
//! assert_eq!(trace.rules_created, ground_rules.len());
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod atoms;
pub mod clause;
pub mod config;
pub mod error;
pub mod events;
pub mod ground;
pub mod kernel;
pub mod normalize;
pub mod predicate;
pub mod query;
pub mod store;
pub mod telemetry;
pub mod trace;
pub mod value;

// Re-export the core surface
pub use ast::{Atom, Formula, Literal, Term};
pub use atoms::{AtomManager, GroundAtom};
pub use clause::DnfClause;
pub use config::{Config, GroundingConfig, LoggingConfig};
pub use error::{
    GroundingError, GroundingResult, RuleError, RuleResult, StoreError, StoreResult,
};
pub use events::{ActivationHandler, EventSet, GroundingEvent, RegistrationId};
pub use ground::{GroundRule, GroundRuleKey, GroundRuleStore, MergeOutcome};
pub use kernel::{
    ground_all_kernels, ConstraintInstantiator, GroundInstantiator, KernelId, RuleKernel,
    WeightedInstantiator,
};
pub use predicate::{Predicate, PredicateId, PredicateKind, PredicateRegistry};
pub use query::{ConjunctiveQuery, PartialAssignment, ResultList};
pub use store::{Database, MemoryStore, Partition};
pub use trace::GroundingTrace;
pub use value::Value;
