//! Grounding Error Types

use thiserror::Error;

/// Errors raised while validating a rule formula or grounding its clause.
#[derive(Error, Debug)]
pub enum RuleError {
    /// Formula does not reduce to a single clause
    #[error("formula does not normalize to a single clause (got {0})")]
    MultipleClauses(usize),

    /// A variable is never bound by a queriable literal
    #[error("variable '{0}' is not bound by any queried atom over a standard predicate")]
    UnboundVariable(String),

    /// Formula has no variables
    #[error("formula is ground; grounding requires at least one variable")]
    GroundFormula,

    /// Clause cannot be mapped to a conjunctive query
    #[error("clause cannot be translated into a conjunctive query: {0}")]
    NotQueriable(String),

    /// A term is neither a variable nor a ground term
    #[error("term at argument position {0} is neither a variable nor a ground term")]
    UnknownTermKind(usize),

    /// Rule kernels are identity-stable; duplication is refused
    #[error("rule kernels are identity-stable; duplication is refused")]
    CloneUnsupported,
}

/// Errors raised by the partitioned data store and the atom manager.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Write partition collides with another open database view
    #[error("partition {0} is already pinned by an open database view")]
    PartitionInUse(u32),

    /// Predicate id is not registered
    #[error("unknown predicate id {0}")]
    UnknownPredicate(u32),

    /// Derived predicates are computed, not stored
    #[error("derived predicate '{0}' is not backed by a relation")]
    DerivedPredicate(String),

    /// Argument count does not match the predicate arity
    #[error("arity mismatch for predicate '{name}': expected {expected}, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Opaque failure from an external store backend, propagated unchanged
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Any error surfaced by a grounding pass.
#[derive(Error, Debug)]
pub enum GroundingError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for rule construction and validation
pub type RuleResult<T> = Result<T, RuleError>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for grounding passes
pub type GroundingResult<T> = Result<T, GroundingError>;
