//! Builder Patterns for Formula Construction
//!
//! Fluent APIs for constructing atoms and formulas, particularly useful for
//! tests and embedders that assemble rules programmatically.
//!
//! ## Example
//!
//! ```rust
//! use groundflow::ast::builders::AtomBuilder;
//! use groundflow::ast::Formula;
//! use groundflow::predicate::PredicateRegistry;
//!
//! let mut registry = PredicateRegistry::new();
//! let friend = registry.register_standard("Friend", 2);
//! let likes = registry.register_standard("Likes", 2);
//!
//! // Friend(X, Y) ∧ Likes(X, Z) → Likes(Y, Z)
//! let rule = Formula::implies(
//!     Formula::and(vec![
//!         AtomBuilder::new(friend).var("X").var("Y").formula(),
//!         AtomBuilder::new(likes).var("X").var("Z").formula(),
//!     ]),
//!     AtomBuilder::new(likes).var("Y").var("Z").formula(),
//! );
//! ```

use super::{Atom, Formula, Term};
use crate::predicate::PredicateId;
use crate::value::Value;

/// Builder for constructing [`Atom`] instances.
#[derive(Debug, Clone)]
pub struct AtomBuilder {
    predicate: PredicateId,
    terms: Vec<Term>,
}

impl AtomBuilder {
    /// Start an atom over the given predicate
    pub fn new(predicate: PredicateId) -> Self {
        AtomBuilder {
            predicate,
            terms: Vec::new(),
        }
    }

    /// Append a variable argument
    pub fn var(mut self, name: impl Into<String>) -> Self {
        self.terms.push(Term::Variable(name.into()));
        self
    }

    /// Append a constant argument
    pub fn val(mut self, value: impl Into<Value>) -> Self {
        self.terms.push(Term::Constant(value.into()));
        self
    }

    /// Append an anonymous placeholder argument
    pub fn hole(mut self) -> Self {
        self.terms.push(Term::Placeholder);
        self
    }

    /// Finish the atom
    pub fn build(self) -> Atom {
        Atom::new(self.predicate, self.terms)
    }

    /// Finish the atom and wrap it as a formula leaf
    pub fn formula(self) -> Formula {
        Formula::atom(self.build())
    }

    /// Finish the atom and wrap it as a negated formula leaf
    pub fn negated(self) -> Formula {
        Formula::not(self.formula())
    }
}
