//! Clause Analysis
//!
//! [`DnfClause`] is the canonical form a rule is grounded from: the single
//! clause of the rule formula's negated DNF. Construction validates the
//! clause and precomputes everything grounding needs: the positive/negative
//! literal split, the projection over its variables, and the conjunctive
//! query template.
//!
//! Validation raises one of four distinct errors:
//! - [`RuleError::GroundFormula`]: the formula (or the clause) has no
//!   variables;
//! - [`RuleError::MultipleClauses`]: negation does not normalize to
//!   exactly one clause;
//! - [`RuleError::NotQueriable`]: the clause has no queried atoms, or a
//!   queried atom ranges over a derived predicate;
//! - [`RuleError::UnboundVariable`]: a variable never occurs in a queried
//!   atom over a standard predicate, so its domain is not enumerable.

use crate::ast::{Atom, Formula, Literal, Term};
use crate::error::{RuleError, RuleResult};
use crate::normalize;
use crate::predicate::{PredicateId, PredicateRegistry};
use crate::query::{ConjunctiveQuery, PartialAssignment};
use crate::value::Value;
use std::collections::HashSet;

/// The canonical clausal form of a rule: one conjunctive clause of `¬F`.
///
/// Its positive literals are the queried atoms; in the original rule's own
/// clausal rendering those appear negated, which is why every variable must
/// be bound there for its domain to be finite.
#[derive(Debug, Clone)]
pub struct DnfClause {
    literals: Vec<Literal>,
    pos: Vec<Atom>,
    neg: Vec<Atom>,
    variables: Vec<String>,
}

impl DnfClause {
    /// Validate a rule formula and reduce it to its grounding clause.
    pub fn from_formula(formula: &Formula, registry: &PredicateRegistry) -> RuleResult<Self> {
        if formula.variables().is_empty() {
            return Err(RuleError::GroundFormula);
        }

        let mut clauses = normalize::negation_dnf(formula);
        if clauses.len() != 1 {
            return Err(RuleError::MultipleClauses(clauses.len()));
        }
        let literals = match clauses.pop() {
            Some(clause) => clause,
            None => return Err(RuleError::MultipleClauses(0)),
        };

        let mut pos = Vec::new();
        let mut neg = Vec::new();
        for literal in &literals {
            if literal.positive {
                pos.push(literal.atom.clone());
            } else {
                neg.push(literal.atom.clone());
            }
        }

        if pos.is_empty() {
            return Err(RuleError::NotQueriable(
                "clause has no queried atoms".to_string(),
            ));
        }
        for atom in &pos {
            let standard = registry.get(atom.predicate).map_or(false, |p| p.is_standard());
            if !standard {
                return Err(RuleError::NotQueriable(format!(
                    "predicate '{}' cannot be queried",
                    registry.name_of(atom.predicate)
                )));
            }
        }

        // Stable first-occurrence order over the clause's literals.
        let mut variables: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for literal in &literals {
            for name in literal.atom.variables_in_order() {
                if seen.insert(name) {
                    variables.push(name.to_string());
                }
            }
        }

        if variables.is_empty() {
            return Err(RuleError::GroundFormula);
        }

        // Binding invariant: each variable's domain must be enumerable via
        // a queried atom.
        let bound: HashSet<&str> = pos
            .iter()
            .flat_map(Atom::variables_in_order)
            .collect();
        for name in &variables {
            if !bound.contains(name.as_str()) {
                return Err(RuleError::UnboundVariable(name.clone()));
            }
        }

        tracing::debug!(
            literals = literals.len(),
            queried = pos.len(),
            variables = variables.len(),
            "validated grounding clause"
        );
        Ok(DnfClause {
            literals,
            pos,
            neg,
            variables,
        })
    }

    /// All literals in clause order
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// The queried (positive) atoms, in clause order
    pub fn pos_literals(&self) -> &[Atom] {
        &self.pos
    }

    /// The negated atoms, in clause order
    pub fn neg_literals(&self) -> &[Atom] {
        &self.neg
    }

    /// Clause variables in stable first-occurrence order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Predicates of the queried atoms
    pub fn queried_predicates(&self) -> HashSet<PredicateId> {
        self.pos.iter().map(|a| a.predicate).collect()
    }

    /// Build the conjunctive query that enumerates candidate assignments.
    pub fn query(&self) -> ConjunctiveQuery {
        ConjunctiveQuery::new(self.pos.clone(), self.variables.clone())
    }

    /// Every unification of a ground atom against the clause's queried
    /// literals, as partial variable assignments.
    ///
    /// Only queried literals are considered: row visibility is gated on the
    /// activation of queried atoms, so a newly activated atom can only
    /// enable rows in which it fills a queried position.
    pub fn trace_assignments(&self, predicate: PredicateId, args: &[Value]) -> Vec<PartialAssignment> {
        let mut assignments = Vec::new();
        'literals: for template in &self.pos {
            if template.predicate != predicate || template.arity() != args.len() {
                continue;
            }
            let mut assignment = PartialAssignment::new();
            for (term, value) in template.terms.iter().zip(args) {
                match term {
                    Term::Variable(name) => {
                        if !assignment.bind(name, value.clone()) {
                            continue 'literals;
                        }
                    }
                    Term::Constant(constant) => {
                        if constant != value {
                            continue 'literals;
                        }
                    }
                    Term::Placeholder => continue 'literals,
                }
            }
            assignments.push(assignment);
        }
        assignments
    }
}
