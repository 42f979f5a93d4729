//! # Logical Formula Model
//!
//! Terms, atoms, literals, and the formula tree that rules are written in.
//! A rule is authored as a [`Formula`]; kernel construction negates it and
//! reduces it to a single clause (see [`crate::clause`]).
//!
//! ## Builders
//!
//! For programmatic construction of atoms and formulas, see the [`builders`]
//! module which provides fluent APIs like `AtomBuilder`.

use crate::predicate::PredicateId;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod builders;

/// A variable or constant in an atom argument position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Named variable, compared by name within a formula scope
    Variable(String),
    /// Ground constant
    Constant(Value),
    /// Anonymous position in a hand-built formula; grounding one is an
    /// internal invariant violation
    Placeholder,
}

impl Term {
    /// Check if this term is a variable
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Check if this term is a ground constant
    pub fn is_ground(&self) -> bool {
        matches!(self, Term::Constant(_))
    }

    /// Get the variable name if this is a variable
    pub fn as_variable(&self) -> Option<&str> {
        if let Term::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }

    /// Get the constant value if this term is ground
    pub fn as_constant(&self) -> Option<&Value> {
        if let Term::Constant(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

/// A predicate applied to an arity-sized tuple of terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    pub predicate: PredicateId,
    pub terms: Vec<Term>,
}

impl Atom {
    /// Create a new atom
    pub fn new(predicate: PredicateId, terms: Vec<Term>) -> Self {
        Atom { predicate, terms }
    }

    /// Number of argument positions
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// True if every term is a ground constant
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_ground)
    }

    /// All variable names appearing in this atom
    pub fn variables(&self) -> HashSet<String> {
        self.terms
            .iter()
            .filter_map(|t| t.as_variable().map(str::to_string))
            .collect()
    }

    /// Variable names in argument order, with repeats
    pub fn variables_in_order(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().filter_map(|t| t.as_variable())
    }
}

/// An atom or its negation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub positive: bool,
    pub atom: Atom,
}

impl Literal {
    /// A positive literal
    pub fn positive(atom: Atom) -> Self {
        Literal { positive: true, atom }
    }

    /// A negated literal
    pub fn negative(atom: Atom) -> Self {
        Literal { positive: false, atom }
    }

    /// The literal with its polarity flipped
    pub fn negated(&self) -> Self {
        Literal {
            positive: !self.positive,
            atom: self.atom.clone(),
        }
    }

    /// All variable names appearing in this literal
    pub fn variables(&self) -> HashSet<String> {
        self.atom.variables()
    }
}

/// A formula tree over {and, or, not, implies, equivalent} with atom leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Formula {
    Atom(Atom),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Equivalent(Box<Formula>, Box<Formula>),
}

impl Formula {
    /// Leaf formula from an atom
    pub fn atom(atom: Atom) -> Self {
        Formula::Atom(atom)
    }

    /// Negation
    pub fn not(inner: Formula) -> Self {
        Formula::Not(Box::new(inner))
    }

    /// Conjunction of subformulas
    pub fn and(parts: Vec<Formula>) -> Self {
        Formula::And(parts)
    }

    /// Disjunction of subformulas
    pub fn or(parts: Vec<Formula>) -> Self {
        Formula::Or(parts)
    }

    /// Implication
    pub fn implies(antecedent: Formula, consequent: Formula) -> Self {
        Formula::Implies(Box::new(antecedent), Box::new(consequent))
    }

    /// Biconditional
    pub fn equivalent(left: Formula, right: Formula) -> Self {
        Formula::Equivalent(Box::new(left), Box::new(right))
    }

    /// All variable names appearing anywhere in the formula
    pub fn variables(&self) -> HashSet<String> {
        let mut vars = HashSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut HashSet<String>) {
        match self {
            Formula::Atom(atom) => vars.extend(atom.variables()),
            Formula::Not(inner) => inner.collect_variables(vars),
            Formula::And(parts) | Formula::Or(parts) => {
                for part in parts {
                    part.collect_variables(vars);
                }
            }
            Formula::Implies(left, right) | Formula::Equivalent(left, right) => {
                left.collect_variables(vars);
                right.collect_variables(vars);
            }
        }
    }

    /// All atoms appearing in the formula, in tree order
    pub fn atoms(&self) -> Vec<&Atom> {
        let mut atoms = Vec::new();
        self.collect_atoms(&mut atoms);
        atoms
    }

    fn collect_atoms<'a>(&'a self, atoms: &mut Vec<&'a Atom>) {
        match self {
            Formula::Atom(atom) => atoms.push(atom),
            Formula::Not(inner) => inner.collect_atoms(atoms),
            Formula::And(parts) | Formula::Or(parts) => {
                for part in parts {
                    part.collect_atoms(atoms);
                }
            }
            Formula::Implies(left, right) | Formula::Equivalent(left, right) => {
                left.collect_atoms(atoms);
                right.collect_atoms(atoms);
            }
        }
    }
}
