//! Disjunctive Normal Form Reduction
//!
//! Reduces a formula (or its negation) to a set of conjunctive clauses, the
//! disjunction of which is equivalent to the input. Implication and
//! biconditional connectives are expanded on the fly; negations are pushed
//! down to the literals; tautological clauses are pruned; duplicate literals
//! and duplicate clauses are removed.
//!
//! A clause here is one DNF disjunct: a conjunction of literals.

use crate::ast::{Formula, Literal};

/// One conjunctive clause of a DNF: all its literals hold simultaneously.
pub type Clause = Vec<Literal>;

/// DNF of the *negation* of the given formula.
///
/// This is the reduction kernel construction relies on: a rule formula `F`
/// is groundable when `¬F` reduces to exactly one clause.
pub fn negation_dnf(formula: &Formula) -> Vec<Clause> {
    dnf(formula, true)
}

/// DNF of the given formula.
pub fn formula_dnf(formula: &Formula) -> Vec<Clause> {
    dnf(formula, false)
}

fn dnf(formula: &Formula, negate: bool) -> Vec<Clause> {
    let clauses = match formula {
        Formula::Atom(atom) => {
            vec![vec![Literal {
                positive: !negate,
                atom: atom.clone(),
            }]]
        }
        Formula::Not(inner) => dnf(inner, !negate),
        Formula::And(parts) => {
            if negate {
                // ¬(a ∧ b) = ¬a ∨ ¬b
                concat_all(parts.iter().map(|p| dnf(p, true)))
            } else {
                distribute_all(parts.iter().map(|p| dnf(p, false)))
            }
        }
        Formula::Or(parts) => {
            if negate {
                // ¬(a ∨ b) = ¬a ∧ ¬b
                distribute_all(parts.iter().map(|p| dnf(p, true)))
            } else {
                concat_all(parts.iter().map(|p| dnf(p, false)))
            }
        }
        Formula::Implies(left, right) => {
            if negate {
                // ¬(a → b) = a ∧ ¬b
                distribute(dnf(left, false), dnf(right, true))
            } else {
                // a → b = ¬a ∨ b
                concat(dnf(left, true), dnf(right, false))
            }
        }
        Formula::Equivalent(left, right) => {
            if negate {
                // ¬(a ↔ b) = (a ∧ ¬b) ∨ (b ∧ ¬a)
                concat(
                    distribute(dnf(left, false), dnf(right, true)),
                    distribute(dnf(right, false), dnf(left, true)),
                )
            } else {
                // a ↔ b = (¬a ∨ b) ∧ (¬b ∨ a)
                distribute(
                    concat(dnf(left, true), dnf(right, false)),
                    concat(dnf(right, true), dnf(left, false)),
                )
            }
        }
    };
    dedup_clauses(clauses)
}

/// Union of two clause sets: the OR of two DNFs.
fn concat(mut left: Vec<Clause>, mut right: Vec<Clause>) -> Vec<Clause> {
    left.append(&mut right);
    left
}

fn concat_all(sets: impl Iterator<Item = Vec<Clause>>) -> Vec<Clause> {
    let mut out = Vec::new();
    for set in sets {
        out = concat(out, set);
    }
    out
}

/// Cartesian product of two clause sets: the AND of two DNFs.
///
/// Clauses that become tautological (contain a literal and its negation)
/// are dropped.
fn distribute(left: Vec<Clause>, right: Vec<Clause>) -> Vec<Clause> {
    let mut out = Vec::new();
    for l in &left {
        for r in &right {
            if let Some(merged) = merge_clause(l, r) {
                out.push(merged);
            }
        }
    }
    out
}

fn distribute_all(sets: impl Iterator<Item = Vec<Clause>>) -> Vec<Clause> {
    let mut out = vec![Vec::new()];
    for set in sets {
        out = distribute(out, set);
    }
    out
}

/// Conjoin two clauses, deduplicating literals; `None` if contradictory.
fn merge_clause(left: &Clause, right: &Clause) -> Option<Clause> {
    let mut merged = left.clone();
    for lit in right {
        if merged.iter().any(|m| m.atom == lit.atom && m.positive != lit.positive) {
            return None;
        }
        if !merged.contains(lit) {
            merged.push(lit.clone());
        }
    }
    Some(merged)
}

/// Remove repeated clauses, keeping first occurrences in order.
fn dedup_clauses(clauses: Vec<Clause>) -> Vec<Clause> {
    let mut out: Vec<Clause> = Vec::with_capacity(clauses.len());
    for clause in clauses {
        if !out.iter().any(|c| clause_eq(c, &clause)) {
            out.push(clause);
        }
    }
    out
}

/// Clause equality as literal sets (order-insensitive).
fn clause_eq(a: &Clause, b: &Clause) -> bool {
    a.len() == b.len() && a.iter().all(|lit| b.contains(lit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Atom, Term};
    use crate::predicate::{PredicateId, PredicateRegistry};

    fn var_atom(p: PredicateId, vars: &[&str]) -> Atom {
        Atom::new(p, vars.iter().map(|v| Term::Variable((*v).to_string())).collect())
    }

    fn setup() -> (PredicateId, PredicateId, PredicateId) {
        let mut registry = PredicateRegistry::new();
        let friend = registry.register_standard("Friend", 2);
        let likes = registry.register_standard("Likes", 2);
        let spam = registry.register_standard("Spam", 1);
        (friend, likes, spam)
    }

    #[test]
    fn test_negated_implication_is_one_clause() {
        let (friend, likes, _) = setup();
        // Friend(X,Y) ∧ Likes(X,Z) → Likes(Y,Z)
        let f = Formula::implies(
            Formula::and(vec![
                Formula::atom(var_atom(friend, &["X", "Y"])),
                Formula::atom(var_atom(likes, &["X", "Z"])),
            ]),
            Formula::atom(var_atom(likes, &["Y", "Z"])),
        );

        let clauses = negation_dnf(&f);
        assert_eq!(clauses.len(), 1);

        let clause = &clauses[0];
        assert_eq!(clause.len(), 3);
        // body atoms positive, head atom negative
        assert!(clause[0].positive && clause[0].atom == var_atom(friend, &["X", "Y"]));
        assert!(clause[1].positive && clause[1].atom == var_atom(likes, &["X", "Z"]));
        assert!(!clause[2].positive && clause[2].atom == var_atom(likes, &["Y", "Z"]));
    }

    #[test]
    fn test_negated_disjunction_is_conjunction() {
        let (_, _, spam) = setup();
        // ¬Spam(X) ∨ ¬Spam(Y) negated: Spam(X) ∧ Spam(Y)
        let f = Formula::or(vec![
            Formula::not(Formula::atom(var_atom(spam, &["X"]))),
            Formula::not(Formula::atom(var_atom(spam, &["Y"]))),
        ]);

        let clauses = negation_dnf(&f);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].len(), 2);
        assert!(clauses[0].iter().all(|l| l.positive));
    }

    #[test]
    fn test_negated_conjunction_splits_into_clauses() {
        let (friend, likes, _) = setup();
        let f = Formula::and(vec![
            Formula::atom(var_atom(friend, &["X", "Y"])),
            Formula::atom(var_atom(likes, &["X", "Z"])),
        ]);

        // ¬(a ∧ b) = ¬a ∨ ¬b: two clauses
        let clauses = negation_dnf(&f);
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn test_tautology_prunes_to_empty() {
        let (_, _, spam) = setup();
        // Spam(X) ∨ ¬Spam(X) negated: Spam(X) ∧ ¬Spam(X), contradictory
        let f = Formula::or(vec![
            Formula::atom(var_atom(spam, &["X"])),
            Formula::not(Formula::atom(var_atom(spam, &["X"]))),
        ]);

        assert!(negation_dnf(&f).is_empty());
    }

    #[test]
    fn test_double_negation_cancels() {
        let (_, _, spam) = setup();
        let f = Formula::not(Formula::not(Formula::atom(var_atom(spam, &["X"]))));

        let clauses = formula_dnf(&f);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].len(), 1);
        assert!(clauses[0][0].positive);
    }

    #[test]
    fn test_equivalence_expansion() {
        let (friend, likes, _) = setup();
        let f = Formula::equivalent(
            Formula::atom(var_atom(friend, &["X", "Y"])),
            Formula::atom(var_atom(likes, &["X", "Y"])),
        );

        // ¬(a ↔ b) = (a ∧ ¬b) ∨ (b ∧ ¬a)
        let clauses = negation_dnf(&f);
        assert_eq!(clauses.len(), 2);
        for clause in &clauses {
            assert_eq!(clause.len(), 2);
            assert_eq!(clause.iter().filter(|l| l.positive).count(), 1);
        }
    }

    #[test]
    fn test_duplicate_literals_collapse() {
        let (_, _, spam) = setup();
        let f = Formula::or(vec![
            Formula::not(Formula::atom(var_atom(spam, &["X"]))),
            Formula::not(Formula::atom(var_atom(spam, &["X"]))),
        ]);

        let clauses = negation_dnf(&f);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].len(), 1);
    }
}
