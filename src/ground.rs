//! Ground Rules and Their Store
//!
//! A [`GroundRule`] is a fully ground instantiation of a rule: an ordered
//! list of positive ground atoms, an ordered list of negative ground atoms,
//! an optional weight, and a grounding multiplicity. Identity is the
//! unordered multiset of signed atoms, so two groundings that differ only in
//! literal order are the same rule and merge by incrementing multiplicity.
//!
//! [`GroundRuleStore`] keeps rules in insertion order for deterministic
//! iteration and indexes them by their multiset key. Rules are never
//! removed; merge-or-insert is serialized by a single internal lock.

use crate::atoms::GroundAtom;
use crate::predicate::PredicateId;
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A fully ground rule instance.
#[derive(Debug)]
pub struct GroundRule {
    pos: Vec<Arc<GroundAtom>>,
    neg: Vec<Arc<GroundAtom>>,
    weight: Option<f64>,
    multiplicity: AtomicU32,
}

impl GroundRule {
    /// Create a ground rule with multiplicity 1.
    pub fn new(pos: Vec<Arc<GroundAtom>>, neg: Vec<Arc<GroundAtom>>, weight: Option<f64>) -> Self {
        GroundRule {
            pos,
            neg,
            weight,
            multiplicity: AtomicU32::new(1),
        }
    }

    /// Positive ground atoms, in clause literal order
    pub fn pos_atoms(&self) -> &[Arc<GroundAtom>] {
        &self.pos
    }

    /// Negative ground atoms, in clause literal order
    pub fn neg_atoms(&self) -> &[Arc<GroundAtom>] {
        &self.neg
    }

    /// Rule weight; `None` for hard constraints
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// How many distinct groundings merged into this rule
    pub fn multiplicity(&self) -> u32 {
        self.multiplicity.load(Ordering::Acquire)
    }

    /// Record one more grounding of this rule; returns the new count.
    pub fn increase_groundings(&self) -> u32 {
        self.multiplicity.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// The rule's multiset identity key.
    pub fn identity(&self) -> GroundRuleKey {
        GroundRuleKey::of(&self.pos, &self.neg)
    }
}

impl fmt::Display for GroundRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[x{}]", self.multiplicity())?;
        for atom in &self.pos {
            write!(f, " +{atom}")?;
        }
        for atom in &self.neg {
            write!(f, " -{atom}")?;
        }
        Ok(())
    }
}

/// Identity of a ground rule: the sorted multiset of its signed atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroundRuleKey {
    signed: Vec<(bool, PredicateId, Vec<Value>)>,
}

impl GroundRuleKey {
    /// Key for the given literal lists.
    pub fn of(pos: &[Arc<GroundAtom>], neg: &[Arc<GroundAtom>]) -> Self {
        let mut signed: Vec<(bool, PredicateId, Vec<Value>)> = pos
            .iter()
            .map(|a| (true, a.predicate(), a.args().to_vec()))
            .chain(neg.iter().map(|a| (false, a.predicate(), a.args().to_vec())))
            .collect();
        signed.sort();
        GroundRuleKey { signed }
    }
}

/// Outcome of a merge-or-insert.
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    /// The candidate was new and was inserted
    Inserted(Arc<GroundRule>),
    /// An equal rule existed; its multiplicity was incremented
    Merged(Arc<GroundRule>),
}

impl MergeOutcome {
    /// The stored rule, whether fresh or pre-existing
    pub fn rule(&self) -> &Arc<GroundRule> {
        match self {
            MergeOutcome::Inserted(rule) | MergeOutcome::Merged(rule) => rule,
        }
    }

    /// True if the candidate merged into an existing rule
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged(_))
    }
}

struct StoreInner {
    rules: Vec<Arc<GroundRule>>,
    index: HashMap<GroundRuleKey, usize>,
    revision: u64,
}

/// Set-like collection of ground rules with merge-on-duplicate semantics.
#[derive(Default)]
pub struct GroundRuleStore {
    inner: Mutex<StoreInner>,
}

impl Default for StoreInner {
    fn default() -> Self {
        StoreInner {
            rules: Vec::new(),
            index: HashMap::new(),
            revision: 0,
        }
    }
}

impl GroundRuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        GroundRuleStore::default()
    }

    /// Number of distinct ground rules
    pub fn len(&self) -> usize {
        self.inner.lock().rules.len()
    }

    /// True if no rules are stored
    pub fn is_empty(&self) -> bool {
        self.inner.lock().rules.is_empty()
    }

    /// Look up a rule by identity
    pub fn get(&self, key: &GroundRuleKey) -> Option<Arc<GroundRule>> {
        let inner = self.inner.lock();
        inner.index.get(key).map(|&i| Arc::clone(&inner.rules[i]))
    }

    /// Insert a rule known to be new; returns the stored handle.
    pub fn add(&self, rule: GroundRule) -> Arc<GroundRule> {
        let mut inner = self.inner.lock();
        let key = rule.identity();
        let stored = Arc::new(rule);
        let slot = inner.rules.len();
        inner.index.insert(key, slot);
        inner.rules.push(Arc::clone(&stored));
        inner.revision += 1;
        stored
    }

    /// Record that an existing rule changed (multiplicity bookkeeping).
    pub fn notify_changed(&self, rule: &Arc<GroundRule>) {
        let mut inner = self.inner.lock();
        inner.revision += 1;
        tracing::trace!(multiplicity = rule.multiplicity(), "ground rule updated");
    }

    /// Merge a candidate into an equal existing rule, or insert it.
    ///
    /// This is the single serialization point for a candidate identity.
    pub fn merge_or_insert(&self, candidate: GroundRule) -> MergeOutcome {
        let key = candidate.identity();
        let mut inner = self.inner.lock();
        if let Some(&i) = inner.index.get(&key) {
            let existing = Arc::clone(&inner.rules[i]);
            existing.increase_groundings();
            inner.revision += 1;
            drop(inner);
            tracing::trace!(multiplicity = existing.multiplicity(), "merged duplicate grounding");
            MergeOutcome::Merged(existing)
        } else {
            let stored = Arc::new(candidate);
            let slot = inner.rules.len();
            inner.index.insert(key, slot);
            inner.rules.push(Arc::clone(&stored));
            inner.revision += 1;
            MergeOutcome::Inserted(stored)
        }
    }

    /// Snapshot of all ground rules in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<GroundRule>> {
        self.inner.lock().rules.clone()
    }

    /// Monotone revision counter; bumped by every insert, merge, and
    /// change notification.
    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }
}
