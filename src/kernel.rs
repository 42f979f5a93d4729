//! Rule Kernel
//!
//! A [`RuleKernel`] owns a validated clause and drives grounding: the full
//! pass walks every query row; the incremental pass reacts to one atom
//! activation by regrounding only the rule instances that atom newly
//! enables.
//!
//! How the two literal lists become a concrete [`GroundRule`] is a
//! capability supplied at construction: the [`GroundInstantiator`]. The
//! kernel hands it immutable snapshots of its scratch buffers; an
//! instantiator must clone the `Arc`s it intends to retain.

use crate::ast::Formula;
use crate::atoms::{ground_atom_args, AtomManager, GroundAtom};
use crate::clause::DnfClause;
use crate::config::GroundingConfig;
use crate::error::{GroundingResult, RuleError, RuleResult};
use crate::events::ActivationHandler;
use crate::ground::{GroundRule, GroundRuleStore, MergeOutcome};
use crate::predicate::{PredicateId, PredicateRegistry};
use crate::query::{ConjunctiveQuery, PartialAssignment, ResultList};
use crate::trace::GroundingTrace;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_KERNEL_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a rule kernel within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelId(u64);

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kernel{}", self.0)
    }
}

/// Capability that turns two ground literal lists into a [`GroundRule`].
///
/// `pos` and `neg` are transient buffers owned by the grounder, in clause
/// literal order; implementations copy the references they keep.
pub trait GroundInstantiator: Send + Sync {
    fn ground_instance(&self, pos: &[Arc<GroundAtom>], neg: &[Arc<GroundAtom>]) -> GroundRule;
}

/// Instantiator for weighted (soft) rules.
#[derive(Debug, Clone, Copy)]
pub struct WeightedInstantiator {
    weight: f64,
}

impl WeightedInstantiator {
    /// A soft-rule instantiator with the given weight
    pub fn new(weight: f64) -> Self {
        WeightedInstantiator { weight }
    }

    /// The rule weight
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl GroundInstantiator for WeightedInstantiator {
    fn ground_instance(&self, pos: &[Arc<GroundAtom>], neg: &[Arc<GroundAtom>]) -> GroundRule {
        GroundRule::new(pos.to_vec(), neg.to_vec(), Some(self.weight))
    }
}

/// Instantiator for hard constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintInstantiator;

impl GroundInstantiator for ConstraintInstantiator {
    fn ground_instance(&self, pos: &[Arc<GroundAtom>], neg: &[Arc<GroundAtom>]) -> GroundRule {
        GroundRule::new(pos.to_vec(), neg.to_vec(), None)
    }
}

/// A validated, groundable rule.
///
/// Kernels are identity-stable: they are created once from a formula and
/// never duplicated. The clause and its query template are immutable for
/// the kernel's lifetime.
pub struct RuleKernel {
    id: KernelId,
    formula: Formula,
    clause: DnfClause,
    query: ConjunctiveQuery,
    instantiator: Box<dyn GroundInstantiator>,
}

impl RuleKernel {
    /// Validate `formula` and build its kernel.
    ///
    /// Fails with one of the validation errors if the formula does not
    /// reduce to a single queriable clause (see [`DnfClause`]).
    pub fn new(
        formula: Formula,
        instantiator: Box<dyn GroundInstantiator>,
        registry: &PredicateRegistry,
    ) -> RuleResult<Self> {
        let clause = DnfClause::from_formula(&formula, registry)?;
        let query = clause.query();
        let id = KernelId(NEXT_KERNEL_ID.fetch_add(1, Ordering::Relaxed));
        tracing::info!(kernel = %id, queried = query.atoms().len(), "rule kernel constructed");
        Ok(RuleKernel {
            id,
            formula,
            clause,
            query,
            instantiator,
        })
    }

    /// This kernel's process-wide identity
    pub fn id(&self) -> KernelId {
        self.id
    }

    /// The formula the kernel was built from
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// The validated grounding clause
    pub fn clause(&self) -> &DnfClause {
        &self.clause
    }

    /// The reusable query template
    pub fn query(&self) -> &ConjunctiveQuery {
        &self.query
    }

    /// Kernels are identity-stable; duplication is refused.
    pub fn try_clone(&self) -> RuleResult<Self> {
        Err(RuleError::CloneUnsupported)
    }

    /// Enumerate every ground rule the clause induces against the
    /// manager's current view and merge them into `store`.
    ///
    /// Rules are emitted in store row order. Re-running is idempotent up
    /// to multiplicity.
    pub fn ground_all(
        &self,
        manager: &AtomManager,
        store: &GroundRuleStore,
    ) -> GroundingResult<GroundingTrace> {
        let results = manager.execute_query(&self.query, None)?;
        let mut trace = GroundingTrace::new();
        self.expand_rows(&results, None, manager, store, &mut trace)?;
        tracing::info!(
            kernel = %self.id,
            rows = trace.rows_expanded,
            created = trace.rules_created,
            merged = trace.rules_merged,
            "full grounding pass complete"
        );
        Ok(trace)
    }

    /// Expand each result row into a ground rule.
    ///
    /// Substitution consults `prior` before the row so that a partially
    /// grounded pass carries the activating atom's constants into every
    /// produced rule. The pos/neg scratch buffers are reused across rows
    /// and passed to the instantiator as immutable snapshots.
    fn expand_rows(
        &self,
        results: &ResultList,
        prior: Option<&PartialAssignment>,
        manager: &AtomManager,
        store: &GroundRuleStore,
        trace: &mut GroundingTrace,
    ) -> GroundingResult<()> {
        let mut pos_buf: Vec<Arc<GroundAtom>> = Vec::with_capacity(self.clause.pos_literals().len());
        let mut neg_buf: Vec<Arc<GroundAtom>> = Vec::with_capacity(self.clause.neg_literals().len());

        for i in 0..results.len() {
            pos_buf.clear();
            neg_buf.clear();

            let resolve = |name: &str| {
                prior
                    .and_then(|p| p.get(name).cloned())
                    .or_else(|| results.get(i, name).cloned())
            };

            for template in self.clause.pos_literals() {
                let args = ground_atom_args(template, &resolve)?;
                pos_buf.push(manager.get_atom(template.predicate, args)?);
            }
            for template in self.clause.neg_literals() {
                let args = ground_atom_args(template, &resolve)?;
                neg_buf.push(manager.get_atom(template.predicate, args)?);
            }

            let candidate = self.instantiator.ground_instance(&pos_buf, &neg_buf);
            match store.merge_or_insert(candidate) {
                MergeOutcome::Inserted(_) => trace.rules_created += 1,
                MergeOutcome::Merged(_) => trace.rules_merged += 1,
            }
            trace.rows_expanded += 1;
        }
        Ok(())
    }
}

impl ActivationHandler for RuleKernel {
    /// Produce exactly the ground rules newly enabled by `atom`'s
    /// activation: one restricted query per unification of the atom
    /// against the clause's queried literals.
    fn on_atom_activated(
        &self,
        atom: &Arc<GroundAtom>,
        manager: &AtomManager,
        store: &GroundRuleStore,
    ) -> GroundingResult<GroundingTrace> {
        let assignments = self.clause.trace_assignments(atom.predicate(), atom.args());
        let mut trace = GroundingTrace::new();
        for assignment in &assignments {
            let results = manager.execute_query(&self.query, Some(assignment))?;
            self.expand_rows(&results, Some(assignment), manager, store, &mut trace)?;
        }
        tracing::debug!(
            kernel = %self.id,
            atom = %atom,
            unifications = assignments.len(),
            created = trace.rules_created,
            "incremental grounding pass complete"
        );
        Ok(trace)
    }

    fn queried_predicates(&self) -> HashSet<PredicateId> {
        self.clause.queried_predicates()
    }
}

/// Ground several independent kernels, in parallel when the configuration
/// allows it. The shared manager and store are the thread-safe
/// collaborators the kernels synchronize through.
pub fn ground_all_kernels(
    kernels: &[Arc<RuleKernel>],
    manager: &AtomManager,
    store: &GroundRuleStore,
    config: &GroundingConfig,
) -> GroundingResult<GroundingTrace> {
    let traces: Vec<GroundingResult<GroundingTrace>> = if config.parallel_kernels {
        if config.num_threads > 0 {
            // ignore the error if a pool was already installed
            let _ = rayon::ThreadPoolBuilder::new()
                .num_threads(config.num_threads)
                .build_global();
        }
        kernels
            .par_iter()
            .map(|kernel| kernel.ground_all(manager, store))
            .collect()
    } else {
        kernels
            .iter()
            .map(|kernel| kernel.ground_all(manager, store))
            .collect()
    };

    let mut combined = GroundingTrace::new();
    for trace in traces {
        combined.absorb(&trace?);
    }
    Ok(combined)
}
