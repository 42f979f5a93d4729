//! Atom Manager
//!
//! Canonical interning of ground atoms, query dispatch with the activation
//! gate, and the activation event subregister.
//!
//! Two ground atoms with equal `(predicate, args)` identity are the same
//! `Arc`-shared object, created on first request and retained for as long
//! as any ground rule references them. Each atom carries an activation
//! flag; query rows that instantiate a queried literal to an inactive atom
//! are withheld until that atom activates, which is what drives the
//! incremental grounding path.

use crate::ast::{Atom, Term};
use crate::config::GroundingConfig;
use crate::error::{GroundingResult, RuleError, RuleResult, StoreError, StoreResult};
use crate::events::{ActivationHandler, EventBus, EventSet, GroundingEvent, RegistrationId};
use crate::ground::GroundRuleStore;
use crate::predicate::{PredicateId, PredicateRegistry};
use crate::query::{ConjunctiveQuery, PartialAssignment, ResultList};
use crate::store::Database;
use crate::trace::GroundingTrace;
use crate::value::Value;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A fully ground, interned atom.
///
/// Equality and hashing cover `(predicate, args)` only; the activation flag
/// is mutable state owned by the atom manager.
#[derive(Debug)]
pub struct GroundAtom {
    predicate: PredicateId,
    args: Vec<Value>,
    active: AtomicBool,
}

impl GroundAtom {
    pub(crate) fn new(predicate: PredicateId, args: Vec<Value>, active: bool) -> Self {
        GroundAtom {
            predicate,
            args,
            active: AtomicBool::new(active),
        }
    }

    /// The atom's predicate id
    pub fn predicate(&self) -> PredicateId {
        self.predicate
    }

    /// The atom's ground arguments
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Current activation state
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Returns the previous state.
    pub(crate) fn set_active(&self, active: bool) -> bool {
        self.active.swap(active, Ordering::AcqRel)
    }
}

impl PartialEq for GroundAtom {
    fn eq(&self, other: &Self) -> bool {
        self.predicate == other.predicate && self.args == other.args
    }
}

impl Eq for GroundAtom {}

impl Hash for GroundAtom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.predicate.hash(state);
        self.args.hash(state);
    }
}

impl fmt::Display for GroundAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

#[derive(PartialEq, Eq, Hash)]
struct AtomKey {
    predicate: PredicateId,
    args: Vec<Value>,
}

/// Ground an atom template's arguments through a variable resolver.
///
/// Placeholders and unresolved variables are internal invariant violations
/// surfaced as [`RuleError::UnknownTermKind`] and
/// [`RuleError::UnboundVariable`].
pub(crate) fn ground_atom_args(
    atom: &Atom,
    resolve: &dyn Fn(&str) -> Option<Value>,
) -> RuleResult<Vec<Value>> {
    let mut args = Vec::with_capacity(atom.arity());
    for (position, term) in atom.terms.iter().enumerate() {
        match term {
            Term::Constant(value) => args.push(value.clone()),
            Term::Variable(name) => match resolve(name) {
                Some(value) => args.push(value),
                None => return Err(RuleError::UnboundVariable(name.clone())),
            },
            Term::Placeholder => return Err(RuleError::UnknownTermKind(position)),
        }
    }
    Ok(args)
}

struct Registration {
    handler: Arc<dyn ActivationHandler>,
    events: EventSet,
    predicates: HashSet<PredicateId>,
}

/// Canonical atom table, query dispatcher, and activation event framework
/// for one database view.
pub struct AtomManager {
    db: Database,
    interned: DashMap<AtomKey, Arc<GroundAtom>>,
    default_active: bool,
    result_capacity: usize,
    bus: EventBus,
    registrations: Mutex<BTreeMap<RegistrationId, Registration>>,
    next_registration: AtomicU64,
}

impl AtomManager {
    /// Create a manager where new atoms start active.
    pub fn new(db: Database) -> Self {
        Self::with_default_activation(db, true)
    }

    /// Create a manager choosing whether new atoms start active.
    ///
    /// Passing `false` gives lazy grounding: no row is visible until every
    /// queried atom instantiating it has been explicitly activated.
    pub fn with_default_activation(db: Database, default_active: bool) -> Self {
        AtomManager {
            db,
            interned: DashMap::new(),
            default_active,
            result_capacity: 0,
            bus: EventBus::new(),
            registrations: Mutex::new(BTreeMap::new()),
            next_registration: AtomicU64::new(0),
        }
    }

    /// Create a manager from configuration.
    pub fn with_config(db: Database, config: &GroundingConfig) -> Self {
        let mut manager = Self::with_default_activation(db, config.default_activation);
        manager.result_capacity = config.initial_result_capacity;
        manager
    }

    /// The underlying database view
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The predicate registry backing the view
    pub fn registry(&self) -> &Arc<PredicateRegistry> {
        self.db.registry()
    }

    /// Number of interned atoms
    pub fn atom_count(&self) -> usize {
        self.interned.len()
    }

    /// Interning constructor: the canonical atom for `(predicate, args)`,
    /// created if absent.
    pub fn get_atom(&self, predicate: PredicateId, args: Vec<Value>) -> StoreResult<Arc<GroundAtom>> {
        let pred = self
            .registry()
            .get(predicate)
            .ok_or(StoreError::UnknownPredicate(predicate.raw()))?;
        if pred.arity() != args.len() {
            return Err(StoreError::ArityMismatch {
                name: pred.name().to_string(),
                expected: pred.arity(),
                got: args.len(),
            });
        }

        let key = AtomKey {
            predicate,
            args: args.clone(),
        };
        let atom = self
            .interned
            .entry(key)
            .or_insert_with(|| Arc::new(GroundAtom::new(predicate, args, self.default_active)))
            .clone();
        Ok(atom)
    }

    /// Look up the canonical atom without creating it.
    pub fn lookup_atom(&self, predicate: PredicateId, args: &[Value]) -> Option<Arc<GroundAtom>> {
        let key = AtomKey {
            predicate,
            args: args.to_vec(),
        };
        self.interned.get(&key).map(|entry| Arc::clone(&entry))
    }

    /// Mark an atom active. On the inactive→active transition an
    /// activation event is queued and `true` is returned; re-activating is
    /// a no-op.
    pub fn activate(&self, atom: &Arc<GroundAtom>) -> bool {
        let was_active = atom.set_active(true);
        if !was_active {
            tracing::debug!(atom = %atom, "atom activated");
            self.bus.publish(GroundingEvent::AtomActivated(Arc::clone(atom)));
        }
        !was_active
    }

    /// Mark an atom inactive. No event is emitted.
    pub fn deactivate(&self, atom: &Arc<GroundAtom>) {
        atom.set_active(false);
    }

    /// Execute a conjunctive query over the view, materializing rows and
    /// withholding those that instantiate a queried literal to an inactive
    /// atom. Closed predicates bypass the activation gate.
    pub fn execute_query(
        &self,
        query: &ConjunctiveQuery,
        partial: Option<&PartialAssignment>,
    ) -> GroundingResult<ResultList> {
        let raw = self.db.execute_query(query, partial)?;

        let mut filtered =
            ResultList::with_capacity(raw.variables().to_vec(), self.result_capacity.min(raw.len()));
        'rows: for i in 0..raw.len() {
            for template in query.atoms() {
                let resolve = |name: &str| raw.get(i, name).cloned();
                let args = ground_atom_args(template, &resolve)?;
                let atom = self.get_atom(template.predicate, args)?;
                if !(self.db.is_closed(template.predicate) || atom.is_active()) {
                    continue 'rows;
                }
            }
            if let Some(row) = raw.row(i) {
                filtered.push_row(row.to_vec());
            }
        }
        tracing::trace!(
            raw = raw.len(),
            visible = filtered.len(),
            "query executed"
        );
        Ok(filtered)
    }

    /// Register a handler for the given event kinds; returns its identity
    /// token.
    pub fn register(&self, handler: Arc<dyn ActivationHandler>, events: EventSet) -> RegistrationId {
        let id = RegistrationId(self.next_registration.fetch_add(1, Ordering::Relaxed));
        let predicates = handler.queried_predicates();
        self.registrations.lock().insert(
            id,
            Registration {
                handler,
                events,
                predicates,
            },
        );
        id
    }

    /// Remove a registration; returns whether it existed.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        self.registrations.lock().remove(&id).is_some()
    }

    /// Number of live registrations
    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Number of queued, undelivered events
    pub fn pending_events(&self) -> usize {
        self.bus.pending()
    }

    /// Drain the activation queue, delivering each event to every
    /// registered handler whose clause queries the atom's predicate.
    ///
    /// Delivery is serial in activation order; a handler finishes one
    /// event before the next is delivered. Handlers run without any
    /// manager lock held, so they are free to query and intern.
    pub fn dispatch_events(&self, store: &GroundRuleStore) -> GroundingResult<GroundingTrace> {
        let mut trace = GroundingTrace::default();
        while let Some(event) = self.bus.try_next() {
            let GroundingEvent::AtomActivated(atom) = event;
            let targets: Vec<Arc<dyn ActivationHandler>> = {
                let registrations = self.registrations.lock();
                registrations
                    .values()
                    .filter(|r| {
                        r.events.contains(EventSet::ATOM_ACTIVATED)
                            && r.predicates.contains(&atom.predicate())
                    })
                    .map(|r| Arc::clone(&r.handler))
                    .collect()
            };
            for handler in targets {
                let handler_trace = handler.on_atom_activated(&atom, self, store)?;
                trace.absorb(&handler_trace);
            }
        }
        Ok(trace)
    }
}
