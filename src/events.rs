//! Activation Event Framework
//!
//! Atom activations are explicit messages: the atom manager publishes them
//! onto a queue, and registered handlers consume them when the queue is
//! drained. Handlers are identified by a registration token so they can be
//! unregistered; there is no hidden callback state.
//!
//! The only event kind the grounder supports is atom-activated.

use crate::atoms::{AtomManager, GroundAtom};
use crate::error::GroundingResult;
use crate::ground::GroundRuleStore;
use crate::predicate::PredicateId;
use crate::trace::GroundingTrace;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// An event observed by the grounding pipeline.
#[derive(Debug, Clone)]
pub enum GroundingEvent {
    /// A previously inactive atom became active
    AtomActivated(Arc<GroundAtom>),
}

/// Bit set of event kinds a registration subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSet(u8);

impl EventSet {
    /// No events
    pub const NONE: EventSet = EventSet(0);
    /// Atom activation events
    pub const ATOM_ACTIVATED: EventSet = EventSet(1);

    /// True if `other`'s kinds are all included in `self`
    pub fn contains(self, other: EventSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two sets
    pub fn union(self, other: EventSet) -> EventSet {
        EventSet(self.0 | other.0)
    }
}

/// Identity token for a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(pub(crate) u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg{}", self.0)
    }
}

/// A handler for activation events, registered with the atom manager.
///
/// The event framework serializes delivery: a handler is never re-entered
/// while its previous invocation is still running.
pub trait ActivationHandler: Send + Sync {
    /// React to a newly activated atom, inserting any newly enabled ground
    /// rules into `store`.
    fn on_atom_activated(
        &self,
        atom: &Arc<GroundAtom>,
        manager: &AtomManager,
        store: &GroundRuleStore,
    ) -> GroundingResult<GroundingTrace>;

    /// Predicates this handler's clause queries; activations of other
    /// predicates are not delivered to it.
    fn queried_predicates(&self) -> HashSet<PredicateId>;
}

/// Unbounded activation queue.
pub(crate) struct EventBus {
    tx: Sender<GroundingEvent>,
    rx: Receiver<GroundingEvent>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded();
        EventBus { tx, rx }
    }

    pub(crate) fn publish(&self, event: GroundingEvent) {
        // send on an unbounded channel cannot fail while rx is held
        let _ = self.tx.send(event);
    }

    pub(crate) fn try_next(&self) -> Option<GroundingEvent> {
        self.rx.try_recv().ok()
    }

    pub(crate) fn pending(&self) -> usize {
        self.rx.len()
    }
}
