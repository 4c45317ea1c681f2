//! Immutable state descriptors.
//!
//! A state graph is a tree of `&'static` descriptors rooted at a state whose
//! `parent` is `None`. Applications declare descriptors as `static` items
//! and wire them together by reference; the engine never mutates them.

use reakt_core::{Event, Signal};

/// Entry, exit, and initial-transition callback over the machine context.
pub type StateAction<C> = fn(&mut C);

/// Transition-effect callback over the machine context and the event.
pub type TransAction<C> = fn(&mut C, &Event);

/// Guard predicate. Pure by contract: no posting, no dispatching.
pub type Guard<C> = fn(&C, &Event) -> bool;

/// A basic, composite, or final state.
pub struct State<C: 'static> {
    pub name: &'static str,
    /// Enclosing composite; `None` for the root.
    pub parent: Option<&'static State<C>>,
    pub entry: Option<StateAction<C>>,
    pub exit: Option<StateAction<C>>,
    /// Outgoing transitions, scanned in order during trigger search.
    pub transitions: &'static [Trans<C>],
    pub kind: StateKind<C>,
}

/// Variant-specific part of a state descriptor.
pub enum StateKind<C: 'static> {
    Basic,
    Composite {
        /// Default substate, entered by the initial transition.
        default: &'static State<C>,
        /// Effect of the default initial transition.
        initial_action: Option<StateAction<C>>,
        /// History pseudostate owned by this composite, if any.
        history: Option<&'static History<C>>,
    },
    /// Terminal state: the machine has completed.
    Final,
}

/// One row of a transition table.
pub struct Trans<C: 'static> {
    pub signal: Signal,
    pub guard: Option<Guard<C>>,
    pub action: Option<TransAction<C>>,
    pub target: Target<C>,
}

/// Where a transition leads.
pub enum Target<C: 'static> {
    /// Internal transition: action only, no exit or entry.
    Internal,
    To(&'static Vertex<C>),
}

/// Any node a transition segment can point at.
pub enum Vertex<C: 'static> {
    State(&'static State<C>),
    Choice(&'static Choice<C>),
    Junction(&'static Junction<C>),
    History(&'static History<C>),
}

impl<C> Clone for Vertex<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Vertex<C> {}

/// Conditional pseudostate: guarded branch table.
pub struct Choice<C: 'static> {
    pub name: &'static str,
    pub branches: &'static [Branch<C>],
}

/// One branch of a choice. A `None` guard marks the default branch.
pub struct Branch<C: 'static> {
    pub guard: Option<Guard<C>>,
    pub action: Option<TransAction<C>>,
    pub target: &'static Vertex<C>,
}

/// Junction pseudostate: a single unconditional segment.
pub struct Junction<C: 'static> {
    pub name: &'static str,
    pub action: Option<TransAction<C>>,
    pub target: &'static Vertex<C>,
}

/// Shallow or deep history pseudostate.
///
/// The stored state lives in the machine instance at index `slot`; the
/// descriptor itself stays immutable. An optional `default` segment is
/// taken when the slot is empty; without one, the owning composite's
/// default substate applies.
pub struct History<C: 'static> {
    pub name: &'static str,
    /// The composite whose past this pseudostate remembers.
    pub parent: &'static State<C>,
    pub kind: HistoryKind,
    /// Index into the machine instance's history store.
    pub slot: usize,
    pub default: Option<&'static Vertex<C>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    /// Remembers the most recently active direct substate.
    Shallow,
    /// Remembers the full innermost active leaf.
    Deep,
}

impl<C> State<C> {
    /// Whether `self` and `other` are the same descriptor.
    pub fn same(&self, other: &State<C>) -> bool {
        core::ptr::eq(self, other)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, StateKind::Composite { .. })
    }

    pub fn is_final(&self) -> bool {
        matches!(self.kind, StateKind::Final)
    }
}
