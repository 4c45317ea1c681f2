//! Active objects: a state machine bound to a context, seen by the kernel
//! through an object-safe trait.

use reakt_core::{Event, Outcome, Priority};
use reakt_sm::{Machine, MachineDef};
use reakt_trc::Tracer;

/// The kernel's view of a registered active object.
///
/// Implemented by [`Active`]; applications with hand-rolled state handling
/// can implement it directly.
pub trait Agent: Send {
    fn name(&self) -> &'static str;

    /// Called once at registration with the assigned priority.
    fn bind(&mut self, priority: Priority);

    /// Run the top-level initial transition.
    fn init(&mut self, tracer: &Tracer) -> Outcome;

    /// Execute one run-to-completion step.
    fn dispatch(&mut self, event: &Event, tracer: &Tracer) -> Outcome;

    /// Whether the state machine reached a final state.
    fn is_completed(&self) -> bool;

    /// Name of the current stable state, once initialized.
    fn current_state(&self) -> Option<&'static str>;
}

/// A hierarchical state machine paired with its application context.
///
/// The context is where application data lives; actions and guards receive
/// it on every step. A context that holds an `Arc<Framework>` can post
/// events and manage timers from inside actions.
pub struct Active<C: 'static> {
    name: &'static str,
    machine: Machine<C>,
    ctx: C,
}

impl<C> Active<C> {
    pub fn new(def: &'static MachineDef<C>, ctx: C) -> Self {
        Self {
            name: def.name,
            machine: Machine::new(def),
            ctx,
        }
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn machine(&self) -> &Machine<C> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine<C> {
        &mut self.machine
    }
}

impl<C: Send + 'static> Agent for Active<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn bind(&mut self, priority: Priority) {
        self.machine.set_owner(priority);
    }

    fn init(&mut self, tracer: &Tracer) -> Outcome {
        self.machine.init(&mut self.ctx, tracer)
    }

    fn dispatch(&mut self, event: &Event, tracer: &Tracer) -> Outcome {
        self.machine.dispatch(&mut self.ctx, event, tracer)
    }

    fn is_completed(&self) -> bool {
        self.machine.is_completed()
    }

    fn current_state(&self) -> Option<&'static str> {
        self.machine.current().map(|state| state.name)
    }
}
