//! Typed trace records.
//!
//! The record families mirror the instrumentation points of the framework:
//! pool traffic, queue traffic, active-object lifecycle, state-machine
//! processing, timer lifecycle, and framework lifecycle. Each record carries
//! the identifiers a backend needs to reconstruct the step: the involved
//! active object's priority, state names, the event signal, and counts.

use reakt_core::{Outcome, Priority, Signal};

/// Record category, the coarsest filter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Pool,
    Queue,
    Ao,
    Sm,
    Timer,
    Fwk,
}

impl Group {
    pub(crate) const COUNT: usize = 6;

    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Event pool instrumentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolRecord {
    Registered {
        pool: u8,
        block_size: usize,
        blocks: usize,
    },
    BlockTaken {
        pool: u8,
        free: usize,
    },
    BlockReturned {
        pool: u8,
        free: usize,
    },
}

/// Event queue instrumentation; `depth` is the queue length after the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueRecord {
    PostFifo {
        target: Priority,
        signal: Signal,
        depth: usize,
    },
    PostLifo {
        target: Priority,
        signal: Signal,
        depth: usize,
    },
    Get {
        target: Priority,
        signal: Signal,
        depth: usize,
    },
    Full {
        target: Priority,
        signal: Signal,
    },
}

/// Active-object lifecycle instrumentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AoRecord {
    Registered { prio: Priority, name: &'static str },
    Activated { prio: Priority, state: &'static str },
    Terminated { prio: Priority },
}

/// State-machine engine instrumentation, emitted inline during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmRecord {
    /// Top-level initial transition is about to run.
    Init { prio: Priority, state: &'static str },
    /// One event entered the dispatch engine.
    Dispatch {
        prio: Priority,
        signal: Signal,
        state: &'static str,
    },
    /// A transition was selected.
    Transition {
        prio: Priority,
        source: &'static str,
        target: &'static str,
    },
    /// A state's entry action ran.
    StateEntry { prio: Priority, state: &'static str },
    /// A state's exit action ran.
    StateExit { prio: Priority, state: &'static str },
    /// Exit/entry/action totals for the completed compound transition.
    Counts {
        prio: Priority,
        exits: u8,
        entries: u8,
        actions: u8,
    },
    /// The stable state the machine settled in.
    Current { prio: Priority, state: &'static str },
    /// Final outcome of the run-to-completion step.
    Outcome {
        prio: Priority,
        signal: Signal,
        outcome: Outcome,
    },
}

/// Software timer instrumentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerRecord {
    Started {
        signal: Signal,
        target: Priority,
        ticks: u32,
        period: u32,
    },
    Stopped {
        signal: Signal,
        target: Priority,
        was_active: bool,
    },
    Expired {
        signal: Signal,
        target: Priority,
    },
}

/// Framework lifecycle and dynamic-event instrumentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FwkRecord {
    Started,
    Exited,
    Tick,
    EventNew {
        signal: Signal,
        pool: u8,
        size: usize,
    },
    /// Refcount dropped but holders remain.
    EventReleased {
        signal: Signal,
        refs: u8,
    },
    /// Refcount reached zero; block returned to its pool.
    EventRecycled {
        signal: Signal,
        pool: u8,
    },
    Published {
        signal: Signal,
        subscribers: usize,
    },
    /// Event parked on a deferral queue.
    Deferred {
        signal: Signal,
    },
    /// Deferred event moved back to its target's queue.
    Recalled {
        signal: Signal,
        target: Priority,
    },
}

/// A single observation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Pool(PoolRecord),
    Queue(QueueRecord),
    Ao(AoRecord),
    Sm(SmRecord),
    Timer(TimerRecord),
    Fwk(FwkRecord),
}

impl Record {
    pub fn group(&self) -> Group {
        match self {
            Record::Pool(_) => Group::Pool,
            Record::Queue(_) => Group::Queue,
            Record::Ao(_) => Group::Ao,
            Record::Sm(_) => Group::Sm,
            Record::Timer(_) => Group::Timer,
            Record::Fwk(_) => Group::Fwk,
        }
    }

    /// Priority of the active object this record concerns, when it has one.
    pub fn priority(&self) -> Option<Priority> {
        match self {
            Record::Pool(_) => None,
            Record::Queue(r) => match r {
                QueueRecord::PostFifo { target, .. }
                | QueueRecord::PostLifo { target, .. }
                | QueueRecord::Get { target, .. }
                | QueueRecord::Full { target, .. } => Some(*target),
            },
            Record::Ao(r) => match r {
                AoRecord::Registered { prio, .. }
                | AoRecord::Activated { prio, .. }
                | AoRecord::Terminated { prio } => Some(*prio),
            },
            Record::Sm(r) => match r {
                SmRecord::Init { prio, .. }
                | SmRecord::Dispatch { prio, .. }
                | SmRecord::Transition { prio, .. }
                | SmRecord::StateEntry { prio, .. }
                | SmRecord::StateExit { prio, .. }
                | SmRecord::Counts { prio, .. }
                | SmRecord::Current { prio, .. }
                | SmRecord::Outcome { prio, .. } => Some(*prio),
            },
            Record::Timer(r) => match r {
                TimerRecord::Started { target, .. }
                | TimerRecord::Stopped { target, .. }
                | TimerRecord::Expired { target, .. } => Some(*target),
            },
            Record::Fwk(_) => None,
        }
    }

    /// Event signal this record concerns, when it has one.
    pub fn signal(&self) -> Option<Signal> {
        match self {
            Record::Pool(_) => None,
            Record::Queue(r) => match r {
                QueueRecord::PostFifo { signal, .. }
                | QueueRecord::PostLifo { signal, .. }
                | QueueRecord::Get { signal, .. }
                | QueueRecord::Full { signal, .. } => Some(*signal),
            },
            Record::Ao(_) => None,
            Record::Sm(r) => match r {
                SmRecord::Dispatch { signal, .. } | SmRecord::Outcome { signal, .. } => {
                    Some(*signal)
                }
                _ => None,
            },
            Record::Timer(r) => match r {
                TimerRecord::Started { signal, .. }
                | TimerRecord::Stopped { signal, .. }
                | TimerRecord::Expired { signal, .. } => Some(*signal),
            },
            Record::Fwk(r) => match r {
                FwkRecord::EventNew { signal, .. }
                | FwkRecord::EventReleased { signal, .. }
                | FwkRecord::EventRecycled { signal, .. }
                | FwkRecord::Published { signal, .. }
                | FwkRecord::Deferred { signal }
                | FwkRecord::Recalled { signal, .. } => Some(*signal),
                _ => None,
            },
        }
    }
}
