//! Software timers driven by a single tick source.

use alloc::sync::Arc;
use alloc::vec::Vec;

use thiserror::Error as ThisError;

use reakt_core::sync::CsCell;
use reakt_core::{Error, Priority, Signal};

/// Timer operation failures.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum TimerError {
    #[error("timer needs at least one tick")]
    ZeroTicks,
    #[error("expiry post to {target} failed: {cause}")]
    Post { target: Priority, cause: Error },
}

pub(crate) struct TimerState {
    pub signal: Signal,
    pub target: Priority,
    pub remaining: u32,
    pub period: u32,
    pub armed: bool,
}

/// Handle to one software timer.
///
/// Created inactive; armed through the framework, which also owns the
/// active-timer list and drives expiry from its tick input. Cloning the
/// handle shares the same timer.
#[derive(Clone)]
pub struct Timer {
    state: Arc<CsCell<TimerState>>,
}

impl Timer {
    /// Timer that will post `signal` to the object at `target` on expiry.
    pub fn new(signal: Signal, target: Priority) -> Self {
        Self {
            state: Arc::new(CsCell::new(TimerState {
                signal,
                target,
                remaining: 0,
                period: 0,
                armed: false,
            })),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state.with(|s| s.armed)
    }

    pub fn signal(&self) -> Signal {
        self.state.with(|s| s.signal)
    }

    pub fn target(&self) -> Priority {
        self.state.with(|s| s.target)
    }

    pub(crate) fn shared(&self) -> Arc<CsCell<TimerState>> {
        Arc::clone(&self.state)
    }
}

/// Insertion-ordered list of armed timers.
///
/// Expiry order within one tick is list order, which is arming order; the
/// tests rely on that as a stable contract.
pub(crate) struct TimerList {
    entries: Vec<Arc<CsCell<TimerState>>>,
}

impl TimerList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Arm `timer`. A timer that is already linked is re-armed in place and
    /// keeps its list position.
    pub fn start(&mut self, timer: &Timer, nticks: u32, period: u32) {
        let shared = timer.shared();
        shared.with(|s| {
            s.remaining = nticks;
            s.period = period;
            s.armed = true;
        });
        if !self.is_linked(&shared) {
            self.entries.push(shared);
        }
    }

    /// Disarm and unlink `timer`; returns whether it was armed.
    pub fn stop(&mut self, timer: &Timer) -> bool {
        let shared = timer.shared();
        let was_active = shared.with(|s| {
            let was = s.armed;
            s.armed = false;
            s.remaining = 0;
            was
        });
        self.entries.retain(|entry| !Arc::ptr_eq(entry, &shared));
        was_active
    }

    /// Advance every armed timer by one tick. Expired timers are collected
    /// in list order; one-shots are unlinked, periodic timers reloaded.
    pub fn tick(&mut self) -> Vec<(Signal, Priority)> {
        let mut expired = Vec::new();
        for entry in &self.entries {
            entry.with(|s| {
                if !s.armed {
                    return;
                }
                s.remaining -= 1;
                if s.remaining == 0 {
                    expired.push((s.signal, s.target));
                    if s.period > 0 {
                        s.remaining = s.period;
                    } else {
                        s.armed = false;
                    }
                }
            });
        }
        self.entries.retain(|entry| entry.with(|s| s.armed));
        expired
    }

    pub fn armed_count(&self) -> usize {
        self.entries.len()
    }

    fn is_linked(&self, shared: &Arc<CsCell<TimerState>>) -> bool {
        self.entries.iter().any(|entry| Arc::ptr_eq(entry, shared))
    }
}
