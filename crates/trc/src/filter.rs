//! Runtime record filtering.

use reakt_core::{Priority, Signal};

use crate::record::{Group, Record};

/// Signals above this value always pass the signal filter.
///
/// The per-signal table is bounded so filtering stays allocation-free; the
/// low range is where frameworks put their chatty periodic signals.
pub const MAX_FILTERED_SIGNALS: u16 = 256;

/// Decides which records reach the hook.
///
/// Groups are opt-in (everything silent until a group is enabled, matching
/// the filter-off-to-enable discipline of trace tooling); priorities and
/// signals are opt-out within an enabled group.
#[derive(Debug, Clone)]
pub struct Filter {
    groups: u8,
    prios: u64,
    signals: [u8; (MAX_FILTERED_SIGNALS / 8) as usize],
}

impl Filter {
    pub const fn new() -> Self {
        Self {
            groups: 0,
            prios: u64::MAX,
            signals: [0xFF; (MAX_FILTERED_SIGNALS / 8) as usize],
        }
    }

    /// Enable every group.
    pub fn enable_all_groups(&mut self) {
        self.groups = (1 << Group::COUNT) - 1;
    }

    pub fn enable_group(&mut self, group: Group) {
        self.groups |= group.bit();
    }

    pub fn disable_group(&mut self, group: Group) {
        self.groups &= !group.bit();
    }

    pub fn group_enabled(&self, group: Group) -> bool {
        self.groups & group.bit() != 0
    }

    pub fn enable_priority(&mut self, prio: Priority) {
        self.prios |= 1 << prio.index();
    }

    pub fn disable_priority(&mut self, prio: Priority) {
        self.prios &= !(1 << prio.index());
    }

    pub fn enable_signal(&mut self, signal: Signal) {
        if let Some((byte, bit)) = Self::signal_slot(signal) {
            self.signals[byte] |= bit;
        }
    }

    pub fn disable_signal(&mut self, signal: Signal) {
        if let Some((byte, bit)) = Self::signal_slot(signal) {
            self.signals[byte] &= !bit;
        }
    }

    /// Whether `record` passes the group, priority, and signal filters.
    pub fn passes(&self, record: &Record) -> bool {
        if !self.group_enabled(record.group()) {
            return false;
        }
        if let Some(prio) = record.priority() {
            if self.prios & (1 << prio.index()) == 0 {
                return false;
            }
        }
        if let Some(signal) = record.signal() {
            if let Some((byte, bit)) = Self::signal_slot(signal) {
                if self.signals[byte] & bit == 0 {
                    return false;
                }
            }
        }
        true
    }

    fn signal_slot(signal: Signal) -> Option<(usize, u8)> {
        if signal.raw() < MAX_FILTERED_SIGNALS {
            Some(((signal.raw() / 8) as usize, 1 << (signal.raw() % 8)))
        } else {
            None
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}
