//! In-memory record backend, mainly for tests and host-side debugging.

use alloc::sync::Arc;
use alloc::vec::Vec;

use reakt_core::sync::CsCell;

use crate::record::Record;
use crate::tracer::Hook;

/// Collects every record it is handed, in emission order.
#[derive(Clone)]
pub struct RecordLog {
    records: Arc<CsCell<Vec<Record>>>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self {
            records: Arc::new(CsCell::new(Vec::new())),
        }
    }

    /// Hook to install on a tracer.
    pub fn hook(&self) -> Hook {
        let records = Arc::clone(&self.records);
        Arc::new(move |record: &Record| {
            records.with(|r| r.push(record.clone()));
        })
    }

    /// Drain and return everything collected so far.
    pub fn take(&self) -> Vec<Record> {
        self.records.with(core::mem::take)
    }

    /// Snapshot without draining.
    pub fn records(&self) -> Vec<Record> {
        self.records.with(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.records.with(|r| r.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecordLog {
    fn default() -> Self {
        Self::new()
    }
}
