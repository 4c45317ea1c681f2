//! The shared tracer handle.

use alloc::sync::Arc;

use reakt_core::sync::CsCell;

use crate::filter::Filter;
use crate::record::Record;

/// Backend callback. Must run in bounded time and must not call framework
/// APIs that allocate or dispatch.
pub type Hook = Arc<dyn Fn(&Record) + Send + Sync>;

struct TracerInner {
    filter: Filter,
    hook: Option<Hook>,
}

/// Cheap-to-clone handle through which the framework emits records.
///
/// A tracer with no hook installed drops every record after the filter
/// check, so instrumentation costs one critical-section entry when tracing
/// is off.
#[derive(Clone)]
pub struct Tracer {
    inner: Arc<CsCell<TracerInner>>,
}

impl Tracer {
    /// Tracer with the default (all-silent) filter and no backend.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CsCell::new(TracerInner {
                filter: Filter::new(),
                hook: None,
            })),
        }
    }

    /// Install the backend callback.
    pub fn set_hook(&self, hook: Hook) {
        self.inner.with(|inner| inner.hook = Some(hook));
    }

    /// Remove the backend callback.
    pub fn clear_hook(&self) {
        self.inner.with(|inner| inner.hook = None);
    }

    /// Adjust the filter in place.
    pub fn configure<R>(&self, f: impl FnOnce(&mut Filter) -> R) -> R {
        self.inner.with(|inner| f(&mut inner.filter))
    }

    /// Emit one record through the filter to the backend.
    pub fn emit(&self, record: Record) {
        let hook = self.inner.with(|inner| {
            if inner.hook.is_some() && inner.filter.passes(&record) {
                inner.hook.clone()
            } else {
                None
            }
        });
        if let Some(hook) = hook {
            hook(&record);
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}
