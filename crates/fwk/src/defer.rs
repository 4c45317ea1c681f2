//! Event deferral.
//!
//! A state that cannot handle an event yet parks it on a deferral queue and
//! recalls it after the state change that makes it relevant. The deferral
//! queue holds one reference per parked event, so deferred dynamic events
//! stay alive while they wait.

use alloc::collections::VecDeque;
use alloc::sync::Arc;

use reakt_core::sync::CsCell;
use reakt_core::EventRef;

struct DeferInner {
    items: VecDeque<EventRef>,
    capacity: usize,
}

/// Bounded holding queue for deferred events.
///
/// Owned by the application (typically inside an active object's context)
/// and operated through [`Framework::defer`] and [`Framework::recall`].
/// Cloning shares the same queue.
///
/// [`Framework::defer`]: crate::framework::Framework::defer
/// [`Framework::recall`]: crate::framework::Framework::recall
#[derive(Clone)]
pub struct DeferQueue {
    inner: Arc<CsCell<DeferInner>>,
}

impl DeferQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(CsCell::new(DeferInner {
                items: VecDeque::with_capacity(capacity),
                capacity,
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.with(|q| q.items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn push(&self, ev: EventRef) -> bool {
        self.inner.with(|q| {
            if q.items.len() >= q.capacity {
                false
            } else {
                q.items.push_back(ev);
                true
            }
        })
    }

    pub(crate) fn pop(&self) -> Option<EventRef> {
        self.inner.with(|q| q.items.pop_front())
    }

    pub(crate) fn push_front(&self, ev: EventRef) {
        self.inner.with(|q| q.items.push_front(ev));
    }
}
