//! The framework critical section.
//!
//! All producer-visible framework state (pools, queues, ready set, timer
//! list) is mutated inside the single critical section supplied by the
//! `critical-section` port. The target integration provides acquire/release;
//! the framework requires only that they nest correctly.

use core::cell::RefCell;

use critical_section::Mutex;

/// Shared mutable cell guarded by the framework critical section.
pub struct CsCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CsCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access to the cell's contents.
    ///
    /// Callbacks must not re-enter the same cell; timers, queues, and pools
    /// all share one critical section, so nested framework calls belong
    /// outside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }
}
