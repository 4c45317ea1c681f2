//! Integration hook points.

/// Callbacks the target integration supplies to the kernel.
///
/// `on_idle` runs outside the critical section whenever no active object is
/// ready; a target may wait for interrupt there, a host port can yield.
pub trait Platform: Send {
    fn on_start(&mut self) {}

    fn on_idle(&mut self) {
        #[cfg(feature = "std")]
        std::thread::yield_now();
    }

    fn on_exit(&mut self) {}
}

/// No-op platform for hosted targets and tests.
pub struct DefaultPlatform;

impl Platform for DefaultPlatform {}
