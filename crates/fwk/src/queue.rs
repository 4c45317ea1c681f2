//! Bounded per-object event queue.

use alloc::collections::VecDeque;

use reakt_core::{CoreResult, Error, EventRef};

/// Ring buffer of event references with a fixed capacity.
///
/// FIFO posts append at the tail; LIFO posts prepend at the head for urgent
/// delivery ahead of anything already queued. The queue itself is not
/// synchronized; all access goes through the framework critical section.
pub struct EventQueue {
    items: VecDeque<EventRef>,
    capacity: usize,
    high_water: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            high_water: 0,
        }
    }

    pub fn post_fifo(&mut self, event: EventRef) -> CoreResult<()> {
        if self.is_full() {
            return Err(Error::QueueFull);
        }
        self.items.push_back(event);
        self.bump_high_water();
        Ok(())
    }

    pub fn post_lifo(&mut self, event: EventRef) -> CoreResult<()> {
        if self.is_full() {
            return Err(Error::QueueFull);
        }
        self.items.push_front(event);
        self.bump_high_water();
        Ok(())
    }

    pub fn get(&mut self) -> Option<EventRef> {
        self.items.pop_front()
    }

    /// Remove and return everything still queued.
    pub fn drain(&mut self) -> impl Iterator<Item = EventRef> + '_ {
        self.items.drain(..)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest occupancy observed since creation.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    fn bump_high_water(&mut self) {
        if self.items.len() > self.high_water {
            self.high_water = self.items.len();
        }
    }
}
