//! The shared framework context.
//!
//! One object owns everything producers touch: the event pools, the
//! per-object queues, the ready set, the timer list, and the subscription
//! table. Every mutation happens inside the single framework critical
//! section, so interrupt-context producers (the tick source, posts from
//! other threads) serialize against the kernel's dequeue path.
//!
//! Reference discipline for dynamic events: allocation hands the producer
//! one reference; every queue slot adds one. A producer that is done
//! posting drops its own reference with [`Framework::recycle`]; the kernel
//! drops the in-dispatch reference after the run-to-completion step.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use reakt_core::sync::CsCell;
use reakt_core::{CoreResult, Error, Event, EventRef, Priority, ReadySet, Signal};
use reakt_mem::{PoolManager, Release};
use reakt_trc::{FwkRecord, PoolRecord, QueueRecord, Record, TimerRecord, Tracer};

use crate::defer::DeferQueue;
use crate::queue::EventQueue;
use crate::timer::{Timer, TimerError, TimerList};

struct FwkState {
    pools: PoolManager,
    queues: Vec<Option<EventQueue>>,
    ready: ReadySet,
    timers: TimerList,
    subs: BTreeMap<Signal, Vec<Priority>>,
}

impl FwkState {
    fn new() -> Self {
        Self {
            pools: PoolManager::new(),
            queues: (0..Priority::MAX.raw()).map(|_| None).collect(),
            ready: ReadySet::new(),
            timers: TimerList::new(),
            subs: BTreeMap::new(),
        }
    }

    /// Post under the already-held critical section. The queue slot's
    /// reference is taken before insertion; the ready bit follows it.
    fn enqueue(
        &mut self,
        tracer: &Tracer,
        target: Priority,
        ev: EventRef,
        lifo: bool,
    ) -> CoreResult<()> {
        let signal = self.pools.signal_of(ev)?;
        let Some(queue) = self.queues.get_mut(target.index()).and_then(Option::as_mut) else {
            return Err(Error::NotRegistered);
        };
        if queue.is_full() {
            tracer.emit(Record::Queue(QueueRecord::Full { target, signal }));
            return Err(Error::QueueFull);
        }
        self.pools.retain(ev)?;
        if lifo {
            queue.post_lifo(ev)?;
        } else {
            queue.post_fifo(ev)?;
        }
        let depth = queue.len();
        self.ready.mark(target);
        let record = if lifo {
            QueueRecord::PostLifo {
                target,
                signal,
                depth,
            }
        } else {
            QueueRecord::PostFifo {
                target,
                signal,
                depth,
            }
        };
        tracer.emit(Record::Queue(record));
        Ok(())
    }

    /// Drop one reference under the already-held critical section.
    fn release(&mut self, tracer: &Tracer, ev: EventRef) -> CoreResult<()> {
        let signal = self.pools.signal_of(ev)?;
        match self.pools.release(ev)? {
            Release::Static => {}
            Release::Released { refs } => {
                tracer.emit(Record::Fwk(FwkRecord::EventReleased { signal, refs }));
            }
            Release::Recycled { pool } => {
                let free = self.pools.free_blocks(pool)?;
                tracer.emit(Record::Fwk(FwkRecord::EventRecycled { signal, pool }));
                tracer.emit(Record::Pool(PoolRecord::BlockReturned { pool, free }));
            }
        }
        Ok(())
    }
}

/// Shared framework context; clone the `Arc` into any producer context.
pub struct Framework {
    state: CsCell<FwkState>,
    tracer: Tracer,
}

impl Framework {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: CsCell::new(FwkState::new()),
            tracer: Tracer::new(),
        })
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    // ---- event pools -----------------------------------------------------

    /// Register a block pool. Pools must be added smallest block size first.
    pub fn register_pool(&self, block_size: usize, nblocks: usize) -> CoreResult<u8> {
        let pool = self.state.with(|s| s.pools.register(block_size, nblocks))?;
        self.tracer.emit(Record::Pool(PoolRecord::Registered {
            pool,
            block_size,
            blocks: nblocks,
        }));
        Ok(pool)
    }

    /// Allocate a dynamic event; the caller holds the first reference.
    pub fn new_event(&self, signal: Signal, payload: &[u8]) -> CoreResult<EventRef> {
        self.state.with(|s| {
            let ev = s.pools.new_event(signal, payload)?;
            if let EventRef::Dynamic { pool, .. } = ev {
                let free = s.pools.free_blocks(pool)?;
                self.tracer.emit(Record::Fwk(FwkRecord::EventNew {
                    signal,
                    pool,
                    size: payload.len(),
                }));
                self.tracer
                    .emit(Record::Pool(PoolRecord::BlockTaken { pool, free }));
            }
            Ok(ev)
        })
    }

    /// Drop one reference to `ev`; static events pass through untouched.
    pub fn recycle(&self, ev: EventRef) -> CoreResult<()> {
        self.state.with(|s| s.release(&self.tracer, ev))
    }

    pub fn pool_free_blocks(&self, pool: u8) -> CoreResult<usize> {
        self.state.with(|s| s.pools.free_blocks(pool))
    }

    pub fn pool_used_blocks(&self, pool: u8) -> CoreResult<usize> {
        self.state.with(|s| s.pools.used_blocks(pool))
    }

    pub fn pool_min_free_blocks(&self, pool: u8) -> CoreResult<usize> {
        self.state.with(|s| s.pools.min_free_blocks(pool))
    }

    pub fn pool_total_blocks(&self, pool: u8) -> CoreResult<usize> {
        self.state.with(|s| s.pools.total_blocks(pool))
    }

    // ---- event posting ---------------------------------------------------

    /// Append `ev` to the target object's queue.
    pub fn post_fifo(&self, target: Priority, ev: EventRef) -> CoreResult<()> {
        self.state
            .with(|s| s.enqueue(&self.tracer, target, ev, false))
    }

    /// Prepend `ev` for delivery ahead of anything already queued.
    pub fn post_lifo(&self, target: Priority, ev: EventRef) -> CoreResult<()> {
        self.state
            .with(|s| s.enqueue(&self.tracer, target, ev, true))
    }

    // ---- publish / subscribe ---------------------------------------------

    /// Subscribe the object at `prio` to events carrying `signal`.
    pub fn subscribe(&self, prio: Priority, signal: Signal) -> CoreResult<()> {
        self.state.with(|s| {
            if s.queues.get(prio.index()).and_then(Option::as_ref).is_none() {
                return Err(Error::NotRegistered);
            }
            let subs = s.subs.entry(signal).or_default();
            if !subs.contains(&prio) {
                subs.push(prio);
            }
            Ok(())
        })
    }

    pub fn unsubscribe(&self, prio: Priority, signal: Signal) -> CoreResult<()> {
        self.state.with(|s| {
            if let Some(subs) = s.subs.get_mut(&signal) {
                subs.retain(|p| *p != prio);
            }
            Ok(())
        })
    }

    /// Post `ev` FIFO to every subscriber of its signal, in subscription
    /// order. Returns the number of queues it reached; a full queue aborts
    /// the fan-out with the error.
    pub fn publish(&self, ev: EventRef) -> CoreResult<usize> {
        self.state.with(|s| {
            let signal = s.pools.signal_of(ev)?;
            let subscribers = s.subs.get(&signal).cloned().unwrap_or_default();
            let mut delivered = 0;
            for prio in subscribers {
                match s.enqueue(&self.tracer, prio, ev, false) {
                    Ok(()) => delivered += 1,
                    // Terminated subscribers linger only until detach.
                    Err(Error::NotRegistered) => {}
                    Err(err) => return Err(err),
                }
            }
            self.tracer.emit(Record::Fwk(FwkRecord::Published {
                signal,
                subscribers: delivered,
            }));
            Ok(delivered)
        })
    }

    // ---- deferral --------------------------------------------------------

    /// Park `ev` on `queue` until a later [`Framework::recall`]. The queue
    /// takes its own reference.
    pub fn defer(&self, queue: &DeferQueue, ev: EventRef) -> CoreResult<()> {
        self.state.with(|s| {
            let signal = s.pools.signal_of(ev)?;
            s.pools.retain(ev)?;
            if !queue.push(ev) {
                s.release(&self.tracer, ev)?;
                return Err(Error::QueueFull);
            }
            self.tracer
                .emit(Record::Fwk(FwkRecord::Deferred { signal }));
            Ok(())
        })
    }

    /// Move the oldest deferred event to the target's queue, LIFO so it is
    /// handled before anything posted since. Returns whether an event was
    /// recalled.
    pub fn recall(&self, target: Priority, queue: &DeferQueue) -> CoreResult<bool> {
        self.state.with(|s| {
            let Some(ev) = queue.pop() else {
                return Ok(false);
            };
            let signal = s.pools.signal_of(ev)?;
            if let Err(err) = s.enqueue(&self.tracer, target, ev, true) {
                queue.push_front(ev);
                return Err(err);
            }
            // The target queue now holds its own reference.
            s.release(&self.tracer, ev)?;
            self.tracer
                .emit(Record::Fwk(FwkRecord::Recalled { signal, target }));
            Ok(true)
        })
    }

    // ---- timers ----------------------------------------------------------

    /// Arm `timer` to expire after `nticks` ticks; `period > 0` re-arms it
    /// every `period` ticks after that.
    pub fn timer_start(&self, timer: &Timer, nticks: u32, period: u32) -> Result<(), TimerError> {
        if nticks == 0 {
            return Err(TimerError::ZeroTicks);
        }
        self.state.with(|s| s.timers.start(timer, nticks, period));
        self.tracer.emit(Record::Timer(TimerRecord::Started {
            signal: timer.signal(),
            target: timer.target(),
            ticks: nticks,
            period,
        }));
        Ok(())
    }

    /// Disarm `timer`; safe to call from any context, including the target
    /// object's own handler. Returns whether the timer was armed.
    pub fn timer_stop(&self, timer: &Timer) -> bool {
        let was_active = self.state.with(|s| s.timers.stop(timer));
        self.tracer.emit(Record::Timer(TimerRecord::Stopped {
            signal: timer.signal(),
            target: timer.target(),
            was_active,
        }));
        was_active
    }

    /// Advance the timing wheel by one tick and post expiry events.
    ///
    /// Expiry events are static events carrying the timer's signal, posted
    /// through the normal FIFO path in arming order.
    pub fn tick(&self) -> Result<(), TimerError> {
        self.state.with(|s| {
            self.tracer.emit(Record::Fwk(FwkRecord::Tick));
            let expired = s.timers.tick();
            let mut first_err = None;
            for (signal, target) in expired {
                self.tracer
                    .emit(Record::Timer(TimerRecord::Expired { signal, target }));
                let posted = s.enqueue(&self.tracer, target, EventRef::Static(signal), false);
                if let Err(cause) = posted {
                    first_err.get_or_insert(TimerError::Post { target, cause });
                }
            }
            match first_err {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    /// Number of timers currently armed.
    pub fn armed_timers(&self) -> usize {
        self.state.with(|s| s.timers.armed_count())
    }

    // ---- kernel-side interface -------------------------------------------

    pub(crate) fn attach_queue(&self, prio: Priority, capacity: usize) -> CoreResult<()> {
        self.state.with(|s| {
            let slot = s
                .queues
                .get_mut(prio.index())
                .ok_or(Error::InvalidPriority)?;
            if slot.is_some() {
                return Err(Error::PriorityInUse);
            }
            *slot = Some(EventQueue::new(capacity));
            Ok(())
        })
    }

    /// Remove the queue at `prio`, dropping one reference per flushed event
    /// and all of the object's subscriptions.
    pub(crate) fn detach_queue(&self, prio: Priority) -> CoreResult<()> {
        self.state.with(|s| {
            let Some(mut queue) = s
                .queues
                .get_mut(prio.index())
                .ok_or(Error::InvalidPriority)?
                .take()
            else {
                return Err(Error::NotRegistered);
            };
            let flushed: Vec<EventRef> = queue.drain().collect();
            for ev in flushed {
                s.release(&self.tracer, ev)?;
            }
            s.ready.clear(prio);
            for subs in s.subs.values_mut() {
                subs.retain(|p| *p != prio);
            }
            Ok(())
        })
    }

    /// Dequeue the next event for the highest-priority ready object, with a
    /// dispatch snapshot taken under the same critical section.
    pub(crate) fn take_next(&self) -> CoreResult<Option<(Priority, EventRef, Event)>> {
        self.state.with(|s| {
            let Some(prio) = s.ready.highest() else {
                return Ok(None);
            };
            let Some(queue) = s.queues.get_mut(prio.index()).and_then(Option::as_mut) else {
                return Err(Error::NotRegistered);
            };
            let Some(ev) = queue.get() else {
                s.ready.clear(prio);
                return Ok(None);
            };
            let depth = queue.len();
            if depth == 0 {
                s.ready.clear(prio);
            }
            let snapshot = s.pools.snapshot(ev)?;
            self.tracer.emit(Record::Queue(QueueRecord::Get {
                target: prio,
                signal: snapshot.signal(),
                depth,
            }));
            Ok(Some((prio, ev, snapshot)))
        })
    }

    /// Pending events for the object at `prio`.
    pub fn queue_depth(&self, prio: Priority) -> CoreResult<usize> {
        self.state.with(|s| {
            s.queues
                .get(prio.index())
                .and_then(Option::as_ref)
                .map(EventQueue::len)
                .ok_or(Error::NotRegistered)
        })
    }

    /// Peak occupancy of the queue at `prio`.
    pub fn queue_high_water(&self, prio: Priority) -> CoreResult<usize> {
        self.state.with(|s| {
            s.queues
                .get(prio.index())
                .and_then(Option::as_ref)
                .map(EventQueue::high_water)
                .ok_or(Error::NotRegistered)
        })
    }
}
