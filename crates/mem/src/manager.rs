//! The size-ordered pool registry and the dynamic-event lifecycle.

use alloc::vec::Vec;

use reakt_core::{CoreResult, Error, Event, EventRef, Signal, MAX_EVENT_PAYLOAD};

use crate::pool::BlockPool;

/// Upper bound on registered pools.
pub const MAX_EVENT_POOLS: usize = 4;

/// What happened to an event on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Static event; nothing to do.
    Static,
    /// Reference count dropped; other holders remain.
    Released { refs: u8 },
    /// Last reference dropped; block returned to its origin pool.
    Recycled { pool: u8 },
}

/// Registry of block pools, ordered by ascending block size.
///
/// Pool ids are 1-based; id 0 is reserved as the static tag in the event
/// data model.
pub struct PoolManager {
    pools: Vec<BlockPool>,
}

impl PoolManager {
    pub fn new() -> Self {
        Self { pools: Vec::new() }
    }

    /// Append a pool of `nblocks` blocks of `block_size` bytes.
    ///
    /// Pools must be registered smallest first; the allocator relies on the
    /// ordering for its smallest-fit scan.
    pub fn register(&mut self, block_size: usize, nblocks: usize) -> CoreResult<u8> {
        if self.pools.len() >= MAX_EVENT_POOLS {
            return Err(Error::PoolRegistry);
        }
        if block_size == 0 || block_size > MAX_EVENT_PAYLOAD || nblocks == 0 {
            return Err(Error::InvalidSize);
        }
        if let Some(last) = self.pools.last() {
            if block_size <= last.block_size() {
                return Err(Error::PoolRegistry);
            }
        }
        self.pools.push(BlockPool::new(block_size, nblocks));
        Ok(self.pools.len() as u8)
    }

    /// Allocate a dynamic event carrying a copy of `payload`.
    ///
    /// The smallest pool whose block size fits the payload is the only
    /// candidate: when it is exhausted the call fails rather than spilling
    /// into a larger size class, keeping fragmentation bounded.
    pub fn new_event(&mut self, signal: Signal, payload: &[u8]) -> CoreResult<EventRef> {
        let (pool_idx, pool) = self
            .pools
            .iter_mut()
            .enumerate()
            .find(|(_, p)| p.block_size() >= payload.len())
            .ok_or(Error::OutOfMemory)?;
        let slot_idx = pool.take().ok_or(Error::OutOfMemory)?;
        let slot = pool
            .slot_mut(slot_idx)
            .ok_or(Error::InvalidEvent)?;
        slot.signal = signal;
        slot.ref_count = 1;
        slot.len = payload.len() as u8;
        slot.payload[..payload.len()].copy_from_slice(payload);
        Ok(EventRef::Dynamic {
            pool: (pool_idx + 1) as u8,
            slot: slot_idx,
        })
    }

    /// Add one reference to a dynamic event (a queue slot about to hold it).
    pub fn retain(&mut self, ev: EventRef) -> CoreResult<()> {
        match ev {
            EventRef::Static(_) => Ok(()),
            EventRef::Dynamic { pool, slot } => {
                let slot = self.live_slot_mut(pool, slot)?;
                slot.ref_count += 1;
                Ok(())
            }
        }
    }

    /// Drop one reference; recycle the block when the count reaches zero.
    pub fn release(&mut self, ev: EventRef) -> CoreResult<Release> {
        match ev {
            EventRef::Static(_) => Ok(Release::Static),
            EventRef::Dynamic { pool, slot } => {
                let s = self.live_slot_mut(pool, slot)?;
                s.ref_count -= 1;
                if s.ref_count > 0 {
                    Ok(Release::Released { refs: s.ref_count })
                } else {
                    self.pools[(pool - 1) as usize].put(slot);
                    Ok(Release::Recycled { pool })
                }
            }
        }
    }

    /// Copy out the signal and payload for dispatch.
    pub fn snapshot(&self, ev: EventRef) -> CoreResult<Event> {
        match ev {
            EventRef::Static(signal) => Ok(Event::new(signal)),
            EventRef::Dynamic { pool, slot } => {
                let s = self
                    .pool(pool)?
                    .slot(slot)
                    .filter(|s| s.in_use)
                    .ok_or(Error::InvalidEvent)?;
                Event::with_payload(s.signal, &s.payload[..s.len as usize])
            }
        }
    }

    /// Signal of an event without building a full snapshot.
    pub fn signal_of(&self, ev: EventRef) -> CoreResult<Signal> {
        match ev {
            EventRef::Static(signal) => Ok(signal),
            EventRef::Dynamic { pool, slot } => self
                .pool(pool)?
                .slot(slot)
                .filter(|s| s.in_use)
                .map(|s| s.signal)
                .ok_or(Error::InvalidEvent),
        }
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn block_size(&self, id: u8) -> CoreResult<usize> {
        Ok(self.pool(id)?.block_size())
    }

    pub fn total_blocks(&self, id: u8) -> CoreResult<usize> {
        Ok(self.pool(id)?.total_blocks())
    }

    pub fn free_blocks(&self, id: u8) -> CoreResult<usize> {
        Ok(self.pool(id)?.free_blocks())
    }

    pub fn used_blocks(&self, id: u8) -> CoreResult<usize> {
        Ok(self.pool(id)?.used_blocks())
    }

    pub fn min_free_blocks(&self, id: u8) -> CoreResult<usize> {
        Ok(self.pool(id)?.min_free_blocks())
    }

    fn pool(&self, id: u8) -> CoreResult<&BlockPool> {
        if id == 0 {
            return Err(Error::InvalidEvent);
        }
        self.pools
            .get((id - 1) as usize)
            .ok_or(Error::InvalidEvent)
    }

    fn live_slot_mut(&mut self, id: u8, slot: u16) -> CoreResult<&mut crate::pool::Slot> {
        if id == 0 {
            return Err(Error::InvalidEvent);
        }
        self.pools
            .get_mut((id - 1) as usize)
            .and_then(|p| p.slot_mut(slot))
            .filter(|s| s.in_use)
            .ok_or(Error::InvalidEvent)
    }
}

impl Default for PoolManager {
    fn default() -> Self {
        Self::new()
    }
}
