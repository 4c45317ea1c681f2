#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # reakt-mem
//!
//! Fixed-block event pools and the dynamic-event lifecycle.
//!
//! Dynamic events are allocated from size-ordered block pools, reference
//! counted while queues and the dispatcher hold them, and returned to their
//! origin pool when the last holder lets go. Static events bypass all of it.

extern crate alloc;

pub mod manager;
pub mod pool;

pub use manager::{PoolManager, Release, MAX_EVENT_POOLS};
pub use pool::BlockPool;
