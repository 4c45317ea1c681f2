#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # reakt-trc
//!
//! Structured observation hooks for the reakt framework.
//!
//! Every significant step inside the kernel, queues, pools, timers, and the
//! state-machine engine emits a typed [`Record`] through a shared [`Tracer`].
//! Records are filterable by group, by active-object priority, and by event
//! signal; a backend consumes them through a plain callback, so the on-wire
//! representation stays outside the framework.

extern crate alloc;

pub mod filter;
pub mod log;
pub mod record;
pub mod tracer;

pub use filter::Filter;
pub use log::RecordLog;
pub use record::{AoRecord, FwkRecord, Group, PoolRecord, QueueRecord, Record, SmRecord, TimerRecord};
pub use tracer::{Hook, Tracer};
