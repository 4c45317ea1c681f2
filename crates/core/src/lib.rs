#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # reakt-core
//!
//! Core types, traits, and abstractions for the reakt reactive framework.
//! This crate provides the vocabulary shared by the state-machine engine,
//! the event pool manager, the trace layer, and the cooperative kernel.

use core::fmt;

pub mod events;
pub mod outcome;
pub mod priorities;
pub mod sync;

pub use events::*;
pub use outcome::*;
pub use priorities::*;

/// Framework version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the framework.
pub type CoreResult<T> = Result<T, Error>;

/// Error types for framework operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Event queue is full
    QueueFull,
    /// Event queue is empty
    QueueEmpty,
    /// Priority out of the valid range
    InvalidPriority,
    /// Another active object already holds this priority
    PriorityInUse,
    /// No active object registered at the target priority
    NotRegistered,
    /// Event pool exhausted
    OutOfMemory,
    /// Payload does not fit any pool block or snapshot buffer
    InvalidSize,
    /// Pool registry full or pools not registered in ascending block size
    PoolRegistry,
    /// Event reference does not name a live pool block
    InvalidEvent,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::QueueFull => write!(f, "event queue is full"),
            Error::QueueEmpty => write!(f, "event queue is empty"),
            Error::InvalidPriority => write!(f, "priority out of the valid range"),
            Error::PriorityInUse => write!(f, "priority already in use"),
            Error::NotRegistered => write!(f, "no active object at target priority"),
            Error::OutOfMemory => write!(f, "event pool exhausted"),
            Error::InvalidSize => write!(f, "payload too large"),
            Error::PoolRegistry => write!(f, "pool registry full or out of order"),
            Error::InvalidEvent => write!(f, "event reference is not a live pool block"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::QueueFull => defmt::write!(fmt, "QueueFull"),
            Error::QueueEmpty => defmt::write!(fmt, "QueueEmpty"),
            Error::InvalidPriority => defmt::write!(fmt, "InvalidPriority"),
            Error::PriorityInUse => defmt::write!(fmt, "PriorityInUse"),
            Error::NotRegistered => defmt::write!(fmt, "NotRegistered"),
            Error::OutOfMemory => defmt::write!(fmt, "OutOfMemory"),
            Error::InvalidSize => defmt::write!(fmt, "InvalidSize"),
            Error::PoolRegistry => defmt::write!(fmt, "PoolRegistry"),
            Error::InvalidEvent => defmt::write!(fmt, "InvalidEvent"),
        }
    }
}
