#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # reakt-sm
//!
//! Hierarchical state-machine engine with UML-style semantics: entry/exit
//! chains, guarded transitions, choice/junction pseudostates, shallow and
//! deep history, and run-to-completion dispatch.
//!
//! State graphs are immutable `&'static` descriptor trees, generic over the
//! application's context type. The [`Machine`] instance carries only the
//! mutable part: the current state and the history slots.

pub mod machine;
pub mod state;

pub use machine::{Machine, MachineDef};
pub use state::{
    Branch, Choice, Guard, History, HistoryKind, Junction, State, StateAction, StateKind, Target,
    Trans, TransAction, Vertex,
};

#[cfg(test)]
mod tests;

/// Maximum nesting depth of the state hierarchy.
pub const MAX_STATE_DEPTH: usize = 8;

/// Maximum pseudostate segments a single compound transition may traverse.
pub const MAX_TRANS_SEGMENTS: usize = 8;

/// History slots available per machine instance.
pub const MAX_HISTORY_SLOTS: usize = 4;
