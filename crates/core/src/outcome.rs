//! Processing outcomes of a run-to-completion step.

use core::fmt;

/// Result of initializing a state machine or dispatching one event.
///
/// `NotFound` and `GuardFalse` are normal results of event processing; the
/// last four variants indicate defects in the application's state model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Top-level initial transition completed.
    Initialized,
    /// An enabled transition (or internal transition) ran to completion.
    Processed,
    /// No transition in the hierarchy is triggered by the event's signal.
    NotFound,
    /// Triggers matched but every candidate guard evaluated false.
    GuardFalse,
    /// A choice pseudostate had no true branch and no default branch.
    CndNotFound,
    /// The machine was dispatched before its initial transition.
    UnknownState,
    /// A transition path exceeded the maximum nesting depth.
    ExHierarchyLevel,
    /// Pseudostate traversal exceeded the segment limit.
    ExTransitionSegments,
}

impl Outcome {
    /// Whether this outcome reports a defect in the state model.
    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Outcome::CndNotFound
                | Outcome::UnknownState
                | Outcome::ExHierarchyLevel
                | Outcome::ExTransitionSegments
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::Initialized => "initialized",
            Outcome::Processed => "processed",
            Outcome::NotFound => "event not found",
            Outcome::GuardFalse => "guard false",
            Outcome::CndNotFound => "condition not found",
            Outcome::UnknownState => "unknown state",
            Outcome::ExHierarchyLevel => "exceeded hierarchy level",
            Outcome::ExTransitionSegments => "exceeded transition segments",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Outcome {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Outcome::Initialized => defmt::write!(fmt, "Initialized"),
            Outcome::Processed => defmt::write!(fmt, "Processed"),
            Outcome::NotFound => defmt::write!(fmt, "NotFound"),
            Outcome::GuardFalse => defmt::write!(fmt, "GuardFalse"),
            Outcome::CndNotFound => defmt::write!(fmt, "CndNotFound"),
            Outcome::UnknownState => defmt::write!(fmt, "UnknownState"),
            Outcome::ExHierarchyLevel => defmt::write!(fmt, "ExHierarchyLevel"),
            Outcome::ExTransitionSegments => defmt::write!(fmt, "ExTransitionSegments"),
        }
    }
}
