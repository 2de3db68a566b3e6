//! Strongly-typed identifiers used throughout the engine.

use std::fmt;

/// Monotonically increasing step counter.
///
/// Wraps a `u64`; the engine never decrements it. Each successful
/// [`crate::Stepper`](crate) invocation advances it by one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step#{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        StepId(v)
    }
}

impl StepId {
    /// The next step id in sequence.
    pub fn next(self) -> StepId {
        StepId(self.0 + 1)
    }
}

/// Identifier for a [`crate::events::StructuralEvent`](crate), monotonic within one engine instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

impl From<u64> for EventId {
    fn from(v: u64) -> Self {
        EventId(v)
    }
}

/// Generation counter bumped every time [`crate::Parameters`](crate) change.
///
/// Used to invalidate derived-field and basin-map caches without comparing
/// full parameter structs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParamGeneration(pub u64);

impl fmt::Display for ParamGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

impl ParamGeneration {
    /// The next generation in sequence.
    pub fn next(self) -> ParamGeneration {
        ParamGeneration(self.0 + 1)
    }
}
