//! Structural event types.

use serde::Serialize;

/// The five structural event kinds the detector can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralEventKind {
    /// Basin count dropped by at least one.
    BasinMerge,
    /// Basin count rose by at least one.
    BasinSplit,
    /// Global curvature exceeded 1.5x its rolling window maximum.
    CurvatureSpike,
    /// Tension variance changed by more than 40% within a short window.
    VarianceInstability,
    /// Simultaneous high variance and a non-trivial variance delta.
    PhaseTransition,
}

/// A `(x, y)` cell coordinate, used for event locations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// A detected structural event, not yet assigned a log id.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingEvent {
    /// Which kind of event this is.
    pub kind: StructuralEventKind,
    /// Human-readable description, e.g. quoting pre/post basin counts.
    pub description: String,
    /// Optional cell location the event is centred on.
    pub location: Option<Location>,
}

impl PendingEvent {
    /// Construct a pending event with no location.
    pub fn new(kind: StructuralEventKind, description: impl Into<String>) -> Self {
        PendingEvent {
            kind,
            description: description.into(),
            location: None,
        }
    }
}

/// A structural event recorded in the [`crate::log::EventLog`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructuralEvent {
    /// Monotonic id, unique within one engine instance.
    pub id: u64,
    /// The step at which this event was detected.
    pub step: u64,
    /// Which kind of event this is.
    pub kind: StructuralEventKind,
    /// Human-readable description.
    pub description: String,
    /// Optional cell location the event is centred on.
    pub location: Option<Location>,
}
