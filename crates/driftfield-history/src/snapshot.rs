//! A single recorded frame.

use driftfield_core::{Field, Parameters};
use driftfield_events::StructuralEventKind;
use driftfield_metrics::Signature;

/// One step's worth of recorded state, as stored in [`crate::ring::History`].
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    /// The step this snapshot was recorded at.
    pub step: u64,
    /// The field as it stood at this step.
    pub grid: Field,
    /// The parameter set in force when this step was computed.
    pub params: Parameters,
    /// This step's computed signature.
    pub signature: Signature,
    /// The first structural event kind detected at this step, if any.
    pub event_marker: Option<StructuralEventKind>,
    /// Set when this step produced one or more non-finite cells that were
    /// reset to zero.
    pub unstable: bool,
}
