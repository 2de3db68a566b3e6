//! Per-step telemetry retained only for the most recent step.

/// Diagnostics produced by every successful step, logged at
/// `tracing::debug!` and retained on [`crate::driver::Driver`] for the most
/// recent step only (not archived in history).
#[derive(Clone, Debug, PartialEq)]
pub struct StepDiagnostics {
    /// Wall-clock time spent computing this step, in microseconds.
    pub step_us: u64,
    /// Whether one or more cells went non-finite and were reset to zero.
    pub unstable: bool,
    /// Names of parameters clamped by `set_params` calls since the
    /// previous step.
    pub clamped_params: Vec<String>,
    /// Mean absolute per-cell contribution of each weighted operator,
    /// `[curvature, tension, coupling, attractor, redistribution]`.
    pub operator_contribution_means: [f32; 5],
}
