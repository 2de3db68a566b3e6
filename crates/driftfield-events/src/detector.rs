//! Consumes successive [`Signature`]s and emits [`PendingEvent`]s.

use std::collections::VecDeque;

use driftfield_metrics::Signature;

use crate::event::{PendingEvent, StructuralEventKind};

/// Rolling window used to track `globalCurvature`'s recent maximum.
const CURVATURE_WINDOW: usize = 60;
/// Window, in steps, over which variance-instability is evaluated.
const VARIANCE_WINDOW: usize = 12;
/// Relative variance change threshold for `variance_instability`.
const VARIANCE_RELATIVE_THRESHOLD: f32 = 0.4;
/// Absolute variance floor above which `phase_transition` can fire.
const PHASE_TRANSITION_VARIANCE_THRESHOLD: f32 = 0.25;
/// Minimum one-step variance delta considered "non-trivial" for
/// `phase_transition`.
const PHASE_TRANSITION_DELTA_THRESHOLD: f32 = 0.02;
/// Multiplier applied to the rolling curvature maximum for `curvature_spike`.
const CURVATURE_SPIKE_MULTIPLIER: f32 = 1.5;

/// Stateful detector for the five structural event kinds of `SPEC_FULL.md` §4.5.
#[derive(Clone, Debug, Default)]
pub struct EventDetector {
    prev: Option<Signature>,
    curvature_history: VecDeque<f32>,
    variance_history: VecDeque<f32>,
}

impl EventDetector {
    /// A fresh detector with empty history.
    pub fn new() -> Self {
        EventDetector::default()
    }

    /// Observe the signature computed for the current step and return any
    /// events it triggers, comparing against the previously observed
    /// signature and rolling windows.
    pub fn observe(&mut self, signature: Signature) -> Vec<PendingEvent> {
        let mut out = Vec::new();

        if let Some(prev) = self.prev {
            let delta_basins = signature.basin_count as i64 - prev.basin_count as i64;
            if delta_basins <= -1 {
                out.push(PendingEvent::new(
                    StructuralEventKind::BasinMerge,
                    format!(
                        "basin count dropped from {} to {}",
                        prev.basin_count, signature.basin_count
                    ),
                ));
            } else if delta_basins >= 1 {
                out.push(PendingEvent::new(
                    StructuralEventKind::BasinSplit,
                    format!(
                        "basin count rose from {} to {}",
                        prev.basin_count, signature.basin_count
                    ),
                ));
            }

            let delta_variance = signature.tension_variance - prev.tension_variance;
            if signature.tension_variance > PHASE_TRANSITION_VARIANCE_THRESHOLD
                && delta_variance.abs() > PHASE_TRANSITION_DELTA_THRESHOLD
            {
                out.push(PendingEvent::new(
                    StructuralEventKind::PhaseTransition,
                    format!(
                        "tension variance {:.3} with delta {:.3}",
                        signature.tension_variance, delta_variance
                    ),
                ));
            }
        }

        if let Some(&rolling_max) = self
            .curvature_history
            .iter()
            .max_by(|a, b| a.partial_cmp(b).unwrap())
        {
            if signature.global_curvature > CURVATURE_SPIKE_MULTIPLIER * rolling_max {
                out.push(PendingEvent::new(
                    StructuralEventKind::CurvatureSpike,
                    format!(
                        "global curvature {:.3} exceeds 1.5x rolling max {:.3}",
                        signature.global_curvature, rolling_max
                    ),
                ));
            }
        }

        if self.variance_history.iter().any(|&old| {
            let denom = old.abs().max(1e-6);
            ((signature.tension_variance - old) / denom).abs() > VARIANCE_RELATIVE_THRESHOLD
        }) {
            out.push(PendingEvent::new(
                StructuralEventKind::VarianceInstability,
                format!(
                    "tension variance {:.3} shifted by more than {:.0}% within {} steps",
                    signature.tension_variance,
                    VARIANCE_RELATIVE_THRESHOLD * 100.0,
                    VARIANCE_WINDOW
                ),
            ));
        }

        self.push_history(signature);
        self.prev = Some(signature);
        out
    }

    fn push_history(&mut self, signature: Signature) {
        if self.curvature_history.len() == CURVATURE_WINDOW {
            self.curvature_history.pop_front();
        }
        self.curvature_history.push_back(signature.global_curvature);

        if self.variance_history.len() == VARIANCE_WINDOW {
            self.variance_history.pop_front();
        }
        self.variance_history.push_back(signature.tension_variance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(basin_count: usize, curvature: f32, variance: f32) -> Signature {
        Signature {
            basin_count,
            avg_basin_depth: 0.5,
            global_curvature: curvature,
            tension_variance: variance,
            stability_metric: 0.9,
            coherence: 0.7,
        }
    }

    #[test]
    fn basin_drop_emits_merge_event() {
        let mut d = EventDetector::new();
        d.observe(sig(5, 0.1, 0.05));
        let events = d.observe(sig(3, 0.1, 0.05));
        assert!(events
            .iter()
            .any(|e| e.kind == StructuralEventKind::BasinMerge));
    }

    #[test]
    fn basin_rise_emits_split_event() {
        let mut d = EventDetector::new();
        d.observe(sig(3, 0.1, 0.05));
        let events = d.observe(sig(5, 0.1, 0.05));
        assert!(events
            .iter()
            .any(|e| e.kind == StructuralEventKind::BasinSplit));
    }

    #[test]
    fn curvature_spike_detected_after_quiet_baseline() {
        let mut d = EventDetector::new();
        for _ in 0..10 {
            d.observe(sig(1, 0.1, 0.05));
        }
        let events = d.observe(sig(1, 1.0, 0.05));
        assert!(events
            .iter()
            .any(|e| e.kind == StructuralEventKind::CurvatureSpike));
    }

    #[test]
    fn sudden_variance_jump_triggers_instability() {
        let mut d = EventDetector::new();
        for _ in 0..5 {
            d.observe(sig(1, 0.1, 0.1));
        }
        let events = d.observe(sig(1, 0.1, 0.9));
        assert!(events
            .iter()
            .any(|e| e.kind == StructuralEventKind::VarianceInstability));
    }

    #[test]
    fn high_variance_with_delta_triggers_phase_transition() {
        let mut d = EventDetector::new();
        d.observe(sig(1, 0.1, 0.05));
        let events = d.observe(sig(1, 0.1, 0.5));
        assert!(events
            .iter()
            .any(|e| e.kind == StructuralEventKind::PhaseTransition));
    }

    #[test]
    fn stable_quiet_signatures_emit_nothing() {
        let mut d = EventDetector::new();
        let mut total = 0;
        for _ in 0..20 {
            total += d.observe(sig(4, 0.1, 0.05)).len();
        }
        assert_eq!(total, 0);
    }
}
