//! JSON/text export surface: configuration snapshots, event logs, and
//! batch-reproduction specs.

use serde::Serialize;

use driftfield_core::{Mode, Parameters};
use driftfield_metrics::{Signature, TrendMetrics};

/// Minimum fraction of a trend window's frames that must be unstable before
/// [`classify_regime`] reports `"Critical"`.
const CRITICAL_UNSTABLE_FRACTION: f32 = 0.5;
/// Minimum basin-merge rate before a window is considered `"Reconfiguring"`.
const RECONFIGURING_MERGE_RATE: f32 = 0.3;
/// Minimum `|curvature slope|` before a stable-looking window is still
/// called `"Drifting"` rather than `"Settling"`.
const DRIFTING_CURVATURE_SLOPE: f32 = 0.01;

/// A qualitative label over [`Signature`] and [`TrendMetrics`], matching the
/// original system's regime badge. A thin classifier over the core's
/// outputs, not part of the deterministic simulation itself.
pub fn classify_regime(signature: &Signature, trend: &TrendMetrics) -> String {
    let window_frames = trend.stable_frames + trend.borderline_frames + trend.unstable_frames;
    let unstable_fraction = if window_frames == 0 {
        0.0
    } else {
        trend.unstable_frames as f32 / window_frames as f32
    };

    if unstable_fraction > CRITICAL_UNSTABLE_FRACTION {
        "Critical".to_string()
    } else if trend.basin_merge_rate > RECONFIGURING_MERGE_RATE {
        "Reconfiguring".to_string()
    } else if signature.stability_metric > 0.8 {
        if trend.trend_curvature_slope.abs() > DRIFTING_CURVATURE_SLOPE {
            "Drifting".to_string()
        } else {
            "Stable".to_string()
        }
    } else {
        "Settling".to_string()
    }
}

/// Exportable configuration snapshot, serialised as JSON with keys
/// `parameters`, `regime`, `colormap`, `mode`, `version`, `timestamp`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigExport {
    /// The current parameter set.
    pub parameters: Parameters,
    /// A qualitative label from [`classify_regime`].
    pub regime: String,
    /// Name of the active colour map (a rendering hint; opaque to the core).
    pub colormap: String,
    /// The current update flavour.
    pub mode: Mode,
    /// Crate version this export was produced with.
    pub version: String,
    /// Caller-supplied timestamp (the core never reads the wall clock).
    pub timestamp: u64,
}

/// Exportable specification sufficient to reproduce a run bit-identically,
/// serialised as JSON with keys `params`, `steps`, `seed`, `gridSize`,
/// `timestamp`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSpec {
    /// The parameter set the run was started with.
    pub params: Parameters,
    /// Number of steps the batch covers.
    pub steps: u64,
    /// Seed the batch's PRNG was initialised from.
    pub seed: u32,
    /// Grid edge length, duplicated from `params` for convenient lookup.
    pub grid_size: u32,
    /// Caller-supplied timestamp.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(stability_metric: f32) -> Signature {
        Signature {
            basin_count: 1,
            avg_basin_depth: 0.5,
            global_curvature: 0.1,
            tension_variance: 0.05,
            stability_metric,
            coherence: 0.6,
        }
    }

    #[test]
    fn mostly_unstable_window_is_critical() {
        let trend = TrendMetrics {
            unstable_frames: 40,
            stable_frames: 10,
            borderline_frames: 10,
            ..TrendMetrics::default()
        };
        assert_eq!(classify_regime(&sig(0.3), &trend), "Critical");
    }

    #[test]
    fn high_merge_rate_is_reconfiguring() {
        let trend = TrendMetrics {
            stable_frames: 60,
            basin_merge_rate: 0.5,
            ..TrendMetrics::default()
        };
        assert_eq!(classify_regime(&sig(0.9), &trend), "Reconfiguring");
    }

    #[test]
    fn calm_stable_window_is_stable() {
        let trend = TrendMetrics {
            stable_frames: 60,
            trend_curvature_slope: 0.0001,
            ..TrendMetrics::default()
        };
        assert_eq!(classify_regime(&sig(0.95), &trend), "Stable");
    }

    #[test]
    fn stable_but_shifting_curvature_is_drifting() {
        let trend = TrendMetrics {
            stable_frames: 60,
            trend_curvature_slope: 0.5,
            ..TrendMetrics::default()
        };
        assert_eq!(classify_regime(&sig(0.95), &trend), "Drifting");
    }

    #[test]
    fn config_export_serialises_to_expected_keys() {
        let export = ConfigExport {
            parameters: Parameters::default(),
            regime: "Stable".to_string(),
            colormap: "viridis".to_string(),
            mode: Mode::Standard,
            version: "0.1.0".to_string(),
            timestamp: 12345,
        };
        let json = serde_json::to_value(&export).unwrap();
        for key in ["parameters", "regime", "colormap", "mode", "version", "timestamp"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn batch_spec_serialises_to_expected_keys() {
        let spec = BatchSpec {
            params: Parameters::default(),
            steps: 100,
            seed: 42,
            grid_size: 300,
            timestamp: 1,
        };
        let json = serde_json::to_value(&spec).unwrap();
        for key in ["params", "steps", "seed", "gridSize", "timestamp"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }
}
