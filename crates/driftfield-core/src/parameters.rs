//! Simulation parameters, their valid ranges, and named presets.

use std::fmt;

use serde::Serialize;

/// Qualitative update flavour. Selects a [`ModeProfile`] applied to the
/// operator weights before the operator bank runs each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No scaling; the operator bank runs with the configured weights as-is.
    #[default]
    Standard,
    /// Boosts curvature and coupling, emphasising angular symmetry.
    Quasicrystal,
    /// Raises edge-of-stability sensitivity.
    Criticality,
    /// Boosts curvature relative to redistribution, encouraging cascades.
    Fractal,
    /// Boosts the attractor pull and damps tension, favouring standing structures.
    Soliton,
    /// Boosts coupling and redistribution together, favouring filaments.
    CosmicWeb,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Standard => "standard",
            Mode::Quasicrystal => "quasicrystal",
            Mode::Criticality => "criticality",
            Mode::Fractal => "fractal",
            Mode::Soliton => "soliton",
            Mode::CosmicWeb => "cosmicweb",
        };
        f.write_str(s)
    }
}

/// Per-mode scaling applied to curvature gain and the five operator weights
/// `[wK, wT, wC, wA, wR]` before a step's operator bank runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeProfile {
    /// Multiplier applied to `curvature_gain`.
    pub gain_scale: f32,
    /// Multiplicative bias applied to `[wK, wT, wC, wA, wR]`.
    pub weight_bias: [f32; 5],
}

impl Mode {
    /// Resolve this mode's scaling profile.
    pub fn profile(self) -> ModeProfile {
        match self {
            Mode::Standard => ModeProfile {
                gain_scale: 1.0,
                weight_bias: [1.0, 1.0, 1.0, 1.0, 1.0],
            },
            Mode::Quasicrystal => ModeProfile {
                gain_scale: 1.35,
                weight_bias: [1.4, 1.0, 1.3, 1.0, 1.0],
            },
            Mode::Criticality => ModeProfile {
                gain_scale: 1.0,
                weight_bias: [1.0, 1.5, 1.0, 1.2, 1.0],
            },
            Mode::Fractal => ModeProfile {
                gain_scale: 1.2,
                weight_bias: [1.5, 1.0, 1.0, 1.0, 0.6],
            },
            Mode::Soliton => ModeProfile {
                gain_scale: 1.0,
                weight_bias: [1.0, 0.6, 1.0, 1.5, 1.0],
            },
            Mode::CosmicWeb => ModeProfile {
                gain_scale: 1.0,
                weight_bias: [1.0, 1.0, 1.5, 1.0, 1.4],
            },
        }
    }
}

/// A clamped numeric parameter range, `[min, max]` inclusive.
#[derive(Clone, Copy, Debug)]
pub struct Range {
    /// Lower bound, inclusive.
    pub min: f32,
    /// Upper bound, inclusive.
    pub max: f32,
}

impl Range {
    /// Clamp `v` into this range.
    pub fn clamp(self, v: f32) -> f32 {
        v.clamp(self.min, self.max)
    }
}

/// Valid ranges for every clamped scalar parameter.
pub mod ranges {
    use super::Range;

    /// `dt` valid range.
    pub const DT: Range = Range { min: 0.01, max: 0.2 };
    /// `curvature_gain` valid range.
    pub const CURVATURE_GAIN: Range = Range { min: 0.1, max: 10.0 };
    /// `coupling_radius` valid range.
    pub const COUPLING_RADIUS: Range = Range { min: 0.5, max: 5.0 };
    /// `coupling_weight` valid range.
    pub const COUPLING_WEIGHT: Range = Range { min: 0.0, max: 1.0 };
    /// `attractor_strength` valid range.
    pub const ATTRACTOR_STRENGTH: Range = Range { min: 0.1, max: 10.0 };
    /// `redistribution_rate` valid range.
    pub const REDISTRIBUTION_RATE: Range = Range { min: 0.0, max: 1.0 };
    /// Operator weight (`wK`..`wR`) valid range.
    pub const OPERATOR_WEIGHT: Range = Range { min: 0.0, max: 5.0 };
}

/// The full set of simulation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// Grid edge length, `[50, 500]`.
    pub grid_size: u32,
    /// Timestep, `[0.01, 0.2]`.
    pub dt: f32,
    /// Curvature operator gain, `[0.1, 10]`.
    pub curvature_gain: f32,
    /// Coupling Gaussian-blur radius (sigma), `[0.5, 5]`.
    pub coupling_radius: f32,
    /// Blend weight between blurred and local value, `[0, 1]`.
    pub coupling_weight: f32,
    /// Attractor pull strength, `[0.1, 10]`.
    pub attractor_strength: f32,
    /// Global mean redistribution rate, `[0, 1]`.
    pub redistribution_rate: f32,
    /// Curvature operator weight.
    pub w_k: f32,
    /// Tension operator weight.
    pub w_t: f32,
    /// Coupling operator weight.
    pub w_c: f32,
    /// Attractor operator weight.
    pub w_a: f32,
    /// Redistribution operator weight.
    pub w_r: f32,
    /// Update flavour.
    pub mode: Mode,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            grid_size: 300,
            dt: 0.05,
            curvature_gain: 2.0,
            coupling_radius: 1.0,
            coupling_weight: 0.7,
            attractor_strength: 3.0,
            redistribution_rate: 0.2,
            w_k: 1.0,
            w_t: 1.0,
            w_c: 1.0,
            w_a: 1.0,
            w_r: 1.0,
            mode: Mode::Standard,
        }
    }
}

impl Parameters {
    /// Clamp every field into its valid range. Grid size is clamped
    /// separately by the caller since changing it reallocates the field.
    pub fn clamp(&mut self) {
        self.dt = ranges::DT.clamp(self.dt);
        self.curvature_gain = ranges::CURVATURE_GAIN.clamp(self.curvature_gain);
        self.coupling_radius = ranges::COUPLING_RADIUS.clamp(self.coupling_radius);
        self.coupling_weight = ranges::COUPLING_WEIGHT.clamp(self.coupling_weight);
        self.attractor_strength = ranges::ATTRACTOR_STRENGTH.clamp(self.attractor_strength);
        self.redistribution_rate = ranges::REDISTRIBUTION_RATE.clamp(self.redistribution_rate);
        self.w_k = ranges::OPERATOR_WEIGHT.clamp(self.w_k);
        self.w_t = ranges::OPERATOR_WEIGHT.clamp(self.w_t);
        self.w_c = ranges::OPERATOR_WEIGHT.clamp(self.w_c);
        self.w_a = ranges::OPERATOR_WEIGHT.clamp(self.w_a);
        self.w_r = ranges::OPERATOR_WEIGHT.clamp(self.w_r);
    }

    /// Look up a named preset, applied as an overlay on [`Parameters::default`].
    pub fn preset(name: &str) -> Option<Parameters> {
        let mut p = Parameters::default();
        match name {
            "Drifting" => {}
            "Quasicrystal" => {
                p.mode = Mode::Quasicrystal;
                p.coupling_weight = 0.85;
                p.w_c = 1.6;
            }
            "Edge of Criticality" => {
                p.mode = Mode::Criticality;
                p.attractor_strength = 5.0;
                p.w_t = 1.8;
            }
            "Fractal Cascade" => {
                p.mode = Mode::Fractal;
                p.curvature_gain = 4.0;
                p.w_k = 1.8;
            }
            "Solitons" => {
                p.mode = Mode::Soliton;
                p.attractor_strength = 6.0;
                p.redistribution_rate = 0.05;
            }
            "Cosmic Web" => {
                p.mode = Mode::CosmicWeb;
                p.coupling_radius = 3.0;
                p.w_c = 2.0;
                p.w_r = 1.5;
            }
            _ => return None,
        }
        p.clamp();
        Some(p)
    }

    /// Names of all built-in presets, in display order.
    pub fn preset_names() -> &'static [&'static str] {
        &[
            "Drifting",
            "Quasicrystal",
            "Edge of Criticality",
            "Fractal Cascade",
            "Solitons",
            "Cosmic Web",
        ]
    }

    /// Apply a sparse set of overrides from `patch`, clamping every touched
    /// field into its valid range. `grid_size` is left untouched: resizing
    /// reallocates the field, so callers apply it separately and reject it
    /// outright if out of range (`SPEC_FULL.md` §7).
    pub fn apply_patch(&mut self, patch: &ParametersPatch) {
        if let Some(v) = patch.dt {
            self.dt = v;
        }
        if let Some(v) = patch.curvature_gain {
            self.curvature_gain = v;
        }
        if let Some(v) = patch.coupling_radius {
            self.coupling_radius = v;
        }
        if let Some(v) = patch.coupling_weight {
            self.coupling_weight = v;
        }
        if let Some(v) = patch.attractor_strength {
            self.attractor_strength = v;
        }
        if let Some(v) = patch.redistribution_rate {
            self.redistribution_rate = v;
        }
        if let Some(v) = patch.w_k {
            self.w_k = v;
        }
        if let Some(v) = patch.w_t {
            self.w_t = v;
        }
        if let Some(v) = patch.w_c {
            self.w_c = v;
        }
        if let Some(v) = patch.w_a {
            self.w_a = v;
        }
        if let Some(v) = patch.w_r {
            self.w_r = v;
        }
        if let Some(v) = patch.mode {
            self.mode = v;
        }
        self.clamp();
    }
}

/// A sparse set of overrides for [`Parameters::apply_patch`]. Every field is
/// optional; `None` leaves the corresponding parameter untouched. `grid_size`
/// is handled separately by the driver since it reallocates the field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParametersPatch {
    /// Override for `dt`.
    pub dt: Option<f32>,
    /// Override for `curvature_gain`.
    pub curvature_gain: Option<f32>,
    /// Override for `coupling_radius`.
    pub coupling_radius: Option<f32>,
    /// Override for `coupling_weight`.
    pub coupling_weight: Option<f32>,
    /// Override for `attractor_strength`.
    pub attractor_strength: Option<f32>,
    /// Override for `redistribution_rate`.
    pub redistribution_rate: Option<f32>,
    /// Override for `w_k`.
    pub w_k: Option<f32>,
    /// Override for `w_t`.
    pub w_t: Option<f32>,
    /// Override for `w_c`.
    pub w_c: Option<f32>,
    /// Override for `w_a`.
    pub w_a: Option<f32>,
    /// Override for `w_r`.
    pub w_r: Option<f32>,
    /// Override for `mode`.
    pub mode: Option<Mode>,
    /// Requested grid size, applied separately by the driver.
    pub grid_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_are_already_in_range() {
        let mut p = Parameters::default();
        let before = p;
        p.clamp();
        assert_eq!(p, before);
    }

    #[test]
    fn clamp_pulls_out_of_range_values_back_in() {
        let mut p = Parameters {
            dt: 10.0,
            curvature_gain: -5.0,
            w_k: 99.0,
            ..Parameters::default()
        };
        p.clamp();
        assert_eq!(p.dt, ranges::DT.max);
        assert_eq!(p.curvature_gain, ranges::CURVATURE_GAIN.min);
        assert_eq!(p.w_k, ranges::OPERATOR_WEIGHT.max);
    }

    #[test]
    fn all_preset_names_resolve() {
        for name in Parameters::preset_names() {
            assert!(Parameters::preset(name).is_some(), "missing preset {name}");
        }
    }

    #[test]
    fn unknown_preset_returns_none() {
        assert!(Parameters::preset("Nonexistent").is_none());
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut p = Parameters::default();
        let patch = ParametersPatch {
            w_k: Some(3.5),
            ..Default::default()
        };
        p.apply_patch(&patch);
        assert_eq!(p.w_k, 3.5);
        assert_eq!(p.dt, Parameters::default().dt);
    }

    #[test]
    fn patch_clamps_out_of_range_overrides() {
        let mut p = Parameters::default();
        let patch = ParametersPatch {
            dt: Some(50.0),
            ..Default::default()
        };
        p.apply_patch(&patch);
        assert_eq!(p.dt, ranges::DT.max);
    }
}
