//! Derived scalar maps projecting structural properties of the field.

use driftfield_core::Field;
use driftfield_space::{gradient, gradient_magnitude, laplacian, local_variance_3x3};
use std::collections::HashMap;

use crate::basin::basin_labels;

/// Criticality peak centre.
const CRITICALITY_THETA: f32 = 0.0;
/// Criticality peak width.
const CRITICALITY_SIGMA: f32 = 0.15;
/// Hysteresis exponential-moving-average retention weight.
const HYSTERESIS_WEIGHT: f32 = 0.9;
/// Stability-field curvature sensitivity.
const STABILITY_KAPPA: f32 = 1.0;
/// Stability-field gradient sensitivity.
const STABILITY_ETA: f32 = 1.0;
/// Basin-magnitude floor below which a terminal cell is unlabelled.
pub const BASIN_MAGNITUDE_THRESHOLD: f32 = 0.3;

/// The eleven derived-field kinds the engine can compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DerivedFieldType {
    /// Discrete Laplacian.
    Curvature,
    /// Gradient magnitude.
    Tension,
    /// Signed blur-minus-centre.
    Coupling,
    /// 3x3-neighbourhood variance.
    Variance,
    /// Gradient magnitude (directional flow).
    GradientFlow,
    /// Peak near a critical threshold.
    Criticality,
    /// Exponential moving average of prior frames.
    Hysteresis,
    /// Cells exceeding both the curvature and gradient medians.
    ConstraintSkeleton,
    /// `1 / (1 + kappa*|grad|^2 + eta*|laplacian|)`.
    StabilityField,
    /// Signed divergence of the gradient field.
    GradientFlowLines,
    /// Dense basin labels, cast to `f32` (`-1` for unlabelled).
    Basins,
}

impl DerivedFieldType {
    /// All eleven variants, in the order listed in `SPEC_FULL.md` §4.2.
    pub const ALL: [DerivedFieldType; 11] = [
        DerivedFieldType::Curvature,
        DerivedFieldType::Tension,
        DerivedFieldType::Coupling,
        DerivedFieldType::Variance,
        DerivedFieldType::GradientFlow,
        DerivedFieldType::Criticality,
        DerivedFieldType::Hysteresis,
        DerivedFieldType::ConstraintSkeleton,
        DerivedFieldType::StabilityField,
        DerivedFieldType::GradientFlowLines,
        DerivedFieldType::Basins,
    ];
}

/// A computed derived map plus its shape.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedField {
    /// Which kind this is.
    pub kind: DerivedFieldType,
    /// Grid edge length.
    pub size: u32,
    /// Row-major cell values.
    pub grid: Vec<f32>,
}

fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = values.len() / 2;
    if values.len().is_multiple_of(2) {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn raw_curvature(field: &Field) -> Vec<f32> {
    scan(field, laplacian)
}

fn raw_tension(field: &Field) -> Vec<f32> {
    scan(field, gradient_magnitude)
}

fn scan(field: &Field, f: impl Fn(&Field, i32, i32) -> f32) -> Vec<f32> {
    let size = field.size() as i32;
    let mut out = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            out.push(f(field, x, y));
        }
    }
    out
}

/// Holds state that must persist across steps (the hysteresis EMA) and a
/// per-step cache of already-computed maps.
#[derive(Clone, Debug, Default)]
pub struct DerivedFieldEngine {
    hysteresis_ema: Option<Field>,
    cache: HashMap<DerivedFieldType, DerivedField>,
}

impl DerivedFieldEngine {
    /// Construct an engine with no prior hysteresis state.
    pub fn new() -> Self {
        DerivedFieldEngine::default()
    }

    /// Advance internal state (the hysteresis EMA) to `field` and invalidate
    /// the per-step cache. Call this once per simulation step, before any
    /// [`DerivedFieldEngine::get`] calls for that step.
    pub fn advance(&mut self, field: &Field) {
        self.hysteresis_ema = Some(match self.hysteresis_ema.take() {
            None => field.clone(),
            Some(prev) => {
                let mut blended = field.clone();
                for (b, p) in blended.as_mut_slice().iter_mut().zip(prev.as_slice()) {
                    *b = HYSTERESIS_WEIGHT * p + (1.0 - HYSTERESIS_WEIGHT) * *b;
                }
                blended
            }
        });
        self.cache.clear();
    }

    /// Compute (or return the cached) derived field of `kind` for the field
    /// most recently passed to [`DerivedFieldEngine::advance`].
    pub fn get(&mut self, field: &Field, kind: DerivedFieldType) -> &DerivedField {
        if !self.cache.contains_key(&kind) {
            let computed = self.compute(field, kind);
            self.cache.insert(kind, computed);
        }
        self.cache.get(&kind).unwrap()
    }

    fn compute(&self, field: &Field, kind: DerivedFieldType) -> DerivedField {
        let size = field.size();
        let grid = match kind {
            DerivedFieldType::Curvature => raw_curvature(field),
            DerivedFieldType::Tension => raw_tension(field),
            DerivedFieldType::Coupling => scan(field, |f, x, y| {
                let blurred = driftfield_space::gaussian_blur(f, 1.0);
                blurred.get(x, y) - f.get(x, y)
            }),
            DerivedFieldType::Variance => scan(field, local_variance_3x3),
            DerivedFieldType::GradientFlow => raw_tension(field),
            DerivedFieldType::Criticality => scan(field, |f, x, y| {
                let v = f.get(x, y);
                let d = (v - CRITICALITY_THETA) / CRITICALITY_SIGMA;
                (-(d * d)).exp()
            }),
            DerivedFieldType::Hysteresis => self
                .hysteresis_ema
                .as_ref()
                .map(|f| f.as_slice().to_vec())
                .unwrap_or_else(|| field.as_slice().to_vec()),
            DerivedFieldType::ConstraintSkeleton => {
                let curv = raw_curvature(field);
                let tens = raw_tension(field);
                let curv_med = median(&mut curv.iter().map(|v| v.abs()).collect::<Vec<_>>());
                let tens_med = median(&mut tens.clone());
                curv.iter()
                    .zip(tens.iter())
                    .map(|(&c, &t)| {
                        if c.abs() > curv_med && t > tens_med {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            }
            DerivedFieldType::StabilityField => scan(field, |f, x, y| {
                let g2 = {
                    let (gx, gy) = gradient(f, x, y);
                    gx * gx + gy * gy
                };
                let l = laplacian(f, x, y);
                1.0 / (1.0 + STABILITY_KAPPA * g2 + STABILITY_ETA * l.abs())
            }),
            DerivedFieldType::GradientFlowLines => scan(field, |f, x, y| {
                let (gx_p, _) = gradient(f, x + 1, y);
                let (gx_m, _) = gradient(f, x - 1, y);
                let (_, gy_p) = gradient(f, x, y + 1);
                let (_, gy_m) = gradient(f, x, y - 1);
                (gx_p - gx_m) / 2.0 + (gy_p - gy_m) / 2.0
            }),
            DerivedFieldType::Basins => basin_labels(field)
                .labels
                .iter()
                .map(|&l| l as f32)
                .collect(),
        };
        DerivedField { kind, size, grid }
    }
}
