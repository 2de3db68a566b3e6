//! Per-step [`Signature`] computation.

use driftfield_core::Field;
use driftfield_ops::BasinMap;
use driftfield_space::{gradient_magnitude, laplacian};

/// Small constant below which `|L| * |grad|` is considered negligible,
/// used by the stability-metric fraction.
const STABILITY_EPSILON: f32 = 0.01;
/// Normalisation divisor mapping `globalCurvature` onto roughly `[0, 1]`
/// before it enters the coherence composite. Laplacian magnitude is
/// bounded by `8` for a saturated field; this keeps typical values under 1
/// without clipping every frame to the ceiling.
const COHERENCE_CURVATURE_SCALE: f32 = 4.0;

/// A compact vector of global field statistics for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Signature {
    /// Number of distinct attractor basins this step.
    pub basin_count: usize,
    /// Mean `|v|` over basin terminal cells, averaged across basins.
    pub avg_basin_depth: f32,
    /// L1 mean of the discrete Laplacian over the whole grid.
    pub global_curvature: f32,
    /// Variance of per-cell gradient magnitude.
    pub tension_variance: f32,
    /// Fraction of cells with `|L| * |grad| < epsilon`, in `[0, 1]`.
    pub stability_metric: f32,
    /// Composite organisation score in `[0, 1]`.
    pub coherence: f32,
}

#[inline]
fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Compute the [`Signature`] of `field` given its already-labelled
/// [`BasinMap`].
pub fn compute_signature(field: &Field, basins: &BasinMap) -> Signature {
    let size = field.size() as i32;
    let n = field.len();

    let mut curvature_sum = 0.0f64;
    let mut gradients = Vec::with_capacity(n);
    let mut stable_cells = 0usize;

    for y in 0..size {
        for x in 0..size {
            let l = laplacian(field, x, y);
            let g = gradient_magnitude(field, x, y);
            curvature_sum += l.abs() as f64;
            if (l.abs() * g) < STABILITY_EPSILON {
                stable_cells += 1;
            }
            gradients.push(g);
        }
    }

    let global_curvature = (curvature_sum / n.max(1) as f64) as f32;
    let grad_mean = gradients.iter().sum::<f32>() / n.max(1) as f32;
    let tension_variance = gradients
        .iter()
        .map(|&g| {
            let d = g - grad_mean;
            d * d
        })
        .sum::<f32>()
        / n.max(1) as f32;
    let stability_metric = stable_cells as f32 / n.max(1) as f32;

    let (basin_count, avg_basin_depth) = basin_depth(field, basins);

    let basin_component = clamp01(avg_basin_depth);
    let curvature_component = clamp01(global_curvature / COHERENCE_CURVATURE_SCALE);
    let tension_component = clamp01(1.0 - tension_variance);
    let coherence = clamp01((basin_component + curvature_component + tension_component) / 3.0);

    Signature {
        basin_count,
        avg_basin_depth,
        global_curvature,
        tension_variance,
        stability_metric: clamp01(stability_metric),
        coherence,
    }
}

/// Mean `|v|` at each basin's terminal cell, averaged across basins.
fn basin_depth(field: &Field, basins: &BasinMap) -> (usize, f32) {
    if basins.count == 0 {
        return (0, 0.0);
    }
    let mut sums = vec![0.0f32; basins.count];
    let mut counts = vec![0u32; basins.count];
    for (idx, &label) in basins.labels.iter().enumerate() {
        if label >= 0 {
            let l = label as usize;
            sums[l] += field.get_flat(idx).abs();
            counts[l] += 1;
        }
    }
    let mut total = 0.0f32;
    let mut non_empty = 0usize;
    for (sum, count) in sums.iter().zip(counts.iter()) {
        if *count > 0 {
            total += sum / *count as f32;
            non_empty += 1;
        }
    }
    if non_empty == 0 {
        (basins.count, 0.0)
    } else {
        (basins.count, total / non_empty as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfield_ops::basin::basin_labels;

    #[test]
    fn constant_field_has_zero_curvature_and_full_stability() {
        let field = Field::filled(50, 0.3).unwrap();
        let basins = basin_labels(&field);
        let sig = compute_signature(&field, &basins);
        assert_eq!(sig.basin_count, 0);
        assert!(sig.global_curvature.abs() < 1e-6);
        assert!(sig.stability_metric > 0.99);
    }

    #[test]
    fn all_outputs_are_clamped_into_unit_interval() {
        let mut field = Field::zeros(50).unwrap();
        for i in 0..field.len() {
            field.as_mut_slice()[i] = (((i * 13) % 200) as f32) / 100.0 - 1.0;
        }
        let basins = basin_labels(&field);
        let sig = compute_signature(&field, &basins);
        assert!((0.0..=1.0).contains(&sig.stability_metric));
        assert!((0.0..=1.0).contains(&sig.coherence));
    }

    #[test]
    fn basin_count_matches_basin_map() {
        let mut field = Field::filled(50, 0.0).unwrap();
        field.set(10, 10, 0.9);
        field.set(40, 40, 0.8);
        let basins = basin_labels(&field);
        let sig = compute_signature(&field, &basins);
        assert_eq!(sig.basin_count, basins.count);
    }
}
