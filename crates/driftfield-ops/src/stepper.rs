//! The five-operator composite field update.

use driftfield_core::{Field, Parameters};
use driftfield_space::{gaussian_blur, gradient_magnitude_sq, laplacian, local_mean_3x3};

/// Outcome of one [`step`] call, useful for diagnostics and telemetry.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Set when one or more cells produced a non-finite value and were
    /// reset to zero.
    pub unstable: bool,
    /// Mean absolute per-cell contribution of each weighted operator,
    /// in order `[curvature, tension, coupling, attractor, redistribution]`.
    pub operator_contribution_means: [f32; 5],
}

/// Advance `field` by one time step under `params`, returning the new field
/// and the step's diagnostic outcome.
///
/// The update is `v' = tanh(v + dt * (wK*K + wT*T + wC*C + wA*A + wR*R))`,
/// toroidally wrapped, with the five local operators described in
/// `SPEC_FULL.md` §4.1. Any perturbation residuals must already have been
/// folded into `field` by the caller before this runs.
pub fn step(field: &Field, params: &Parameters) -> (Field, StepOutcome) {
    let profile = params.mode.profile();
    let curvature_gain = params.curvature_gain * profile.gain_scale;
    let weights = [
        params.w_k * profile.weight_bias[0],
        params.w_t * profile.weight_bias[1],
        params.w_c * profile.weight_bias[2],
        params.w_a * profile.weight_bias[3],
        params.w_r * profile.weight_bias[4],
    ];

    let blurred = gaussian_blur(field, params.coupling_radius);
    let mean_field = field.mean();
    let size = field.size() as i32;

    let mut out = field.clone();
    let mut unstable = false;
    let mut contribution_sums = [0.0f64; 5];
    let cell_count = (size as f64) * (size as f64);

    for y in 0..size {
        for x in 0..size {
            let v = field.get(x, y);

            let l = laplacian(field, x, y);
            let k = (curvature_gain * l).tanh();

            let g2 = gradient_magnitude_sq(field, x, y);
            let t = -g2 / (1.0 + g2.abs());

            let b = blurred.get(x, y);
            let c = params.coupling_weight * (b - v);

            let local_mean = local_mean_3x3(field, x, y);
            let a = -(params.attractor_strength * (v - local_mean)).tanh();

            let r = -mean_field * params.redistribution_rate;

            let contributions = [
                weights[0] * k,
                weights[1] * t,
                weights[2] * c,
                weights[3] * a,
                weights[4] * r,
            ];
            for (sum, contrib) in contribution_sums.iter_mut().zip(contributions) {
                *sum += contrib.abs() as f64;
            }

            let delta: f32 = contributions.iter().sum();
            let mut next = (v + params.dt * delta).tanh();
            if !next.is_finite() {
                next = 0.0;
                unstable = true;
            }
            out.set(x, y, next);
        }
    }

    let mut means = [0.0f32; 5];
    for (mean, sum) in means.iter_mut().zip(contribution_sums) {
        *mean = (sum / cell_count) as f32;
    }

    (
        out,
        StepOutcome {
            unstable,
            operator_contribution_means: means,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfield_core::Mode;
    use proptest::prelude::*;

    #[test]
    fn constant_field_stays_spatially_uniform_without_redistribution() {
        // Every operator contributes zero at a constant cell (L, g, B-v,
        // and v-localMean all vanish), so with redistributionRate also
        // zero, every cell receives the identical update `tanh(c)`: the
        // field stays a constant field, though the constant itself drifts.
        let field = Field::filled(50, 0.5).unwrap();
        let mut params = Parameters {
            redistribution_rate: 0.0,
            w_r: 0.0,
            ..Parameters::default()
        };
        params.clamp();
        let mut current = field;
        for _ in 0..10 {
            let (next, outcome) = step(&current, &params);
            assert!(!outcome.unstable);
            current = next;
        }
        let first = current.as_slice()[0];
        for &v in current.as_slice() {
            assert!((v - first).abs() < 1e-6, "v={v}, first={first}");
        }
    }

    #[test]
    fn saturation_holds_after_a_step() {
        let field = Field::filled(60, 0.9).unwrap();
        let params = Parameters::default();
        let (next, outcome) = step(&field, &params);
        assert!(!outcome.unstable);
        for &v in next.as_slice() {
            assert!(v > -1.0 && v < 1.0, "v={v}");
        }
    }

    #[test]
    fn toroidal_translation_invariance() {
        let size = 50i32;
        let mut base = Field::zeros(size as u32).unwrap();
        for y in 0..size {
            for x in 0..size {
                let v = ((x * 7 + y * 13) % 11) as f32 / 20.0 - 0.25;
                base.set(x, y, v);
            }
        }
        let params = Parameters::default();

        let shift = 5;
        let mut shifted = base.clone();
        for y in 0..size {
            for x in 0..size {
                shifted.set(x, y, base.get(x - shift, y));
            }
        }

        let (base_next, _) = step(&base, &params);
        let (shifted_next, _) = step(&shifted, &params);

        for y in 0..size {
            for x in 0..size {
                let expected = base_next.get(x - shift, y);
                let actual = shifted_next.get(x, y);
                assert!((expected - actual).abs() < 1e-5, "mismatch at ({x},{y})");
            }
        }
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let mut field = Field::zeros(50).unwrap();
        for i in 0..field.len() {
            field.as_mut_slice()[i] = ((i % 7) as f32) / 10.0 - 0.3;
        }
        let params = Parameters::default();
        let (a, _) = step(&field, &params);
        let (b, _) = step(&field, &params);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    proptest! {
        #[test]
        fn never_produces_non_finite_values(seed_cell in -0.9f32..0.9) {
            let field = Field::filled(50, seed_cell).unwrap();
            let params = Parameters::default();
            let (next, _) = step(&field, &params);
            for &v in next.as_slice() {
                prop_assert!(v.is_finite());
            }
        }
    }

    #[test]
    fn every_mode_runs_without_instability() {
        let modes = [
            Mode::Standard,
            Mode::Quasicrystal,
            Mode::Criticality,
            Mode::Fractal,
            Mode::Soliton,
            Mode::CosmicWeb,
        ];
        for mode in modes {
            let mut field = Field::zeros(50).unwrap();
            field.set(25, 25, 0.6);
            let params = Parameters {
                mode,
                ..Parameters::default()
            };
            let mut current = field;
            for _ in 0..20 {
                let (next, outcome) = step(&current, &params);
                assert!(!outcome.unstable, "mode {mode} went unstable");
                current = next;
            }
        }
    }
}
