//! Local stencil operators over a toroidal [`Field`](driftfield_core::Field).

use driftfield_core::Field;

/// Discrete Laplacian at `(x, y)`: `sum(4-neighbours) - 4*centre`.
#[inline]
pub fn laplacian(field: &Field, x: i32, y: i32) -> f32 {
    let centre = field.get(x, y);
    field.get(x - 1, y) + field.get(x + 1, y) + field.get(x, y - 1) + field.get(x, y + 1)
        - 4.0 * centre
}

/// Central-difference gradient `(dv/dx, dv/dy)` at `(x, y)`.
#[inline]
pub fn gradient(field: &Field, x: i32, y: i32) -> (f32, f32) {
    let gx = (field.get(x + 1, y) - field.get(x - 1, y)) / 2.0;
    let gy = (field.get(x, y + 1) - field.get(x, y - 1)) / 2.0;
    (gx, gy)
}

/// Squared gradient magnitude at `(x, y)`.
#[inline]
pub fn gradient_magnitude_sq(field: &Field, x: i32, y: i32) -> f32 {
    let (gx, gy) = gradient(field, x, y);
    gx * gx + gy * gy
}

/// Gradient magnitude at `(x, y)`.
#[inline]
pub fn gradient_magnitude(field: &Field, x: i32, y: i32) -> f32 {
    gradient_magnitude_sq(field, x, y).sqrt()
}

/// Mean of the 3x3 neighbourhood centred on `(x, y)` (toroidal, includes centre).
pub fn local_mean_3x3(field: &Field, x: i32, y: i32) -> f32 {
    let mut sum = 0.0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            sum += field.get(x + dx, y + dy);
        }
    }
    sum / 9.0
}

/// Variance of the 3x3 neighbourhood centred on `(x, y)` (toroidal, includes centre).
pub fn local_variance_3x3(field: &Field, x: i32, y: i32) -> f32 {
    let mean = local_mean_3x3(field, x, y);
    let mut sum_sq = 0.0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            let d = field.get(x + dx, y + dy) - mean;
            sum_sq += d * d;
        }
    }
    sum_sq / 9.0
}

/// A 1-D Gaussian kernel of the given sigma, truncated at `ceil(2*sigma)`
/// on each side and normalised to sum to 1.
fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    let radius = (2.0 * sigma).ceil().max(1.0) as i32;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| {
            let x = i as f32;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    if sum > 0.0 {
        for k in &mut kernel {
            *k /= sum;
        }
    }
    kernel
}

/// Separable Gaussian blur of `field` with the given sigma, toroidally wrapped.
///
/// Runs a horizontal pass followed by a vertical pass, each using the same
/// 1-D kernel, matching the teacher's separable-blur reference propagator.
pub fn gaussian_blur(field: &Field, sigma: f32) -> Field {
    let kernel = gaussian_kernel_1d(sigma);
    let radius = (kernel.len() / 2) as i32;
    let size = field.size();

    let mut horizontal = field.clone();
    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let mut acc = 0.0;
            for (k_idx, &k) in kernel.iter().enumerate() {
                let dx = k_idx as i32 - radius;
                acc += field.get(x + dx, y) * k;
            }
            horizontal.set(x, y, acc);
        }
    }

    let mut vertical = horizontal.clone();
    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let mut acc = 0.0;
            for (k_idx, &k) in kernel.iter().enumerate() {
                let dy = k_idx as i32 - radius;
                acc += horizontal.get(x, y + dy) * k;
            }
            vertical.set(x, y, acc);
        }
    }

    vertical
}

/// The 8-connected neighbourhood of `(x, y)` as `(value, dx, dy)` triples,
/// toroidally wrapped, in row-major scan order for deterministic tie-breaks.
pub fn neighbours_8(field: &Field, x: i32, y: i32) -> [(f32, i32, i32); 8] {
    let mut out = [(0.0f32, 0, 0); 8];
    let mut i = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            out[i] = (field.get(x + dx, y + dy), dx, dy);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_field_has_zero_laplacian_and_gradient() {
        let f = Field::filled(50, 0.42).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                assert!(laplacian(&f, x, y).abs() < 1e-6);
                assert_eq!(gradient(&f, x, y), (0.0, 0.0));
            }
        }
    }

    #[test]
    fn gaussian_blur_preserves_constant_field() {
        let f = Field::filled(50, 0.3).unwrap();
        let blurred = gaussian_blur(&f, 1.5);
        for &v in blurred.as_slice() {
            assert!((v - 0.3).abs() < 1e-5);
        }
    }

    #[test]
    fn gaussian_blur_smooths_a_single_spike() {
        let mut f = Field::zeros(50).unwrap();
        f.set(25, 25, 1.0);
        let blurred = gaussian_blur(&f, 1.0);
        assert!(blurred.get(25, 25) < 1.0);
        assert!(blurred.get(25, 25) > 0.0);
        assert!(blurred.get(26, 25) > 0.0);
    }

    #[test]
    fn laplacian_wraps_across_the_torus() {
        let mut f = Field::zeros(50).unwrap();
        f.set(0, 0, 1.0);
        // neighbour at (-1, 0) wraps to (49, 0); laplacian at (49,0) should see it
        let l = laplacian(&f, 49, 0);
        assert!(l > 0.0);
    }
}
