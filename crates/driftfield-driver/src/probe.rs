//! Single-cell read-out combining the field value with its local stencils.

use driftfield_core::Field;
use driftfield_ops::BasinMap;
use driftfield_space::{gaussian_blur, gradient_magnitude, laplacian, local_variance_3x3};

/// A read-out of one cell: its raw value plus the same local quantities the
/// operator bank and derived fields compute there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeData {
    /// Column probed.
    pub x: u32,
    /// Row probed.
    pub y: u32,
    /// Raw field value at `(x, y)`.
    pub value: f32,
    /// Discrete Laplacian at `(x, y)`.
    pub curvature: f32,
    /// Gradient magnitude at `(x, y)`.
    pub tension: f32,
    /// Signed Gaussian-blur-minus-centre at `(x, y)`.
    pub coupling: f32,
    /// Gradient magnitude at `(x, y)` (same quantity as `tension`, exposed
    /// under its own name to match the probe's field list).
    pub gradient_magnitude: f32,
    /// Variance of the 3x3 neighbourhood centred on `(x, y)`.
    pub neighborhood_variance: f32,
    /// The basin this cell belongs to, if any.
    pub basin_id: Option<i32>,
}

/// Probe `(x, y)` in `field`, looking up its basin id from `basins` and
/// using `coupling_radius` for the coupling stencil (the same radius the
/// stepper's coupling operator uses this step).
pub fn probe(field: &Field, basins: &BasinMap, coupling_radius: f32, x: i32, y: i32) -> ProbeData {
    let blurred = gaussian_blur(field, coupling_radius);
    let value = field.get(x, y);
    let grad_mag = gradient_magnitude(field, x, y);
    let label = basins.labels[field.index(x, y)];

    ProbeData {
        x: field.wrap(x) as u32,
        y: field.wrap(y) as u32,
        value,
        curvature: laplacian(field, x, y),
        tension: grad_mag,
        coupling: blurred.get(x, y) - value,
        gradient_magnitude: grad_mag,
        neighborhood_variance: local_variance_3x3(field, x, y),
        basin_id: if label >= 0 { Some(label) } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfield_ops::basin::basin_labels;

    #[test]
    fn constant_field_probe_has_zero_curvature_and_tension() {
        let field = Field::filled(50, 0.2).unwrap();
        let basins = basin_labels(&field);
        let data = probe(&field, &basins, 1.0, 10, 10);
        assert!(data.curvature.abs() < 1e-6);
        assert!(data.tension.abs() < 1e-6);
        assert_eq!(data.basin_id, None);
    }

    #[test]
    fn probe_reports_the_raw_value_and_wrapped_coords() {
        let mut field = Field::zeros(50).unwrap();
        field.set(5, 5, 0.42);
        let basins = basin_labels(&field);
        let data = probe(&field, &basins, 1.0, 5 - 50, 5);
        assert_eq!(data.value, 0.42);
        assert_eq!(data.x, 5);
        assert_eq!(data.y, 5);
    }

    #[test]
    fn probe_reports_basin_membership() {
        let mut field = Field::filled(50, 0.0).unwrap();
        field.set(20, 20, 0.9);
        let basins = basin_labels(&field);
        let data = probe(&field, &basins, 1.0, 20, 20);
        assert_eq!(data.basin_id, Some(0));
    }
}
