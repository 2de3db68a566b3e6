//! Direct field mutation for the one-shot kernels, and the shared
//! saturation helper used by every kernel.

use driftfield_core::Field;

use crate::kernel::{ImpulseParams, RotationDirection, VortexParams};

/// Clamp a value into the engine's open `(-1, 1)` contract.
#[inline]
pub fn saturate(v: f32) -> f32 {
    v.clamp(-0.999_999, 0.999_999)
}

/// Apply a Gaussian bump centred on `(cx, cy)`, saturating as it writes.
///
/// `sigma = radius / decay` (guarding against a zero or negative decay).
pub fn apply_impulse(field: &mut Field, cx: i32, cy: i32, params: &ImpulseParams) {
    let sigma = (params.radius / params.decay.max(1e-3)).max(1e-3);
    let reach = (3.0 * sigma).ceil() as i32;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let dist_sq = (dx * dx + dy * dy) as f32;
            let falloff = (-dist_sq / (2.0 * sigma * sigma)).exp();
            if falloff < 1e-4 {
                continue;
            }
            let x = cx + dx;
            let y = cy + dy;
            let v = field.get(x, y) + params.intensity * falloff;
            field.set(x, y, saturate(v));
        }
    }
}

/// Rotate values along concentric rings around `(cx, cy)`.
///
/// Each ring of cells at integer radius `r <= radius` is replaced with a
/// copy of itself rotated by `angular_velocity` radians (toroidally
/// wrapped via nearest-angle resampling), a one-shot transform rather than
/// an additive write.
pub fn apply_vortex(field: &mut Field, cx: i32, cy: i32, params: &VortexParams) {
    let max_r = params.radius.ceil() as i32;
    let sign = match params.direction {
        RotationDirection::CounterClockwise => 1.0,
        RotationDirection::Clockwise => -1.0,
    };
    let size = field.size() as i32;
    let original = field.clone();

    for y in 0..size {
        for x in 0..size {
            let dx = wrapped_delta(x - cx, size);
            let dy = wrapped_delta(y - cy, size);
            let r = ((dx * dx + dy * dy) as f32).sqrt();
            if r < 0.5 || r > max_r as f32 {
                continue;
            }
            let theta = (dy as f32).atan2(dx as f32);
            let falloff = 1.0 - (r / max_r as f32).min(1.0);
            let rotated = theta + sign * params.angular_velocity * falloff;
            let src_x = cx as f32 + r * rotated.cos();
            let src_y = cy as f32 + r * rotated.sin();
            let sample = original.get(src_x.round() as i32, src_y.round() as i32);
            field.set(x, y, saturate(sample));
        }
    }
}

fn wrapped_delta(d: i32, size: i32) -> i32 {
    let half = size / 2;
    let mut v = d % size;
    if v > half {
        v -= size;
    } else if v < -half {
        v += size;
    }
    v
}
