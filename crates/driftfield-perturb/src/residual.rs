//! The pending-residual queue the stepper drains at the start of each step.

use driftfield_core::{Field, Mulberry32};

use crate::apply::saturate;
use crate::kernel::{DriftParams, FractureParams, ShearParams, WaveParams};

/// The kernel-specific state retained for one queued residual.
#[derive(Clone, Debug, PartialEq)]
enum ResidualEffect {
    Shear {
        x: i32,
        y: i32,
        params: ShearParams,
    },
    Wave {
        x: i32,
        y: i32,
        params: WaveParams,
    },
    Fracture {
        x: i32,
        y: i32,
        params: FractureParams,
        rng_seed: u32,
    },
    Drift {
        params: DriftParams,
    },
}

/// A queued perturbation effect the stepper re-applies (with decay) across
/// subsequent steps, per `SPEC_FULL.md` §4.1 and §4.7.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingResidual {
    effect: ResidualEffect,
    elapsed: u32,
    remaining: u32,
}

/// Steps-until-negligible used for kernels whose spec parameters describe a
/// continuous damping/propagation rate rather than an explicit duration.
fn steps_until_negligible(decay_per_step: f32) -> u32 {
    const FLOOR: f32 = 1e-3;
    let decay_per_step = decay_per_step.clamp(1e-3, 0.999);
    let steps = (FLOOR.ln() / decay_per_step.ln()).ceil();
    (steps as u32).clamp(1, 10_000)
}

impl PendingResidual {
    /// Enqueue a shear residual centred on `(x, y)`.
    pub fn shear(x: i32, y: i32, params: ShearParams) -> Self {
        PendingResidual {
            remaining: params.duration.max(1),
            elapsed: 0,
            effect: ResidualEffect::Shear { x, y, params },
        }
    }

    /// Enqueue a wave residual centred on `(x, y)`.
    pub fn wave(x: i32, y: i32, params: WaveParams) -> Self {
        let remaining = steps_until_negligible(1.0 - params.damping.clamp(0.0, 0.999));
        PendingResidual {
            remaining,
            elapsed: 0,
            effect: ResidualEffect::Wave { x, y, params },
        }
    }

    /// Enqueue a fracture residual originating at `(x, y)`.
    pub fn fracture(x: i32, y: i32, params: FractureParams, rng: &mut Mulberry32) -> Self {
        let remaining = steps_until_negligible(params.propagation_rate.clamp(0.01, 0.999));
        PendingResidual {
            remaining,
            elapsed: 0,
            effect: ResidualEffect::Fracture {
                x,
                y,
                params,
                rng_seed: rng.next_u32(),
            },
        }
    }

    /// Enqueue a drift residual (global, no centre).
    pub fn drift(params: DriftParams) -> Self {
        PendingResidual {
            remaining: params.duration.max(1),
            elapsed: 0,
            effect: ResidualEffect::Drift { params },
        }
    }

    /// Whether this residual has exhausted its scheduled steps.
    pub fn is_retired(&self) -> bool {
        self.elapsed >= self.remaining
    }

    /// Apply this step's contribution into `field`, then advance `elapsed`.
    pub fn apply_and_advance(&mut self, field: &mut Field) {
        let life = 1.0 - (self.elapsed as f32 / self.remaining.max(1) as f32);
        match &self.effect {
            ResidualEffect::Shear { x, y, params } => apply_shear(field, *x, *y, params, life),
            ResidualEffect::Wave { x, y, params } => {
                apply_wave(field, *x, *y, params, self.elapsed, life)
            }
            ResidualEffect::Fracture {
                x,
                y,
                params,
                rng_seed,
            } => apply_fracture(field, *x, *y, params, *rng_seed, self.elapsed, life),
            ResidualEffect::Drift { params } => apply_drift(field, params, life),
        }
        self.elapsed += 1;
    }
}

fn apply_shear(field: &mut Field, cx: i32, cy: i32, params: &ShearParams, life: f32) {
    let angle = params.angle_deg.to_radians();
    let (dir_x, dir_y) = (angle.cos(), angle.sin());
    let radius = params.radius;
    let r_cells = radius.ceil() as i32;
    for dy in -r_cells..=r_cells {
        for dx in -r_cells..=r_cells {
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if dist > radius {
                continue;
            }
            let projection = (dx as f32 * dir_x + dy as f32 * dir_y) / radius.max(1e-3);
            let delta = params.magnitude * projection * life;
            let (x, y) = (cx + dx, cy + dy);
            let v = field.get(x, y) + delta;
            field.set(x, y, saturate(v));
        }
    }
}

fn apply_wave(field: &mut Field, cx: i32, cy: i32, params: &WaveParams, elapsed: u32, life: f32) {
    let size = field.size() as i32;
    let cutoff = (4.0 * params.wavelength).max(4.0);
    let reach = cutoff.ceil() as i32;
    let damping_mult = params.damping.clamp(0.0, 0.999).powi(elapsed as i32);
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let r = ((dx * dx + dy * dy) as f32).sqrt();
            if r > cutoff {
                continue;
            }
            let phase = (r / params.wavelength.max(1e-3)) * std::f32::consts::TAU
                - params.frequency * elapsed as f32;
            let envelope = (-r / cutoff).exp();
            let delta = params.amplitude * phase.sin() * envelope * damping_mult * life;
            let (x, y) = ((cx + dx).rem_euclid(size), (cy + dy).rem_euclid(size));
            let v = field.get(x, y) + delta;
            field.set(x, y, saturate(v));
        }
    }
}

fn apply_fracture(
    field: &mut Field,
    cx: i32,
    cy: i32,
    params: &FractureParams,
    rng_seed: u32,
    elapsed: u32,
    life: f32,
) {
    let mut rng = Mulberry32::new(rng_seed.wrapping_add(elapsed.wrapping_mul(0x9E37_79B9)));
    let steps = 24usize;
    let (mut x, mut y) = (cx as f32, cy as f32);
    let mut heading = rng.range_f32(0.0, std::f32::consts::TAU);
    for _ in 0..steps {
        heading += rng.range_f32(-0.6, 0.6);
        x += heading.cos();
        y += heading.sin();
        let strength = params.strength * life;
        let jitter = rng.range_f32(-params.noise, params.noise);
        let delta = strength + jitter;
        let (xi, yi) = (x.round() as i32, y.round() as i32);
        let v = field.get(xi, yi) + delta;
        field.set(xi, yi, saturate(v));
        if rng.next_f32() < 0.2 {
            heading += rng.range_f32(-1.2, 1.2);
        }
    }
}

fn apply_drift(field: &mut Field, params: &DriftParams, life: f32) {
    let shift_x = (params.vector_x * params.magnitude * life).round() as i32;
    let shift_y = (params.vector_y * params.magnitude * life).round() as i32;
    if shift_x == 0 && shift_y == 0 {
        return;
    }
    let size = field.size() as i32;
    let source = field.clone();
    for y in 0..size {
        for x in 0..size {
            let v = source.get(x - shift_x, y - shift_y);
            field.set(x, y, saturate(v));
        }
    }
}

/// The stepper's pending-residual queue: drained and re-applied (with
/// decay) at the start of every step, then retired residuals are dropped.
#[derive(Clone, Debug, Default)]
pub struct ResidualQueue {
    pending: Vec<PendingResidual>,
}

impl ResidualQueue {
    /// An empty queue.
    pub fn new() -> Self {
        ResidualQueue::default()
    }

    /// Enqueue a new residual.
    pub fn push(&mut self, residual: PendingResidual) {
        self.pending.push(residual);
    }

    /// Number of residuals still pending.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending residual's current contribution into `field`,
    /// advance each one, then drop any that have retired.
    pub fn drain_into(&mut self, field: &mut Field) {
        for residual in &mut self.pending {
            residual.apply_and_advance(field);
        }
        self.pending.retain(|r| !r.is_retired());
    }

    /// Discard every queued residual.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
