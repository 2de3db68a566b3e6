//! Deterministic field initialisation from a seed.

use driftfield_core::{Field, Mulberry32, Parameters};

/// Small initial amplitude: the field starts as low-magnitude seeded noise
/// rather than a blank slate, so the operator bank has structure to act on
/// from step zero.
const INIT_AMPLITUDE: f32 = 0.1;

/// Build a fresh field for `params.grid_size`, filled with low-amplitude
/// seeded noise in row-major order so that two engines sharing `(params,
/// seed)` start bit-identically.
pub fn init_field(params: &Parameters, seed: u32) -> Field {
    let mut rng = Mulberry32::new(seed);
    let mut field = Field::zeros(params.grid_size).expect("grid_size already validated");
    for cell in field.as_mut_slice() {
        *cell = rng.range_f32(-INIT_AMPLITUDE, INIT_AMPLITUDE);
    }
    field
}
