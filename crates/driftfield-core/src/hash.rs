//! Deterministic 32-bit frame hashing, used by the determinism check and
//! exposed to hosts as a cheap per-frame fingerprint.
//!
//! Uses FNV-1a, the same family of hash the field is fingerprinted with
//! throughout this engine's lineage, folded down to 32 bits and rendered
//! as lowercase hex.

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET_32: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime.
const FNV_PRIME_32: u32 = 0x0100_0193;

#[inline]
fn fnv1a_byte(hash: u32, byte: u8) -> u32 {
    (hash ^ byte as u32).wrapping_mul(FNV_PRIME_32)
}

#[inline]
fn fnv1a_u32(mut hash: u32, v: u32) -> u32 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(mut hash: u32, v: u64) -> u32 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Compute the 32-bit frame hash of `(step, grid)`.
///
/// Folds in the step counter first so that two otherwise-identical grids
/// observed at different steps hash differently, then every cell's
/// `f32::to_bits()` in row-major order.
pub fn frame_hash(step: u64, grid: &[f32]) -> u32 {
    let mut hash = fnv1a_u64(FNV_OFFSET_32, step);
    for &v in grid {
        hash = fnv1a_u32(hash, v.to_bits());
    }
    hash
}

/// Render a frame hash as the canonical lowercase 8-hex-character string.
pub fn frame_hash_hex(step: u64, grid: &[f32]) -> String {
    format!("{:08x}", frame_hash(step, grid))
}

/// Hash a configuration (seed plus grid dimensions) for quick mismatch
/// detection before a determinism check compares full frames.
pub fn config_hash(seed: u32, grid_size: u32, dt_bits: u32) -> u32 {
    let mut hash = fnv1a_u32(FNV_OFFSET_32, seed);
    hash = fnv1a_u32(hash, grid_size);
    fnv1a_u32(hash, dt_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_grid_same_hash() {
        let grid = vec![0.1f32, 0.2, -0.3, 0.0];
        assert_eq!(frame_hash(5, &grid), frame_hash(5, &grid));
    }

    #[test]
    fn different_step_different_hash() {
        let grid = vec![0.1f32, 0.2];
        assert_ne!(frame_hash(1, &grid), frame_hash(2, &grid));
    }

    #[test]
    fn different_cell_different_hash() {
        let a = vec![0.1f32, 0.2, 0.3];
        let b = vec![0.1f32, 0.2, 0.30001];
        assert_ne!(frame_hash(0, &a), frame_hash(0, &b));
    }

    #[test]
    fn hex_is_eight_lowercase_chars() {
        let grid = vec![1.0f32, 2.0];
        let hex = frame_hash_hex(3, &grid);
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn empty_grid_hash_is_deterministic() {
        let empty: Vec<f32> = vec![];
        assert_eq!(frame_hash(0, &empty), frame_hash(0, &empty));
    }
}
