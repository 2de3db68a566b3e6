//! Error types for the driftfield core crate.

use std::error::Error;
use std::fmt;

/// Errors returned by field-level operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// A requested grid resize fell outside the supported range.
    InvalidGridSize {
        /// The rejected size.
        requested: u32,
        /// The supported inclusive range, as `(min, max)`.
        allowed: (u32, u32),
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGridSize { requested, allowed } => write!(
                f,
                "grid size {requested} outside supported range [{}, {}]",
                allowed.0, allowed.1
            ),
        }
    }
}

impl Error for CoreError {}
