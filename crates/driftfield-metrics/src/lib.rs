//! Signature and rolling-window trend metrics for the driftfield engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod signature;
pub mod trend;

pub use signature::{compute_signature, Signature};
pub use trend::{StabilityClass, TrendMetrics, TrendSample, TrendTracker, DEFAULT_WINDOW};
