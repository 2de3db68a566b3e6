//! Driftfield: a 2D scalar-field simulation engine with five composable
//! local operators, derived structural field maps, attractor basin
//! labelling, trend/event diagnostics, history/playback, and a seedable
//! perturbation and determinism-checking toolkit.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all driftfield sub-crates. For most users, adding `driftfield` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use driftfield::prelude::*;
//!
//! let mut driver = Driver::new(Parameters::default(), 42);
//! for _ in 0..10 {
//!     driver.step_once();
//! }
//! assert_eq!(driver.current_step(), 10);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `driftfield-core` | Field storage, parameters, PRNG, ids, hashing |
//! | [`space`] | `driftfield-space` | Stencils: Laplacian, gradient, blur, neighbours |
//! | [`ops`] | `driftfield-ops` | The field stepper, derived fields, basin labeller |
//! | [`metrics`] | `driftfield-metrics` | Signature and rolling trend aggregation |
//! | [`events`] | `driftfield-events` | Structural event detection and log |
//! | [`history`] | `driftfield-history` | Ring-buffer history and playback |
//! | [`perturb`] | `driftfield-perturb` | The six perturbation kernels |
//! | [`driver`] | `driftfield-driver` | The [`Driver`], export surface, determinism check |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Field storage, parameters, PRNG, ids, and hashing (`driftfield-core`).
pub use driftfield_core as core;

/// Local stencils: Laplacian, gradient, Gaussian blur, neighbours (`driftfield-space`).
pub use driftfield_space as space;

/// The field stepper, derived-field maps, and basin labeller (`driftfield-ops`).
pub use driftfield_ops as ops;

/// Signature and rolling-window trend metrics (`driftfield-metrics`).
pub use driftfield_metrics as metrics;

/// Structural event detection and the bounded event log (`driftfield-events`).
pub use driftfield_events as events;

/// Ring-buffer history and read-only playback (`driftfield-history`).
pub use driftfield_history as history;

/// The six perturbation kernels and their residual decay queue (`driftfield-perturb`).
pub use driftfield_perturb as perturb;

/// The [`Driver`], export surface, and determinism check (`driftfield-driver`).
pub use driftfield_driver as driver;

pub use driftfield_driver::Driver;

/// Common imports for typical driftfield usage.
///
/// ```rust
/// use driftfield::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use driftfield_core::{Field, Mode, Parameters, ParametersPatch};

    // Derived fields and basins
    pub use driftfield_ops::{BasinMap, DerivedFieldType};

    // Metrics
    pub use driftfield_metrics::{Signature, TrendMetrics};

    // Events
    pub use driftfield_events::{EventExportFormat, StructuralEvent, StructuralEventKind};

    // Perturbation kernels
    pub use driftfield_perturb::{
        DriftParams, FractureParams, ImpulseParams, PerturbationParams, RotationDirection,
        ShearParams, VortexParams, WaveParams,
    };

    // Driver
    pub use driftfield_driver::{DeterminismReport, Driver, ProbeData, StepDiagnostics};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn facade_drives_a_short_run() {
        let mut driver = Driver::new(Parameters::default(), 1);
        for _ in 0..5 {
            driver.step_once();
        }
        assert_eq!(driver.current_step(), 5);
        let _ = driver.signature();
    }
}
