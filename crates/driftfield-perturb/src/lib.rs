//! The six perturbation kernels and their residual decay queue.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod apply;
pub mod kernel;
pub mod residual;

pub use apply::{apply_impulse, apply_vortex, saturate};
pub use kernel::{
    DriftParams, FractureParams, ImpulseParams, PerturbationKind, PerturbationParams,
    RotationDirection, ShearParams, VortexParams, WaveParams,
};
pub use residual::{PendingResidual, ResidualQueue};
