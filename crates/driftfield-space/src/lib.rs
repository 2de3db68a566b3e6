//! Toroidal grid stencils shared by the stepper, derived fields, and basin
//! labeller.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod stencil;

pub use stencil::{
    gaussian_blur, gradient, gradient_magnitude, gradient_magnitude_sq, laplacian,
    local_mean_3x3, local_variance_3x3, neighbours_8,
};
