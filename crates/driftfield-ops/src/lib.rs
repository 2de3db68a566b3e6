//! The field stepper, derived-field maps, and basin labeller.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod basin;
pub mod derived;
pub mod stepper;

pub use basin::BasinMap;
pub use derived::{DerivedField, DerivedFieldEngine, DerivedFieldType};
pub use stepper::{step, StepOutcome};
