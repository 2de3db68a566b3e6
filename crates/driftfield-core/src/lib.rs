//! Core types for the driftfield scalar-field engine.
//!
//! This is the leaf crate with zero internal driftfield dependencies. It
//! defines the field storage, parameter set, identifiers, the Mulberry32
//! PRNG, and the frame-hashing primitive shared by every other crate in
//! the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod hash;
pub mod id;
pub mod parameters;
pub mod rng;

pub use error::CoreError;
pub use field::{Field, MAX_GRID_SIZE, MIN_GRID_SIZE};
pub use hash::{config_hash, frame_hash, frame_hash_hex};
pub use id::{EventId, ParamGeneration, StepId};
pub use parameters::{ranges, Mode, ModeProfile, Parameters, ParametersPatch, Range};
pub use rng::Mulberry32;
