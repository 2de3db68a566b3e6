//! The [`Driver`]: wires the field, operator bank, derived fields, basins,
//! trend/event tracking, history, and perturbation queue into one
//! steppable engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod determinism;
pub mod diagnostics;
pub mod driver;
pub mod export;
pub mod init;
pub mod probe;

pub use determinism::{run_determinism_check, DeterminismReport};
pub use diagnostics::StepDiagnostics;
pub use driver::Driver;
pub use export::{classify_regime, BatchSpec, ConfigExport};
pub use init::init_field;
pub use probe::{probe, ProbeData};
