//! Structural event detection and the bounded in-memory event log.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod detector;
pub mod event;
pub mod log;

pub use detector::EventDetector;
pub use event::{Location, PendingEvent, StructuralEvent, StructuralEventKind};
pub use log::{EventExportFormat, EventLog, EVENT_LOG_CAPACITY};
