//! Ring buffer of frame snapshots and read-only playback for driftfield.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ring;
pub mod snapshot;

pub use ring::{History, HISTORY_CAPACITY};
pub use snapshot::FrameSnapshot;
