//! # Log Store
//!
//! Recorded sensor-log container and the Stream Merger.
//!
//! A log is a directory holding:
//! - `manifest.json` describing the recorded streams
//! - one JSONL file per stream, records sorted by timestamp
//! - raw binary frame payloads referenced by `data_file`
//!
//! [`LogReader::view`] produces a lazy, single-pass, globally
//! time-ordered merge of the selected streams, restricted to a
//! [`contracts::ReplayWindow`].

mod format;
mod merge;
mod reader;

pub use format::{Manifest, StreamEntry, StreamKind};
pub use merge::MergedView;
pub use reader::LogReader;
