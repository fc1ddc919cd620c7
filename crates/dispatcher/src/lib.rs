//! # Dispatcher
//!
//! Message fan-out for the replay loop.
//!
//! Responsibilities:
//! - classify each merged record by topic
//! - convert raw frames into the tiled representation
//! - invoke the matching frontend operation
//! - append result rows to the typed CSV sinks
//!
//! Per-message failures (size mismatch, unexpected payload shape) are
//! logged and skipped; only sink write failures abort a run.

pub mod router;
pub mod sinks;

pub use router::{DispatchRouter, ProcessKind, Routed, RouterConfig};
pub use sinks::csv::{CsvRow, CsvSink};
pub use sinks::frames::FrameDumper;
pub use sinks::rows::{GtRow, ImuBiasRow, PoseRow, RealtimeRow, ResourceRow};
pub use sinks::TableSet;
