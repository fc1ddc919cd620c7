//! # Telemetry
//!
//! Process-level accounting for replay runs:
//! - [`ResourceSampler`]: CPU and RSS snapshots via `getrusage`
//! - [`MemoryTracker`]: shared in-process byte accounting
//! - [`Profiler`]: monotonic micro-timestamps and a binary span trace

pub mod memory;
pub mod profiling;
pub mod resource;

pub use memory::MemoryTracker;
pub use profiling::Profiler;
pub use resource::{ResourceSample, ResourceSampler};
