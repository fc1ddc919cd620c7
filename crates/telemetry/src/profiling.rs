//! Monotonic micro-timestamps and the binary span trace
//!
//! All latency math in the harness uses this clock; the sim-time base
//! from the log never mixes into it. The recorded spans are dumped as
//! a bincode stream for offline inspection.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use contracts::EvalError;
use serde::Serialize;
use tracing::info;

/// One timed span
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpanRecord {
    pub label: &'static str,
    pub start_us: u64,
    pub end_us: u64,
}

/// Span recorder with a private monotonic origin
pub struct Profiler {
    origin: Instant,
    spans: Vec<SpanRecord>,
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            spans: Vec::new(),
        }
    }

    /// Microseconds since the profiler was created.
    pub fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    pub fn record(&mut self, label: &'static str, start_us: u64, end_us: u64) {
        self.spans.push(SpanRecord {
            label,
            start_us,
            end_us,
        });
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Serialize the span trace to `path`.
    pub fn dump(&self, path: &Path) -> Result<(), EvalError> {
        let file = File::create(path)
            .map_err(|e| EvalError::sink_write("profiling", e.to_string()))?;
        bincode::serialize_into(BufWriter::new(file), &self.spans)
            .map_err(|e| EvalError::sink_write("profiling", e.to_string()))?;
        info!(spans = self.spans.len(), path = %path.display(), "profiling trace dumped");
        Ok(())
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
