//! Shared byte accounting for buffered sensor payloads
//!
//! Cloneable handle over atomic counters; the engine charges payload
//! bytes as messages enter the frontend and flushes the account when
//! sim time moves past the stale-data horizon.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

#[derive(Debug, Default)]
struct Inner {
    current: AtomicU64,
    peak: AtomicU64,
    flushes: AtomicU64,
}

/// Cheap-to-clone tracker handle
#[derive(Debug, Clone, Default)]
pub struct MemoryTracker {
    inner: Arc<Inner>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge `bytes` to the account.
    pub fn charge(&self, bytes: u64) {
        let now = self.inner.current.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.inner.peak.fetch_max(now, Ordering::Relaxed);
    }

    /// Release previously charged bytes.
    pub fn release(&self, bytes: u64) {
        let mut current = self.inner.current.load(Ordering::Relaxed);
        loop {
            let next = current.saturating_sub(bytes);
            match self.inner.current.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    pub fn bytes_in_use(&self) -> u64 {
        self.inner.current.load(Ordering::Relaxed)
    }

    pub fn peak_bytes(&self) -> u64 {
        self.inner.peak.load(Ordering::Relaxed)
    }

    /// Drop everything currently charged; returns the reclaimed bytes.
    pub fn flush(&self) -> u64 {
        let reclaimed = self.inner.current.swap(0, Ordering::Relaxed);
        self.inner.flushes.fetch_add(1, Ordering::Relaxed);
        debug!(reclaimed, "memory tracker flushed");
        reclaimed
    }

    pub fn flush_count(&self) -> u64 {
        self.inner.flushes.load(Ordering::Relaxed)
    }

    /// Final flush plus a summary line.
    pub fn shutdown(&self) {
        let reclaimed = self.flush();
        info!(
            reclaimed,
            peak = self.peak_bytes(),
            flushes = self.flush_count(),
            "memory tracker shut down"
        );
    }
}
