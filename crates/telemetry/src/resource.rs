//! CPU and memory snapshots via `getrusage(RUSAGE_SELF)`
//!
//! Percentages are computed over the wall-clock interval since the
//! previous sample, so the first sample after construction covers the
//! whole run so far.

use std::mem::MaybeUninit;
use std::time::Instant;

use contracts::EvalError;
use tracing::trace;

/// One process-level resource snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    /// Monotonic profiling timestamp (µs)
    pub ts_us: u64,

    /// Total CPU usage over the sampling interval (percent)
    pub cpu_pct: f64,

    /// User-mode share (percent)
    pub cpu_user_pct: f64,

    /// Kernel-mode share (percent)
    pub cpu_kernel_pct: f64,

    /// Peak resident set size (bytes)
    pub memory_bytes: u64,

    /// Bytes accounted by the in-process tracker
    pub tracked_bytes: u64,
}

fn timeval_us(tv: libc::timeval) -> u64 {
    tv.tv_sec as u64 * 1_000_000 + tv.tv_usec as u64
}

fn query_rusage() -> Result<libc::rusage, EvalError> {
    let mut usage = MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: RUSAGE_SELF with a properly sized out-pointer
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return Err(EvalError::resource_query(format!(
            "getrusage returned {}",
            std::io::Error::last_os_error()
        )));
    }
    // SAFETY: initialized by the successful call above
    Ok(unsafe { usage.assume_init() })
}

/// Interval-based CPU/RSS sampler
pub struct ResourceSampler {
    last_wall: Instant,
    last_user_us: u64,
    last_kernel_us: u64,
}

impl ResourceSampler {
    /// Take the baseline reading.
    pub fn new() -> Result<Self, EvalError> {
        let usage = query_rusage()?;
        Ok(Self {
            last_wall: Instant::now(),
            last_user_us: timeval_us(usage.ru_utime),
            last_kernel_us: timeval_us(usage.ru_stime),
        })
    }

    /// Snapshot usage since the previous call.
    pub fn sample(&mut self, ts_us: u64, tracked_bytes: u64) -> Result<ResourceSample, EvalError> {
        let usage = query_rusage()?;
        let now = Instant::now();

        let user_us = timeval_us(usage.ru_utime);
        let kernel_us = timeval_us(usage.ru_stime);
        let wall_us = now.duration_since(self.last_wall).as_micros() as u64;

        let pct = |delta_us: u64| {
            if wall_us == 0 {
                0.0
            } else {
                100.0 * delta_us as f64 / wall_us as f64
            }
        };
        let cpu_user_pct = pct(user_us.saturating_sub(self.last_user_us));
        let cpu_kernel_pct = pct(kernel_us.saturating_sub(self.last_kernel_us));

        self.last_wall = now;
        self.last_user_us = user_us;
        self.last_kernel_us = kernel_us;

        // ru_maxrss is in kilobytes on Linux
        let memory_bytes = usage.ru_maxrss as u64 * 1024;
        trace!(ts_us, memory_bytes, "resource sample taken");

        Ok(ResourceSample {
            ts_us,
            cpu_pct: cpu_user_pct + cpu_kernel_pct,
            cpu_user_pct,
            cpu_kernel_pct,
            memory_bytes,
            tracked_bytes,
        })
    }
}
