//! Row types for the output tables
//!
//! Column order is frozen; downstream evaluation notebooks join these
//! tables on the sim-time column.

use std::io::{self, Write};

use contracts::{PoseSample, StateEstimate};

use crate::sinks::csv::CsvRow;

/// One estimated pose, tagged by the modality that produced it
pub struct PoseRow {
    pub update_modality: &'static str,
    pub state: StateEstimate,
}

impl CsvRow for PoseRow {
    const HEADER: &'static [&'static str] = &[
        "update_modality",
        "t",
        "estimated_p_x",
        "estimated_p_y",
        "estimated_p_z",
        "estimated_q_x",
        "estimated_q_y",
        "estimated_q_z",
        "estimated_q_w",
    ];

    fn write_row<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let s = &self.state;
        write!(
            w,
            "{},{},{},{},{},{},{},{},{}",
            self.update_modality,
            s.t,
            s.position.x,
            s.position.y,
            s.position.z,
            s.orientation.x,
            s.orientation.y,
            s.orientation.z,
            s.orientation.w
        )
    }
}

/// Estimated inertial biases
///
/// The sigma columns stay zero: bias covariance extraction is
/// disabled, but the schema keeps the columns so existing readers
/// keep working.
pub struct ImuBiasRow {
    pub state: StateEstimate,
}

impl CsvRow for ImuBiasRow {
    const HEADER: &'static [&'static str] = &[
        "t",
        "b_a_x",
        "b_a_y",
        "b_a_z",
        "b_w_x",
        "b_w_y",
        "b_w_z",
        "sigma_b_a_x",
        "sigma_b_a_y",
        "sigma_b_a_z",
        "sigma_b_w_x",
        "sigma_b_w_y",
        "sigma_b_w_z",
    ];

    fn write_row<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let s = &self.state;
        write!(
            w,
            "{},{},{},{},{},{},{},0,0,0,0,0,0",
            s.t,
            s.accel_bias.x,
            s.accel_bias.y,
            s.accel_bias.z,
            s.gyro_bias.x,
            s.gyro_bias.y,
            s.gyro_bias.z
        )
    }
}

/// One ground-truth pose
pub struct GtRow {
    pub sample: PoseSample,
}

impl CsvRow for GtRow {
    const HEADER: &'static [&'static str] =
        &["t", "p_x", "p_y", "p_z", "q_x", "q_y", "q_z", "q_w"];

    fn write_row<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let s = &self.sample;
        write!(
            w,
            "{},{},{},{},{},{},{},{}",
            s.t,
            s.position.x,
            s.position.y,
            s.position.z,
            s.orientation.x,
            s.orientation.y,
            s.orientation.z,
            s.orientation.w
        )
    }
}

/// Per-message processing latency, correlating sim time with the
/// accumulated processing clock
pub struct RealtimeRow {
    /// Message timestamp (log time base, seconds)
    pub t_sim: f64,

    /// Accumulated processing time when the message finished (seconds)
    pub t_real: f64,

    /// Monotonic profiling timestamp at row emission (µs)
    pub ts_real: u64,

    pub processing_type: &'static str,

    /// This message's dispatch latency (µs)
    pub process_time_in_us: u64,
}

impl CsvRow for RealtimeRow {
    const HEADER: &'static [&'static str] = &[
        "t_sim",
        "t_real",
        "ts_real",
        "processing_type",
        "process_time_in_us",
    ];

    fn write_row<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(
            w,
            "{},{},{},{},{}",
            self.t_sim, self.t_real, self.ts_real, self.processing_type, self.process_time_in_us
        )
    }
}

/// Periodic process-level resource snapshot
pub struct ResourceRow {
    /// Monotonic profiling timestamp (µs)
    pub ts: u64,

    pub cpu_usage: f64,
    pub cpu_user_mode_usage: f64,
    pub cpu_kernel_mode_usage: f64,
    pub memory_usage_in_bytes: u64,

    /// Bytes currently accounted by the in-process tracker
    pub debug_memory_in_bytes: u64,
}

impl CsvRow for ResourceRow {
    const HEADER: &'static [&'static str] = &[
        "ts",
        "cpu_usage",
        "cpu_user_mode_usage",
        "cpu_kernel_mode_usage",
        "memory_usage_in_bytes",
        "debug_memory_in_bytes",
    ];

    fn write_row<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(
            w,
            "{},{},{},{},{},{}",
            self.ts,
            self.cpu_usage,
            self.cpu_user_mode_usage,
            self.cpu_kernel_mode_usage,
            self.memory_usage_in_bytes,
            self.debug_memory_in_bytes
        )
    }
}
