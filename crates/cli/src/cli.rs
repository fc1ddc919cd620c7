//! CLI argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// vio-bench - offline replay harness for visual-inertial estimators
#[derive(Parser, Debug)]
#[command(
    name = "vio-bench",
    author,
    version,
    about = "Offline sensor-log replay harness for VIO frontends",
    long_about = "Replays a recorded multi-modal sensor log (inertial samples, camera \n\
                  frames, event bursts, ground-truth poses) through a selected \n\
                  estimator frontend and writes correlated CSV tables plus \n\
                  CPU/memory/latency telemetry into the output folder."
)]
pub struct Cli {
    /// Recorded log directory (contains manifest.json)
    #[arg(short, long, env = "VIO_BENCH_INPUT")]
    pub input: PathBuf,

    /// Inertial stream topic
    #[arg(long, default_value = "/imu", env = "VIO_BENCH_IMU_TOPIC")]
    pub imu_topic: String,

    /// Camera frame topic
    #[arg(long, default_value = "/cam0/image_raw", env = "VIO_BENCH_IMAGE_TOPIC")]
    pub image_topic: String,

    /// Event-camera topic; unset disables event routing
    #[arg(long, env = "VIO_BENCH_EVENTS_TOPIC")]
    pub events_topic: Option<String>,

    /// Ground-truth pose topic; unset disables gt.csv
    #[arg(long, env = "VIO_BENCH_POSE_TOPIC")]
    pub pose_topic: Option<String>,

    /// Estimator parameter file (YAML)
    #[arg(short, long, env = "VIO_BENCH_PARAMS")]
    pub params_file: PathBuf,

    /// Output folder for CSV tables and telemetry (created if absent)
    #[arg(short, long, env = "VIO_BENCH_OUTPUT")]
    pub output_folder: Option<PathBuf>,

    /// Replay window start (sim-time seconds, inclusive)
    #[arg(long)]
    pub from: Option<f64>,

    /// Replay window end (sim-time seconds, inclusive)
    #[arg(long)]
    pub to: Option<f64>,

    /// Dump input frames as PNGs under <out>/frames/input/
    #[arg(long)]
    pub dump_input_frames: bool,

    /// Dump feature-annotated frames as PNGs under <out>/frames/debug/
    #[arg(long)]
    pub dump_debug_frames: bool,

    /// Frontend to replay through (xvio, eklt, evio, haste)
    #[arg(long, default_value = "xvio", env = "VIO_BENCH_FRONTEND")]
    pub frontend: String,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, env = "VIO_BENCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        env = "VIO_BENCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}
