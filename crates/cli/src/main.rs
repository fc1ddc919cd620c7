//! # vio-bench CLI
//!
//! Entry point: flag parsing, logging setup, parameter loading,
//! output-folder preparation, frontend selection, and the replay run.
//! Every fatal path logs a diagnostic and exits with code 1.

mod cli;
mod error;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::Layer;

use config_loader::ConfigLoader;
use contracts::{FrontendKind, ReplayWindow};
use log_store::LogReader;
use replay::{EngineConfig, ReplayEngine};

use cli::Cli;
use error::CliError;

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::from(1);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        "vio-bench starting"
    );

    match run(&cli) {
        Ok(()) => {
            info!(
                finished_at = %Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                "vio-bench finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = format!("{e:#}"), "run failed");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let out_dir = cli
        .output_folder
        .as_deref()
        .ok_or(CliError::OutputFolderRequired)?;

    let report = ConfigLoader::load_from_path(&cli.params_file)
        .with_context(|| format!("loading parameters from {}", cli.params_file.display()))?;
    if !report.missing.is_empty() {
        warn!(
            keys = report.missing.join(", "),
            "parameter file is missing keys, defaults apply"
        );
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output folder {}", out_dir.display()))?;
    copy_params_file(&cli.params_file, out_dir)?;

    let kind: FrontendKind = cli.frontend.parse().map_err(CliError::UnknownFrontend)?;
    let window = ReplayWindow::from_bounds(cli.from, cli.to)?;

    let frontend = frontends::build(kind);
    info!(frontend = %kind, from = window.from(), to = window.to(), "frontend selected");

    let config = EngineConfig {
        router: replay::RouterConfig {
            imu_topic: cli.imu_topic.clone(),
            image_topic: cli.image_topic.clone(),
            events_topic: cli.events_topic.clone(),
            pose_topic: cli.pose_topic.clone(),
        },
        window,
        out_dir: out_dir.to_path_buf(),
        dump_input_frames: cli.dump_input_frames,
        dump_debug_frames: cli.dump_debug_frames,
    };

    let mut engine = ReplayEngine::new(frontend, report.params, config);
    engine.set_up().context("engine setup")?;

    let reader = LogReader::open(&cli.input)
        .with_context(|| format!("opening log {}", cli.input.display()))?;
    engine.run(&reader).context("replay")?;
    Ok(())
}

/// Keep a verbatim copy of the parameter file next to the outputs, so
/// a result folder is self-describing.
fn copy_params_file(params_file: &Path, out_dir: &Path) -> Result<()> {
    let name = params_file
        .file_name()
        .unwrap_or_else(|| "params.yaml".as_ref());
    let dest = out_dir.join(name);
    fs::copy(params_file, &dest)
        .map_err(|e| CliError::params_copy(dest.display().to_string(), e.to_string()))?;
    Ok(())
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else {
        let default_level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let fmt_layer = match cli.log_format {
        cli::LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        cli::LogFormat::Pretty => fmt::layer().pretty().boxed(),
        cli::LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
