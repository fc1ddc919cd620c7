//! Replay Engine - the main loop
//!
//! Lifecycle: `new` -> `set_up` -> `run`. `set_up` opens the output
//! tables and takes the resource baseline; `run` consumes one merged
//! view, dispatches every record, and always flushes on the way out,
//! error or not.
//!
//! Row gating: pose/bias/realtime rows are emitted only once the
//! frontend reports readiness, starting with the message that flipped
//! it. Resource rows are keyed to accumulated processing time, never
//! wall time.

use std::mem::size_of;
use std::path::PathBuf;
use std::time::Instant;

use contracts::{
    EvalError, Frontend, Params, PixelEvent, PoseSample, ReplayWindow, SensorMessage, TiledImage,
};
use dispatcher::{
    DispatchRouter, FrameDumper, GtRow, ImuBiasRow, PoseRow, ProcessKind, RealtimeRow,
    ResourceRow, Routed, RouterConfig, TableSet,
};
use log_store::LogReader;
use metrics::{counter, histogram};
use telemetry::{MemoryTracker, Profiler, ResourceSampler};
use tracing::{info, warn};

use crate::stats::ReplayStats;

/// Interval of accumulated processing time between resource rows (µs)
const RESOURCE_INTERVAL_US: u64 = 1_000_000;

/// Sim-time horizon after which buffered payload accounting is flushed
const STALE_FLUSH_SEC: f64 = 5.0;

/// Everything `run` needs beyond the log itself
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub router: RouterConfig,
    pub window: ReplayWindow,
    pub out_dir: PathBuf,
    pub dump_input_frames: bool,
    pub dump_debug_frames: bool,
}

pub struct ReplayEngine {
    config: EngineConfig,
    params: Params,
    frontend: Box<dyn Frontend>,
    router: DispatchRouter,
    tables: Option<TableSet>,
    dumper: Option<FrameDumper>,
    sampler: Option<ResourceSampler>,
    tracker: MemoryTracker,
    profiler: Profiler,
    stats: ReplayStats,

    calc_time_us: u64,
    next_resource_mark_us: u64,
    latched: bool,
    last_flush_t: Option<f64>,
}

impl ReplayEngine {
    pub fn new(frontend: Box<dyn Frontend>, params: Params, config: EngineConfig) -> Self {
        let router = DispatchRouter::new(config.router.clone(), params.clone());
        Self {
            config,
            params,
            frontend,
            router,
            tables: None,
            dumper: None,
            sampler: None,
            tracker: MemoryTracker::new(),
            profiler: Profiler::new(),
            stats: ReplayStats::default(),
            calc_time_us: 0,
            next_resource_mark_us: RESOURCE_INTERVAL_US,
            latched: false,
            last_flush_t: None,
        }
    }

    /// Open sinks and take the resource baseline.
    pub fn set_up(&mut self) -> Result<(), EvalError> {
        self.frontend.set_up(&self.params);
        self.tables = Some(TableSet::open(
            &self.config.out_dir,
            self.config.router.pose_topic.is_some(),
        )?);
        self.dumper = Some(FrameDumper::new(
            &self.config.out_dir,
            self.config.dump_input_frames,
            self.config.dump_debug_frames,
        )?);
        self.sampler = Some(ResourceSampler::new()?);
        Ok(())
    }

    /// Shared tracker handle, for inspection after the run
    pub fn tracker(&self) -> MemoryTracker {
        self.tracker.clone()
    }

    /// Replay the whole view. Flushes all sinks before returning, on
    /// both the success and the error path.
    pub fn run(&mut self, reader: &LogReader) -> Result<ReplayStats, EvalError> {
        let started = Instant::now();
        let result = self.process_log(reader);
        self.stats.wall_time_us = started.elapsed().as_micros() as u64;
        self.stats.calc_time_us = self.calc_time_us;

        let flushed = self.finish();
        result.and(flushed)?;

        self.stats.log_summary();
        Ok(self.stats)
    }

    fn process_log(&mut self, reader: &LogReader) -> Result<(), EvalError> {
        let topics = self.selected_topics();
        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        let mut view = reader.view(&topic_refs, self.config.window)?;

        let Some(t0) = view.peek_time() else {
            warn!("no records inside the replay window, nothing to do");
            return Ok(());
        };
        self.frontend.init_at_time(t0);
        info!(
            t0,
            expected = view.expected_messages(),
            "replay started"
        );

        for item in view {
            let msg = match item {
                Ok(msg) => msg,
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "skipping unreadable record");
                    counter!("replay_skipped_total").increment(1);
                    self.stats.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.handle_message(msg)?;
        }
        Ok(())
    }

    fn handle_message(&mut self, msg: contracts::TimedMessage) -> Result<(), EvalError> {
        self.tracker.charge(payload_bytes(&msg.message));
        self.flush_stale(msg.t);

        let start_us = self.profiler.now_micros();
        let routed = self.router.dispatch(self.frontend.as_mut(), &msg);
        let end_us = self.profiler.now_micros();
        let latency_us = end_us - start_us;

        match routed {
            Routed::Estimate { kind, state } => {
                self.count(kind);
                self.profiler.record(kind.label(), start_us, end_us);
                histogram!("replay_dispatch_latency_us").record(latency_us as f64);

                if !self.latched && self.frontend.is_initialized() {
                    self.latched = true;
                    info!(t = msg.t, "frontend initialized, output latch open");
                }
                if self.latched {
                    self.calc_time_us += latency_us;
                    self.stats.post_latch_updates += 1;
                    self.emit_estimate_rows(kind, &state, msg.t, end_us, latency_us)?;
                    self.emit_due_resource_row()?;
                }
                if kind == ProcessKind::Image {
                    self.dump_frames(&msg.message);
                }
            }
            Routed::GroundTruth(samples) => {
                self.stats.pose_messages += 1;
                self.emit_gt_rows(&samples)?;
            }
            Routed::Skipped => {
                self.stats.skipped += 1;
            }
        }
        Ok(())
    }

    fn selected_topics(&self) -> Vec<String> {
        // registration order doubles as the tie-break order
        let r = &self.config.router;
        let mut topics = vec![r.imu_topic.clone(), r.image_topic.clone()];
        topics.extend(r.events_topic.clone());
        topics.extend(r.pose_topic.clone());
        topics
    }

    fn count(&mut self, kind: ProcessKind) {
        match kind {
            ProcessKind::Imu => self.stats.imu_messages += 1,
            ProcessKind::Image => self.stats.image_messages += 1,
            ProcessKind::Events => self.stats.event_messages += 1,
        }
    }

    fn emit_estimate_rows(
        &mut self,
        kind: ProcessKind,
        state: &contracts::StateEstimate,
        t_sim: f64,
        ts_real_us: u64,
        latency_us: u64,
    ) -> Result<(), EvalError> {
        let tables = self.tables.as_mut().ok_or_else(not_set_up)?;
        tables.pose.add_row(&PoseRow {
            update_modality: kind.label(),
            state: *state,
        })?;
        tables.imu_bias.add_row(&ImuBiasRow { state: *state })?;
        tables.realtime.add_row(&RealtimeRow {
            t_sim,
            t_real: self.calc_time_us as f64 / 1e6,
            ts_real: ts_real_us,
            processing_type: kind.label(),
            process_time_in_us: latency_us,
        })?;
        self.stats.pose_rows += 1;
        self.stats.bias_rows += 1;
        self.stats.realtime_rows += 1;
        Ok(())
    }

    fn emit_gt_rows(&mut self, samples: &[PoseSample]) -> Result<(), EvalError> {
        let tables = self.tables.as_mut().ok_or_else(not_set_up)?;
        let Some(gt) = tables.gt.as_mut() else {
            return Ok(());
        };
        for sample in samples {
            gt.add_row(&GtRow { sample: *sample })?;
            self.stats.gt_rows += 1;
        }
        Ok(())
    }

    /// Emit at most one resource row per call, once accumulated
    /// processing time passes the next mark. The mark is re-seated off
    /// the current accumulated time, so a single slow dispatch that
    /// crosses several intervals still yields one row with a sane wall
    /// delta behind its CPU percentages.
    fn emit_due_resource_row(&mut self) -> Result<(), EvalError> {
        if self.calc_time_us < self.next_resource_mark_us {
            return Ok(());
        }
        let sampler = self.sampler.as_mut().ok_or_else(not_set_up)?;
        let sample = sampler.sample(self.profiler.now_micros(), self.tracker.bytes_in_use())?;
        let tables = self.tables.as_mut().ok_or_else(not_set_up)?;
        tables.resource.add_row(&ResourceRow {
            ts: sample.ts_us,
            cpu_usage: sample.cpu_pct,
            cpu_user_mode_usage: sample.cpu_user_pct,
            cpu_kernel_mode_usage: sample.cpu_kernel_pct,
            memory_usage_in_bytes: sample.memory_bytes,
            debug_memory_in_bytes: sample.tracked_bytes,
        })?;
        self.stats.resource_rows += 1;
        self.next_resource_mark_us = self.calc_time_us + RESOURCE_INTERVAL_US;
        Ok(())
    }

    /// Flush payload accounting whenever sim time moves past the
    /// stale horizon.
    fn flush_stale(&mut self, t_sim: f64) {
        match self.last_flush_t {
            None => self.last_flush_t = Some(t_sim),
            Some(mark) if t_sim - mark > STALE_FLUSH_SEC => {
                self.tracker.flush();
                self.last_flush_t = Some(t_sim);
            }
            Some(_) => {}
        }
    }

    fn dump_frames(&mut self, message: &SensorMessage) {
        let Some(dumper) = self.dumper.as_ref() else {
            return;
        };
        if !dumper.active() {
            return;
        }
        if let SensorMessage::Image(frame) = message {
            let input = TiledImage::from_frame(frame, &self.params);
            if let Err(e) = dumper.dump_input(&input) {
                warn!(error = %e, "input frame dump failed");
            }
        }
        if let Err(e) = dumper.dump_debug(self.router.feature_img()) {
            warn!(error = %e, "debug frame dump failed");
        }
    }

    fn finish(&mut self) -> Result<(), EvalError> {
        let flushed = match self.tables.as_mut() {
            Some(tables) => tables.flush_all(),
            None => Ok(()),
        };
        let dumped = self.profiler.dump(&self.config.out_dir.join("profiling.bin"));
        self.tracker.shutdown();
        flushed.and(dumped)
    }
}

fn not_set_up() -> EvalError {
    EvalError::Other("engine used before set_up".into())
}

fn payload_bytes(message: &SensorMessage) -> u64 {
    match message {
        SensorMessage::Imu(_) => size_of::<contracts::ImuSample>() as u64,
        SensorMessage::Image(frame) => frame.data.len() as u64,
        SensorMessage::Events(burst) => (burst.events.len() * size_of::<PixelEvent>()) as u64,
        SensorMessage::Pose(_) => size_of::<PoseSample>() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontends::MockFrontend;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn write_imu_log(n: usize, dt: f64) -> TempDir {
        let dir = tempdir().unwrap();
        let lines: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"t": {}, "seq": {i}, "angular_velocity": [0,0,0], "linear_acceleration": [0,0,9.81]}}"#,
                    i as f64 * dt
                )
            })
            .collect();
        fs::write(
            dir.path().join("manifest.json"),
            format!(
                r#"{{"version": "1", "duration_sec": {}, "streams": {{
                    "/imu": {{"file": "imu.jsonl", "kind": "imu", "message_count": {n}}}
                }}}}"#,
                n as f64 * dt
            ),
        )
        .unwrap();
        fs::write(dir.path().join("imu.jsonl"), lines.join("\n")).unwrap();
        dir
    }

    fn config(out: &Path) -> EngineConfig {
        EngineConfig {
            router: RouterConfig {
                imu_topic: "/imu".into(),
                image_topic: "/cam0/image_raw".into(),
                events_topic: None,
                pose_topic: None,
            },
            window: ReplayWindow::unbounded(),
            out_dir: out.to_path_buf(),
            dump_input_frames: false,
            dump_debug_frames: false,
        }
    }

    fn row_count(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count() - 1
    }

    #[test]
    fn test_latch_gates_output_rows() {
        let log = write_imu_log(10, 0.01);
        let out = tempdir().unwrap();

        let frontend = MockFrontend::new().with_init_after(5);
        let mut engine = ReplayEngine::new(
            Box::new(frontend),
            Params {
                img_width: 4,
                img_height: 4,
                ..Default::default()
            },
            config(out.path()),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        let stats = engine.run(&reader).unwrap();

        assert_eq!(stats.imu_messages, 10);
        // message 5 flips readiness, rows start there
        assert_eq!(stats.post_latch_updates, 6);
        assert_eq!(row_count(&out.path().join("pose.csv")), 6);
        assert_eq!(row_count(&out.path().join("imu_bias.csv")), 6);
        assert_eq!(row_count(&out.path().join("realtime.csv")), 6);
    }

    #[test]
    fn test_no_gt_topic_means_no_gt_file() {
        let log = write_imu_log(3, 0.01);
        let out = tempdir().unwrap();

        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            Params {
                img_width: 4,
                img_height: 4,
                ..Default::default()
            },
            config(out.path()),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        engine.run(&reader).unwrap();

        assert!(!out.path().join("gt.csv").exists());
        assert!(out.path().join("profiling.bin").exists());
    }

    #[test]
    fn test_empty_window_produces_headers_only() {
        let log = write_imu_log(10, 0.01);
        let out = tempdir().unwrap();

        let mut cfg = config(out.path());
        cfg.window = ReplayWindow::new(50.0, 60.0).unwrap();
        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            Params {
                img_width: 4,
                img_height: 4,
                ..Default::default()
            },
            cfg,
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        let stats = engine.run(&reader).unwrap();

        assert_eq!(stats.total_messages(), 0);
        assert_eq!(row_count(&out.path().join("pose.csv")), 0);
    }

    #[test]
    fn test_resource_rows_follow_processing_time_not_wall_time() {
        let out = tempdir().unwrap();
        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            Params {
                img_width: 4,
                img_height: 4,
                ..Default::default()
            },
            config(out.path()),
        );
        engine.set_up().unwrap();
        engine.latched = true;

        // below one full interval of accumulated processing time
        engine.calc_time_us = 999_999;
        engine.emit_due_resource_row().unwrap();
        assert_eq!(engine.stats.resource_rows, 0);

        // one slow dispatch crossing two marks still yields one row,
        // with the mark re-seated off the accumulated time
        engine.calc_time_us = 2_500_000;
        engine.emit_due_resource_row().unwrap();
        assert_eq!(engine.stats.resource_rows, 1);
        assert_eq!(engine.next_resource_mark_us, 3_500_000);

        engine.calc_time_us = 3_499_999;
        engine.emit_due_resource_row().unwrap();
        assert_eq!(engine.stats.resource_rows, 1);

        engine.calc_time_us = 3_500_000;
        engine.emit_due_resource_row().unwrap();
        assert_eq!(engine.stats.resource_rows, 2);

        engine.finish().unwrap();
        assert_eq!(row_count(&out.path().join("resource.csv")), 2);
    }

    #[test]
    fn test_set_up_configures_frontend_exactly_once() {
        let log = write_imu_log(3, 0.01);
        let out = tempdir().unwrap();

        let mock = MockFrontend::new();
        let calls = mock.log();
        let mut engine = ReplayEngine::new(
            Box::new(mock),
            Params {
                img_width: 4,
                img_height: 4,
                ..Default::default()
            },
            config(out.path()),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        engine.run(&reader).unwrap();

        assert_eq!(calls.set_up_count(), 1);
    }

    #[test]
    fn test_run_without_set_up_fails() {
        let log = write_imu_log(1, 0.01);
        let out = tempdir().unwrap();
        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            Params::default(),
            config(out.path()),
        );
        let reader = LogReader::open(log.path()).unwrap();
        assert!(engine.run(&reader).is_err());
    }
}
