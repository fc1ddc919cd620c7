//! # Integration Tests
//!
//! End-to-end scenarios against synthetic log directories:
//! - full replay through a scripted frontend
//! - readiness-latch gating of output rows
//! - ground-truth fan-out and per-message error recovery
//! - output idempotence across identical runs

#[cfg(test)]
mod support {
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Builds a synthetic log directory record by record.
    pub struct LogBuilder {
        dir: TempDir,
        duration_sec: f64,
        // topic -> (kind, jsonl lines)
        streams: Vec<(String, &'static str, Vec<String>)>,
    }

    impl LogBuilder {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                duration_sec: 0.0,
                streams: Vec::new(),
            }
        }

        fn push(&mut self, topic: &str, kind: &'static str, line: String, t: f64) {
            self.duration_sec = self.duration_sec.max(t);
            match self
                .streams
                .iter_mut()
                .find(|(existing, _, _)| existing == topic)
            {
                Some((_, _, lines)) => lines.push(line),
                None => self.streams.push((topic.to_string(), kind, vec![line])),
            }
        }

        pub fn imu(&mut self, topic: &str, t: f64, seq: u64) -> &mut Self {
            let line = json!({
                "t": t, "seq": seq,
                "angular_velocity": [0.0, 0.0, 0.0],
                "linear_acceleration": [0.0, 0.0, 9.81],
            })
            .to_string();
            self.push(topic, "imu", line, t);
            self
        }

        pub fn image(&mut self, topic: &str, t: f64, seq: u64, width: u32, height: u32) -> &mut Self {
            let sanitized = topic.trim_start_matches('/').replace('/', "_");
            let rel = format!("payloads/{sanitized}_{seq}.bin");
            fs::create_dir_all(self.dir.path().join("payloads")).unwrap();
            fs::write(
                self.dir.path().join(&rel),
                vec![127u8; (width * height) as usize],
            )
            .unwrap();
            let line = json!({
                "t": t, "seq": seq, "data_file": rel, "width": width, "height": height,
            })
            .to_string();
            self.push(topic, "image", line, t);
            self
        }

        pub fn events(&mut self, topic: &str, t: f64, seq: u64, n: usize) -> &mut Self {
            let events: Vec<_> = (0..n)
                .map(|i| json!({"x": i as u16, "y": 0, "t": t, "polarity": i % 2 == 0}))
                .collect();
            let line = json!({
                "t": t, "seq": seq, "width": 240, "height": 180, "events": events,
            })
            .to_string();
            self.push(topic, "events", line, t);
            self
        }

        pub fn pose_single(&mut self, topic: &str, t: f64, seq: u64) -> &mut Self {
            let line = json!({
                "t": t, "seq": seq,
                "position": [t, 0.0, 0.0],
                "orientation": [0.0, 0.0, 0.0, 1.0],
            })
            .to_string();
            self.push(topic, "pose", line, t);
            self
        }

        pub fn pose_transforms(&mut self, topic: &str, t: f64, seq: u64, n: usize) -> &mut Self {
            let transforms: Vec<_> = (0..n)
                .map(|i| {
                    json!({
                        "t": t + i as f64 * 1e-3,
                        "translation": [0.0, i as f64, 0.0],
                        "rotation": [0.0, 0.0, 0.0, 1.0],
                    })
                })
                .collect();
            let line = json!({"t": t, "seq": seq, "transforms": transforms}).to_string();
            self.push(topic, "pose", line, t);
            self
        }

        /// Append a line that is not valid JSON.
        pub fn garbage(&mut self, topic: &str, kind: &'static str) -> &mut Self {
            self.push(topic, kind, "{not json at all".to_string(), 0.0);
            self
        }

        pub fn build(self) -> TempDir {
            let mut streams = serde_json::Map::new();
            for (idx, (topic, kind, lines)) in self.streams.iter().enumerate() {
                let file = format!("stream_{idx}.jsonl");
                fs::write(self.dir.path().join(&file), lines.join("\n")).unwrap();
                streams.insert(
                    topic.clone(),
                    json!({"file": file, "kind": kind, "message_count": lines.len()}),
                );
            }
            let manifest = json!({
                "version": "1",
                "duration_sec": self.duration_sec,
                "streams": streams,
            });
            fs::write(
                self.dir.path().join("manifest.json"),
                serde_json::to_string_pretty(&manifest).unwrap(),
            )
            .unwrap();
            self.dir
        }
    }

    pub fn csv_rows(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1)
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod e2e_tests {
    use super::support::{csv_rows, LogBuilder};
    use contracts::{Params, ReplayWindow};
    use frontends::{FrontendKind, MockFrontend};
    use log_store::LogReader;
    use replay::{EngineConfig, ReplayEngine, RouterConfig};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn params() -> Params {
        Params {
            img_width: 8,
            img_height: 8,
            init_window_sec: 0.05,
            ..Default::default()
        }
    }

    fn config(out: &Path, window: ReplayWindow, pose_topic: Option<&str>) -> EngineConfig {
        EngineConfig {
            router: RouterConfig {
                imu_topic: "/imu".into(),
                image_topic: "/cam0/image_raw".into(),
                events_topic: Some("/cam0/events".into()),
                pose_topic: pose_topic.map(str::to_string),
            },
            window,
            out_dir: out.to_path_buf(),
            dump_input_frames: false,
            dump_debug_frames: false,
        }
    }

    /// 100 IMU samples at 200 Hz plus 10 frames at 20 Hz, window
    /// [0, 0.5], no ground-truth topic.
    fn half_second_log() -> tempfile::TempDir {
        let mut log = LogBuilder::new();
        for i in 0..100u64 {
            log.imu("/imu", i as f64 * 0.005, i);
        }
        for i in 0..10u64 {
            log.image("/cam0/image_raw", i as f64 * 0.05, i, 8, 8);
        }
        log.build()
    }

    #[test]
    fn test_half_second_scenario_row_accounting() {
        let log = half_second_log();
        let out = tempdir().unwrap();

        let frontend = MockFrontend::new().with_init_after(30);
        let mut engine = ReplayEngine::new(
            Box::new(frontend),
            params(),
            config(out.path(), ReplayWindow::new(0.0, 0.5).unwrap(), None),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        let stats = engine.run(&reader).unwrap();

        assert_eq!(stats.imu_messages, 100);
        assert_eq!(stats.image_messages, 10);
        assert!(!out.path().join("gt.csv").exists());

        // every post-latch state update yields exactly one row in each table
        let pose = csv_rows(&out.path().join("pose.csv"));
        let bias = csv_rows(&out.path().join("imu_bias.csv"));
        let realtime = csv_rows(&out.path().join("realtime.csv"));
        assert_eq!(pose.len() as u64, stats.post_latch_updates);
        assert_eq!(bias.len(), pose.len());
        assert_eq!(realtime.len(), pose.len());
        assert_eq!(stats.post_latch_updates, 110 - 29);
    }

    #[test]
    fn test_rows_stay_inside_window() {
        let log = half_second_log();
        let out = tempdir().unwrap();

        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            params(),
            config(out.path(), ReplayWindow::new(0.1, 0.3).unwrap(), None),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        engine.run(&reader).unwrap();

        for row in csv_rows(&out.path().join("pose.csv")) {
            let t: f64 = row.split(',').nth(1).unwrap().parse().unwrap();
            assert!((0.1..=0.3).contains(&t), "row out of window: {row}");
        }
    }

    #[test]
    fn test_latch_blocks_all_rows_when_never_ready() {
        let log = half_second_log();
        let out = tempdir().unwrap();

        let frontend = MockFrontend::new().with_init_after(10_000);
        let mut engine = ReplayEngine::new(
            Box::new(frontend),
            params(),
            config(out.path(), ReplayWindow::unbounded(), None),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        let stats = engine.run(&reader).unwrap();

        assert_eq!(stats.post_latch_updates, 0);
        assert!(csv_rows(&out.path().join("pose.csv")).is_empty());
        assert!(csv_rows(&out.path().join("realtime.csv")).is_empty());
    }

    #[test]
    fn test_transform_batches_fan_out_to_gt_rows() {
        let mut log = LogBuilder::new();
        for i in 0..5u64 {
            log.imu("/imu", i as f64 * 0.01, i);
        }
        log.pose_transforms("/gt", 0.02, 0, 3);
        log.pose_single("/gt", 0.03, 1);
        let log = log.build();
        let out = tempdir().unwrap();

        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            params(),
            config(out.path(), ReplayWindow::unbounded(), Some("/gt")),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        let stats = engine.run(&reader).unwrap();

        assert_eq!(stats.pose_messages, 2);
        assert_eq!(stats.gt_rows, 4);
        assert_eq!(csv_rows(&out.path().join("gt.csv")).len(), 4);
    }

    #[test]
    fn test_size_mismatched_image_is_skipped_and_run_continues() {
        let mut log = LogBuilder::new();
        for i in 0..10u64 {
            log.imu("/imu", i as f64 * 0.01, i);
        }
        // declared 16x16 while params say 8x8
        log.image("/cam0/image_raw", 0.05, 0, 16, 16);
        let log = log.build();
        let out = tempdir().unwrap();

        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            params(),
            config(out.path(), ReplayWindow::unbounded(), None),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        let stats = engine.run(&reader).unwrap();

        assert_eq!(stats.image_messages, 0);
        assert_eq!(stats.imu_messages, 10);
        assert_eq!(stats.skipped, 1);
        // no Image-typed row reached the tables
        assert!(csv_rows(&out.path().join("pose.csv"))
            .iter()
            .all(|row| row.starts_with("IMU,")));
    }

    #[test]
    fn test_malformed_line_does_not_abort() {
        let mut log = LogBuilder::new();
        log.imu("/imu", 0.0, 0);
        log.garbage("/imu", "imu");
        log.imu("/imu", 0.02, 1);
        let log = log.build();
        let out = tempdir().unwrap();

        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            params(),
            config(out.path(), ReplayWindow::unbounded(), None),
        );
        engine.set_up().unwrap();
        let reader = LogReader::open(log.path()).unwrap();
        let stats = engine.run(&reader).unwrap();

        assert_eq!(stats.imu_messages, 2);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_event_routing_respects_capability() {
        let mut log = LogBuilder::new();
        for i in 0..5u64 {
            log.imu("/imu", i as f64 * 0.01, i);
        }
        log.events("/cam0/events", 0.025, 0, 8);
        let log = log.build();

        // frame-based frontend: burst dropped
        let out = tempdir().unwrap();
        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new()),
            params(),
            config(out.path(), ReplayWindow::unbounded(), None),
        );
        engine.set_up().unwrap();
        let stats = engine.run(&LogReader::open(log.path()).unwrap()).unwrap();
        assert_eq!(stats.event_messages, 0);
        assert_eq!(stats.skipped, 1);

        // event-capable frontend: burst processed
        let out = tempdir().unwrap();
        let mut engine = ReplayEngine::new(
            Box::new(MockFrontend::new().with_events(true)),
            params(),
            config(out.path(), ReplayWindow::unbounded(), None),
        );
        engine.set_up().unwrap();
        let stats = engine.run(&LogReader::open(log.path()).unwrap()).unwrap();
        assert_eq!(stats.event_messages, 1);
    }

    #[test]
    fn test_identical_runs_produce_identical_tables() {
        let log = half_second_log();

        let run = || {
            let out = tempdir().unwrap();
            let mut engine = ReplayEngine::new(
                Box::new(MockFrontend::new().with_init_after(10)),
                params(),
                config(out.path(), ReplayWindow::unbounded(), None),
            );
            engine.set_up().unwrap();
            engine.run(&LogReader::open(log.path()).unwrap()).unwrap();
            out
        };
        let a = run();
        let b = run();

        for table in ["pose.csv", "imu_bias.csv"] {
            let left = fs::read_to_string(a.path().join(table)).unwrap();
            let right = fs::read_to_string(b.path().join(table)).unwrap();
            assert_eq!(left, right, "{table} differs between identical runs");
        }
    }

    #[test]
    fn test_shipped_frontend_initializes_and_emits() {
        let log = half_second_log();
        let out = tempdir().unwrap();

        // strapdown core latches after the 0.05 s averaging window
        let frontend = frontends::build(FrontendKind::Xvio);
        let mut engine = ReplayEngine::new(
            frontend,
            params(),
            config(out.path(), ReplayWindow::unbounded(), None),
        );
        engine.set_up().unwrap();
        let stats = engine.run(&LogReader::open(log.path()).unwrap()).unwrap();

        assert!(stats.post_latch_updates > 0);
        assert!(!csv_rows(&out.path().join("pose.csv")).is_empty());
    }
}

#[cfg(test)]
mod contract_tests {
    use dispatcher::{CsvRow, GtRow, ImuBiasRow, PoseRow, RealtimeRow, ResourceRow};

    /// Downstream notebooks join on these columns; the schemas are
    /// frozen.
    #[test]
    fn test_table_schemas_are_frozen() {
        assert_eq!(
            PoseRow::HEADER.join(","),
            "update_modality,t,estimated_p_x,estimated_p_y,estimated_p_z,estimated_q_x,estimated_q_y,estimated_q_z,estimated_q_w"
        );
        assert_eq!(
            ImuBiasRow::HEADER.join(","),
            "t,b_a_x,b_a_y,b_a_z,b_w_x,b_w_y,b_w_z,sigma_b_a_x,sigma_b_a_y,sigma_b_a_z,sigma_b_w_x,sigma_b_w_y,sigma_b_w_z"
        );
        assert_eq!(GtRow::HEADER.join(","), "t,p_x,p_y,p_z,q_x,q_y,q_z,q_w");
        assert_eq!(
            RealtimeRow::HEADER.join(","),
            "t_sim,t_real,ts_real,processing_type,process_time_in_us"
        );
        assert_eq!(
            ResourceRow::HEADER.join(","),
            "ts,cpu_usage,cpu_user_mode_usage,cpu_kernel_mode_usage,memory_usage_in_bytes,debug_memory_in_bytes"
        );
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::ConfigLoader;
    use contracts::EvalError;

    #[test]
    fn test_full_parameter_file_round_trip() {
        let yaml = "\
img_width: 640
img_height: 480
n_tiles_h: 4
n_tiles_w: 5
max_feat_per_tile: 30
init_window_sec: 1.0
sigma_a: 0.1
sigma_w: 0.002
gravity: 9.80665
";
        let report = ConfigLoader::load_from_str(yaml).unwrap();
        assert!(report.missing.is_empty());
        assert_eq!(report.params.img_width, 640);
        assert_eq!(report.params.n_tiles_w, 5);
        assert_eq!(report.params.gravity, 9.80665);
    }

    #[test]
    fn test_wrong_type_is_a_parse_error() {
        let err =
            ConfigLoader::load_from_str("img_width: \"wide\"\nimg_height: 180\n").unwrap_err();
        assert!(matches!(err, EvalError::Config { .. }));
    }
}
