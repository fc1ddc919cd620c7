//! Scriptable frontend for harness tests
//!
//! The replay engine owns its frontend box, so tests that want to
//! inspect what the engine routed keep a clone of the shared
//! [`MockLog`] handle and read it back after the run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use contracts::{EventBurst, Frontend, Params, StateEstimate, TiledImage, Vector3};

/// What the mock was asked to process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCallKind {
    Imu,
    Image,
    Events,
}

/// One recorded dispatch into the mock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockCall {
    pub kind: MockCallKind,
    pub t: f64,
    pub seq: u64,
}

/// Shared call recorder, kept alive by the test after the engine
/// takes ownership of the frontend.
#[derive(Debug, Default)]
pub struct MockLog {
    calls: Mutex<Vec<MockCall>>,
    set_ups: AtomicUsize,
}

impl MockLog {
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// How often `set_up` has been invoked
    pub fn set_up_count(&self) -> usize {
        self.set_ups.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_of(&self, kind: MockCallKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.kind == kind)
            .count()
    }

    fn push(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Deterministic scriptable frontend
///
/// Reports ready after `init_after` processed messages and echoes each
/// message timestamp back as its state estimate.
pub struct MockFrontend {
    log: Arc<MockLog>,
    init_after: usize,
    processes_events: bool,
    processed: usize,
    t_init: f64,
    last_t: f64,
}

impl MockFrontend {
    pub fn new() -> Self {
        Self {
            log: Arc::new(MockLog::default()),
            init_after: 0,
            processes_events: false,
            processed: 0,
            t_init: 0.0,
            last_t: 0.0,
        }
    }

    /// Stay uninitialized for the first `n` processed messages.
    pub fn with_init_after(mut self, n: usize) -> Self {
        self.init_after = n;
        self
    }

    pub fn with_events(mut self, processes_events: bool) -> Self {
        self.processes_events = processes_events;
        self
    }

    pub fn log(&self) -> Arc<MockLog> {
        Arc::clone(&self.log)
    }

    fn record(&mut self, kind: MockCallKind, t: f64, seq: u64) -> StateEstimate {
        self.log.push(MockCall { kind, t, seq });
        self.processed += 1;
        self.last_t = t;
        StateEstimate {
            t,
            ..Default::default()
        }
    }
}

impl Default for MockFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for MockFrontend {
    fn set_up(&mut self, _params: &Params) {
        self.log.set_ups.fetch_add(1, Ordering::Relaxed);
    }

    fn init_at_time(&mut self, t: f64) {
        self.t_init = t;
        self.processed = 0;
    }

    fn process_imu(&mut self, t: f64, seq: u64, _w: Vector3, _a: Vector3) -> StateEstimate {
        self.record(MockCallKind::Imu, t, seq)
    }

    fn process_image(
        &mut self,
        t: f64,
        seq: u64,
        image: &TiledImage,
        feature_img: &mut TiledImage,
    ) -> StateEstimate {
        *feature_img = image.clone();
        self.record(MockCallKind::Image, t, seq)
    }

    fn process_events(
        &mut self,
        events: &EventBurst,
        tracker_img: &mut TiledImage,
        _feature_img: &mut TiledImage,
    ) -> StateEstimate {
        tracker_img.t = events.t;
        tracker_img.seq = events.seq;
        self.record(MockCallKind::Events, events.t, events.seq)
    }

    fn is_initialized(&self) -> bool {
        self.processed >= self.init_after
    }

    fn processes_events(&self) -> bool {
        self.processes_events
    }
}
