//! The four selectable frontend variants
//!
//! Each variant is independently constructed and selected once at
//! startup via [`contracts::FrontendKind`]; no shared mutable base
//! state exists between them. All wrap the strapdown core and differ
//! in how (and whether) they consume event bursts.

use contracts::{EventBurst, Frontend, Params, StateEstimate, TiledImage, Vector3};
use tracing::trace;

use crate::filter::InsFilter;

/// Frame-based visual-inertial frontend
pub struct XvioFrontend {
    filter: InsFilter,
}

impl XvioFrontend {
    pub fn new() -> Self {
        Self {
            filter: InsFilter::new(),
        }
    }
}

impl Default for XvioFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for XvioFrontend {
    fn set_up(&mut self, params: &Params) {
        self.filter.set_up(params);
    }

    fn init_at_time(&mut self, t: f64) {
        self.filter.init_at_time(t);
    }

    fn process_imu(&mut self, t: f64, seq: u64, w: Vector3, a: Vector3) -> StateEstimate {
        self.filter.process_imu(t, seq, w, a)
    }

    fn process_image(
        &mut self,
        t: f64,
        _seq: u64,
        image: &TiledImage,
        feature_img: &mut TiledImage,
    ) -> StateEstimate {
        *feature_img = image.clone();
        self.filter.vision_update(t)
    }

    fn process_events(
        &mut self,
        events: &EventBurst,
        _tracker_img: &mut TiledImage,
        _feature_img: &mut TiledImage,
    ) -> StateEstimate {
        // never routed here; keep the state timestamp coherent anyway
        trace!(seq = events.seq, "frame-based frontend ignoring events");
        self.filter.snapshot()
    }

    fn is_initialized(&self) -> bool {
        self.filter.is_initialized()
    }

    fn processes_events(&self) -> bool {
        false
    }
}

/// Event-based feature tracker frontend
///
/// Accumulates burst activity into the tracker scratch image between
/// frames.
pub struct EkltFrontend {
    filter: InsFilter,
    events_seen: u64,
}

impl EkltFrontend {
    pub fn new() -> Self {
        Self {
            filter: InsFilter::new(),
            events_seen: 0,
        }
    }

    /// Events consumed since startup
    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }
}

impl Default for EkltFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for EkltFrontend {
    fn set_up(&mut self, params: &Params) {
        self.filter.set_up(params);
    }

    fn init_at_time(&mut self, t: f64) {
        self.filter.init_at_time(t);
        self.events_seen = 0;
    }

    fn process_imu(&mut self, t: f64, seq: u64, w: Vector3, a: Vector3) -> StateEstimate {
        self.filter.process_imu(t, seq, w, a)
    }

    fn process_image(
        &mut self,
        t: f64,
        _seq: u64,
        image: &TiledImage,
        feature_img: &mut TiledImage,
    ) -> StateEstimate {
        *feature_img = image.clone();
        self.filter.vision_update(t)
    }

    fn process_events(
        &mut self,
        events: &EventBurst,
        tracker_img: &mut TiledImage,
        _feature_img: &mut TiledImage,
    ) -> StateEstimate {
        self.events_seen += events.events.len() as u64;
        tracker_img.t = events.t;
        tracker_img.seq = events.seq;
        tracker_img.width = events.width;
        tracker_img.height = events.height;
        self.filter.vision_update(events.t)
    }

    fn is_initialized(&self) -> bool {
        self.filter.is_initialized()
    }

    fn processes_events(&self) -> bool {
        true
    }
}

/// Pure event frontend: bursts are the primary vision channel
pub struct EvioFrontend {
    filter: InsFilter,
}

impl EvioFrontend {
    pub fn new() -> Self {
        Self {
            filter: InsFilter::new(),
        }
    }
}

impl Default for EvioFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for EvioFrontend {
    fn set_up(&mut self, params: &Params) {
        self.filter.set_up(params);
    }

    fn init_at_time(&mut self, t: f64) {
        self.filter.init_at_time(t);
    }

    fn process_imu(&mut self, t: f64, seq: u64, w: Vector3, a: Vector3) -> StateEstimate {
        self.filter.process_imu(t, seq, w, a)
    }

    fn process_image(
        &mut self,
        t: f64,
        _seq: u64,
        image: &TiledImage,
        feature_img: &mut TiledImage,
    ) -> StateEstimate {
        // frames only refresh the debug view
        *feature_img = image.clone();
        self.filter.snapshot_at(t)
    }

    fn process_events(
        &mut self,
        events: &EventBurst,
        tracker_img: &mut TiledImage,
        _feature_img: &mut TiledImage,
    ) -> StateEstimate {
        tracker_img.t = events.t;
        tracker_img.seq = events.seq;
        self.filter.vision_update(events.t)
    }

    fn is_initialized(&self) -> bool {
        self.filter.is_initialized()
    }

    fn processes_events(&self) -> bool {
        true
    }
}

/// Hypothesis-tracking event frontend
///
/// Caps the number of concurrently tracked hypotheses at the tile
/// grid's feature budget.
pub struct HasteFrontend {
    filter: InsFilter,
    max_hypotheses: u64,
    active_hypotheses: u64,
}

impl HasteFrontend {
    pub fn new() -> Self {
        Self {
            filter: InsFilter::new(),
            max_hypotheses: 0,
            active_hypotheses: 0,
        }
    }

    pub fn active_hypotheses(&self) -> u64 {
        self.active_hypotheses
    }
}

impl Default for HasteFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for HasteFrontend {
    fn set_up(&mut self, params: &Params) {
        self.filter.set_up(params);
        self.max_hypotheses =
            (params.n_tiles_h * params.n_tiles_w * params.max_feat_per_tile) as u64;
    }

    fn init_at_time(&mut self, t: f64) {
        self.filter.init_at_time(t);
        self.active_hypotheses = 0;
    }

    fn process_imu(&mut self, t: f64, seq: u64, w: Vector3, a: Vector3) -> StateEstimate {
        self.filter.process_imu(t, seq, w, a)
    }

    fn process_image(
        &mut self,
        t: f64,
        _seq: u64,
        image: &TiledImage,
        feature_img: &mut TiledImage,
    ) -> StateEstimate {
        *feature_img = image.clone();
        self.filter.vision_update(t)
    }

    fn process_events(
        &mut self,
        events: &EventBurst,
        tracker_img: &mut TiledImage,
        _feature_img: &mut TiledImage,
    ) -> StateEstimate {
        self.active_hypotheses =
            (self.active_hypotheses + events.events.len() as u64).min(self.max_hypotheses);
        tracker_img.t = events.t;
        tracker_img.seq = events.seq;
        self.filter.vision_update(events.t)
    }

    fn is_initialized(&self) -> bool {
        self.filter.is_initialized()
    }

    fn processes_events(&self) -> bool {
        true
    }
}
