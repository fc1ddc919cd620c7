//! Dispatch Router - topic classification and frontend invocation
//!
//! Routing table:
//! - imu topic    -> `process_imu`
//! - image topic  -> tiling conversion -> `process_image`
//! - events topic -> `process_events`, only for event-capable frontends
//! - pose topic   -> ground-truth rows, bypassing the frontend
//!
//! Anything else is dropped. Per-message conversion failures skip the
//! message and never abort the pass.

use contracts::{
    Frontend, Params, PoseRecord, PoseSample, SensorMessage, StateEstimate, TiledImage,
    TimedMessage,
};
use metrics::counter;
use tracing::{debug, error, warn};

/// Which frontend operation handled a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    Imu,
    Image,
    Events,
}

impl ProcessKind {
    /// Label written to the `update_modality` / `processing_type`
    /// columns.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessKind::Imu => "IMU",
            ProcessKind::Image => "Image",
            ProcessKind::Events => "Events",
        }
    }
}

/// Topic assignment for one run
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub imu_topic: String,
    pub image_topic: String,
    pub events_topic: Option<String>,
    pub pose_topic: Option<String>,
}

/// Outcome of dispatching one merged record
#[derive(Debug)]
pub enum Routed {
    /// The frontend produced a state update
    Estimate {
        kind: ProcessKind,
        state: StateEstimate,
    },

    /// Ground-truth samples, one row each
    GroundTruth(Vec<PoseSample>),

    /// Dropped (unroutable topic, conversion failure, capability
    /// mismatch)
    Skipped,
}

/// Stateful router owning the scratch images handed to the frontend
pub struct DispatchRouter {
    config: RouterConfig,
    params: Params,
    tracker_img: TiledImage,
    feature_img: TiledImage,
}

impl DispatchRouter {
    pub fn new(config: RouterConfig, params: Params) -> Self {
        Self {
            config,
            params,
            tracker_img: TiledImage::default(),
            feature_img: TiledImage::default(),
        }
    }

    /// Route one merged record into the frontend.
    pub fn dispatch(&mut self, frontend: &mut dyn Frontend, msg: &TimedMessage) -> Routed {
        match &msg.message {
            SensorMessage::Imu(sample) if msg.topic == self.config.imu_topic => {
                let state = frontend.process_imu(
                    sample.t,
                    sample.seq,
                    sample.angular_velocity,
                    sample.linear_acceleration,
                );
                counter!("router_messages_total", "kind" => "imu").increment(1);
                Routed::Estimate {
                    kind: ProcessKind::Imu,
                    state,
                }
            }
            SensorMessage::Image(frame) if msg.topic == self.config.image_topic => {
                if frame.width != self.params.img_width || frame.height != self.params.img_height {
                    error!(
                        seq = frame.seq,
                        got_width = frame.width,
                        got_height = frame.height,
                        want_width = self.params.img_width,
                        want_height = self.params.img_height,
                        "image dimensions disagree with the parameter file, dropping frame"
                    );
                    counter!("router_dropped_total", "reason" => "size_mismatch").increment(1);
                    return Routed::Skipped;
                }
                if frame.data.len() != (frame.width * frame.height) as usize {
                    warn!(
                        seq = frame.seq,
                        len = frame.data.len(),
                        "truncated pixel buffer, dropping frame"
                    );
                    counter!("router_dropped_total", "reason" => "short_payload").increment(1);
                    return Routed::Skipped;
                }

                let tiled = TiledImage::from_frame(frame, &self.params);
                let state =
                    frontend.process_image(frame.t, frame.seq, &tiled, &mut self.feature_img);
                counter!("router_messages_total", "kind" => "image").increment(1);
                Routed::Estimate {
                    kind: ProcessKind::Image,
                    state,
                }
            }
            SensorMessage::Events(burst)
                if self.config.events_topic.as_deref() == Some(msg.topic.as_str()) =>
            {
                if !frontend.processes_events() {
                    debug!(
                        seq = burst.seq,
                        "frontend does not consume events, dropping burst"
                    );
                    counter!("router_dropped_total", "reason" => "no_event_capability")
                        .increment(1);
                    return Routed::Skipped;
                }
                let state =
                    frontend.process_events(burst, &mut self.tracker_img, &mut self.feature_img);
                counter!("router_messages_total", "kind" => "events").increment(1);
                Routed::Estimate {
                    kind: ProcessKind::Events,
                    state,
                }
            }
            SensorMessage::Pose(record)
                if self.config.pose_topic.as_deref() == Some(msg.topic.as_str()) =>
            {
                let samples = match record {
                    PoseRecord::Single(sample) => vec![*sample],
                    PoseRecord::Transforms(samples) => samples.clone(),
                };
                counter!("router_messages_total", "kind" => "pose").increment(1);
                Routed::GroundTruth(samples)
            }
            _ => {
                // right topic but wrong payload kind, or an unassigned
                // topic slipping through the view selection
                warn!(topic = %msg.topic, t = msg.t, "unroutable record, dropping");
                counter!("router_dropped_total", "reason" => "unroutable").increment(1);
                Routed::Skipped
            }
        }
    }

    /// Latest feature-annotated image (debug dump source)
    pub fn feature_img(&self) -> &TiledImage {
        &self.feature_img
    }
}
