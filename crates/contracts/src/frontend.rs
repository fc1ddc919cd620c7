//! Frontend trait - the pluggable estimator capability
//!
//! The replay core is agnostic to which concrete estimator is bound;
//! it calls only this contract.

use std::fmt;
use std::str::FromStr;

use crate::{EventBurst, Params, StateEstimate, TiledImage, Vector3};

/// Pluggable state-estimation frontend
///
/// Call order enforced by the Replay Engine: `set_up` once, then
/// `init_at_time` with the first windowed message timestamp, then any
/// number of `process_*` calls in log order. Implementations own their
/// internal state exclusively; the engine never calls re-entrantly.
pub trait Frontend {
    /// One-time initialization from the loaded parameters
    fn set_up(&mut self, params: &Params);

    /// Establish the estimator reference/start time
    fn init_at_time(&mut self, t: f64);

    /// Consume one inertial sample
    fn process_imu(&mut self, t: f64, seq: u64, w: Vector3, a: Vector3) -> StateEstimate;

    /// Consume one tiled camera frame
    ///
    /// `feature_img` is scratch space the frontend may fill with its
    /// feature-tracking debug view.
    fn process_image(
        &mut self,
        t: f64,
        seq: u64,
        image: &TiledImage,
        feature_img: &mut TiledImage,
    ) -> StateEstimate;

    /// Consume one event burst
    ///
    /// Only invoked when [`Frontend::processes_events`] is true and an
    /// events topic is configured.
    fn process_events(
        &mut self,
        events: &EventBurst,
        tracker_img: &mut TiledImage,
        feature_img: &mut TiledImage,
    ) -> StateEstimate;

    /// Readiness gate: output rows are emitted only after this first
    /// returns true.
    fn is_initialized(&self) -> bool;

    /// Capability flag: whether the frontend consumes event bursts
    fn processes_events(&self) -> bool;
}

/// Selectable frontend variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendKind {
    /// Frame-based visual-inertial filter
    Xvio,
    /// Event-based tracker frontend
    Eklt,
    /// Pure event frontend
    Evio,
    /// Hypothesis-tracking event frontend
    Haste,
}

impl FrontendKind {
    /// All recognized variants, in selector order
    pub const ALL: [FrontendKind; 4] = [Self::Xvio, Self::Eklt, Self::Evio, Self::Haste];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xvio => "xvio",
            Self::Eklt => "eklt",
            Self::Evio => "evio",
            Self::Haste => "haste",
        }
    }
}

impl fmt::Display for FrontendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrontendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xvio" => Ok(Self::Xvio),
            "eklt" => Ok(Self::Eklt),
            "evio" => Ok(Self::Evio),
            "haste" => Ok(Self::Haste),
            other => {
                let valid: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
                Err(format!(
                    "unknown frontend '{other}', possible values: {}",
                    valid.join(", ")
                ))
            }
        }
    }
}
