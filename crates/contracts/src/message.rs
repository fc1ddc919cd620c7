//! SensorMessage - Stream Merger output
//!
//! One record read from the sensor log, tagged by kind.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::Params;

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Unit quaternion, stored x/y/z/w
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from(q: [f64; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }
}

/// A sensor message paired with its merge metadata
#[derive(Debug, Clone)]
pub struct TimedMessage {
    /// Topic the record was read from
    pub topic: String,

    /// Log timestamp (sim time, seconds)
    pub t: f64,

    /// Payload
    pub message: SensorMessage,
}

/// Tagged union over the recognized message kinds
#[derive(Debug, Clone)]
pub enum SensorMessage {
    /// Inertial sample
    Imu(ImuSample),

    /// Camera frame
    Image(ImageFrame),

    /// Event-camera burst
    Events(EventBurst),

    /// Ground-truth pose
    Pose(PoseRecord),
}

/// One inertial measurement
#[derive(Debug, Clone, Copy)]
pub struct ImuSample {
    /// Timestamp (seconds)
    pub t: f64,

    /// Sequence number within the stream
    pub seq: u64,

    /// Angular velocity (rad/s)
    pub angular_velocity: Vector3,

    /// Linear acceleration (m/s²)
    pub linear_acceleration: Vector3,
}

/// One camera frame (mono8 pixel buffer)
#[derive(Debug, Clone)]
pub struct ImageFrame {
    /// Timestamp (seconds)
    pub t: f64,

    /// Sequence number within the stream
    pub seq: u64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Raw pixel data, one byte per pixel (zero-copy)
    pub data: Bytes,
}

/// Image frame partitioned into a tile grid for feature tracking
///
/// The grid caps the number of tracked features per tile; tiling
/// parameters come from [`Params`].
#[derive(Debug, Clone, Default)]
pub struct TiledImage {
    /// Timestamp (seconds)
    pub t: f64,

    /// Frame sequence number
    pub seq: u64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Raw pixel data (shallow copy of the source frame)
    pub data: Bytes,

    /// Tile grid rows
    pub n_tiles_h: u32,

    /// Tile grid columns
    pub n_tiles_w: u32,

    /// Maximum tracked features per tile
    pub max_feat_per_tile: u32,
}

impl TiledImage {
    /// Wrap a raw frame with the configured tile grid.
    pub fn from_frame(frame: &ImageFrame, params: &Params) -> Self {
        Self {
            t: frame.t,
            seq: frame.seq,
            width: frame.width,
            height: frame.height,
            data: frame.data.clone(),
            n_tiles_h: params.n_tiles_h,
            n_tiles_w: params.n_tiles_w,
            max_feat_per_tile: params.max_feat_per_tile,
        }
    }

    /// Total number of tiles in the grid
    pub fn n_tiles(&self) -> u32 {
        self.n_tiles_h * self.n_tiles_w
    }

    /// Grid index of the tile containing pixel (x, y)
    ///
    /// An empty grid is treated as a single tile.
    pub fn tile_index(&self, x: u32, y: u32) -> u32 {
        let cols = self.n_tiles_w.max(1);
        let rows = self.n_tiles_h.max(1);
        let tile_w = (self.width / cols).max(1);
        let tile_h = (self.height / rows).max(1);
        let col = (x / tile_w).min(cols - 1);
        let row = (y / tile_h).min(rows - 1);
        row * cols + col
    }
}

/// One per-pixel brightness-change event
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PixelEvent {
    pub x: u16,
    pub y: u16,

    /// Event timestamp (seconds)
    pub t: f64,

    /// Polarity: true = brightness increase
    pub polarity: bool,
}

/// A batch of events sharing one message envelope
#[derive(Debug, Clone)]
pub struct EventBurst {
    /// Envelope timestamp (seconds)
    pub t: f64,

    /// Sequence number within the stream
    pub seq: u64,

    /// Sensor width in pixels
    pub width: u32,

    /// Sensor height in pixels
    pub height: u32,

    /// Time-ordered events
    pub events: Vec<PixelEvent>,
}

/// A ground-truth pose sample
#[derive(Debug, Clone, Copy)]
pub struct PoseSample {
    /// Timestamp (seconds)
    pub t: f64,

    /// Position (m)
    pub position: Vector3,

    /// Orientation
    pub orientation: Quaternion,
}

/// Payload shapes seen on the ground-truth topic
#[derive(Debug, Clone)]
pub enum PoseRecord {
    /// Single stamped pose
    Single(PoseSample),

    /// Transform batch; each entry yields one ground-truth row
    Transforms(Vec<PoseSample>),
}
