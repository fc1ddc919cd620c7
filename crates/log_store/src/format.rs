//! On-disk log format: manifest and JSONL record schema

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use contracts::{
    EventBurst, ImageFrame, ImuSample, PixelEvent, PoseRecord, PoseSample, SensorMessage,
};
use serde::{Deserialize, Serialize};

/// Log manifest (`manifest.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,

    /// Total recorded span (seconds)
    pub duration_sec: f64,

    /// Recorded streams, keyed by topic name
    pub streams: HashMap<String, StreamEntry>,
}

/// Per-stream manifest metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEntry {
    /// JSONL file, relative to the log root
    pub file: String,

    /// Payload kind of every record in the stream
    pub kind: StreamKind,

    /// Number of records in the stream
    pub message_count: u64,
}

/// Recognized stream payload kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Imu,
    Image,
    Events,
    Pose,
}

/// One JSONL line
///
/// Flat schema with per-kind optional fields; the stream's manifest
/// kind decides which fields are consulted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// Timestamp (seconds)
    pub t: f64,

    #[serde(default)]
    pub seq: u64,

    // IMU fields
    #[serde(default)]
    pub angular_velocity: Option<[f64; 3]>,
    #[serde(default)]
    pub linear_acceleration: Option<[f64; 3]>,

    // Image fields
    #[serde(default)]
    pub data_file: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,

    // Event fields
    #[serde(default)]
    pub events: Option<Vec<RawEvent>>,

    // Pose fields
    #[serde(default)]
    pub position: Option<[f64; 3]>,
    #[serde(default)]
    pub orientation: Option<[f64; 4]>,
    #[serde(default)]
    pub transforms: Option<Vec<RawTransform>>,
}

/// One event inside an event-burst record
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawEvent {
    pub x: u16,
    pub y: u16,
    pub t: f64,
    #[serde(default)]
    pub polarity: bool,
}

/// One entry of a transform-batch pose record
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawTransform {
    pub t: f64,
    pub translation: [f64; 3],
    pub rotation: [f64; 4],
}

impl RawRecord {
    /// Convert a raw record into a typed message.
    ///
    /// `log_root` resolves `data_file` references. Returns an error
    /// string (wrapped by the caller into a malformed-record error)
    /// when required fields are absent or a payload file is unreadable.
    pub fn into_message(self, kind: StreamKind, log_root: &Path) -> Result<SensorMessage, String> {
        match kind {
            StreamKind::Imu => {
                let w = self.angular_velocity.ok_or("missing angular_velocity")?;
                let a = self
                    .linear_acceleration
                    .ok_or("missing linear_acceleration")?;
                Ok(SensorMessage::Imu(ImuSample {
                    t: self.t,
                    seq: self.seq,
                    angular_velocity: w.into(),
                    linear_acceleration: a.into(),
                }))
            }
            StreamKind::Image => {
                let data_file = self.data_file.ok_or("missing data_file")?;
                let path = log_root.join(&data_file);
                let data = std::fs::read(&path)
                    .map(Bytes::from)
                    .map_err(|e| format!("cannot read payload '{data_file}': {e}"))?;
                Ok(SensorMessage::Image(ImageFrame {
                    t: self.t,
                    seq: self.seq,
                    width: self.width.ok_or("missing width")?,
                    height: self.height.ok_or("missing height")?,
                    data,
                }))
            }
            StreamKind::Events => {
                let events = self
                    .events
                    .ok_or("missing events")?
                    .into_iter()
                    .map(|e| PixelEvent {
                        x: e.x,
                        y: e.y,
                        t: e.t,
                        polarity: e.polarity,
                    })
                    .collect();
                Ok(SensorMessage::Events(EventBurst {
                    t: self.t,
                    seq: self.seq,
                    width: self.width.ok_or("missing width")?,
                    height: self.height.ok_or("missing height")?,
                    events,
                }))
            }
            StreamKind::Pose => match (self.position, self.orientation, self.transforms) {
                (Some(p), Some(q), _) => Ok(SensorMessage::Pose(PoseRecord::Single(PoseSample {
                    t: self.t,
                    position: p.into(),
                    orientation: q.into(),
                }))),
                (_, _, Some(transforms)) => Ok(SensorMessage::Pose(PoseRecord::Transforms(
                    transforms
                        .into_iter()
                        .map(|tf| PoseSample {
                            t: tf.t,
                            position: tf.translation.into(),
                            orientation: tf.rotation.into(),
                        })
                        .collect(),
                ))),
                _ => Err("unrecognized ground-truth payload shape".to_string()),
            },
        }
    }
}
