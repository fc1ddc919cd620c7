//! Params - strongly-typed estimator/harness parameters
//!
//! Loaded from a flat key/value YAML document by `config_loader`.

use serde::{Deserialize, Serialize};

/// Parameter structure backing the YAML parameter file
///
/// Each field maps to one top-level key of the document. Defaults here
/// are the fallbacks for keys the loader tolerates as missing; the
/// loader decides which absences are fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Expected camera frame width (pixels); required
    pub img_width: u32,

    /// Expected camera frame height (pixels); required
    pub img_height: u32,

    /// Tile grid rows for feature tracking
    pub n_tiles_h: u32,

    /// Tile grid columns for feature tracking
    pub n_tiles_w: u32,

    /// Maximum tracked features per tile
    pub max_feat_per_tile: u32,

    /// Stationary averaging window used to initialize IMU biases (seconds)
    pub init_window_sec: f64,

    /// Accelerometer noise density
    pub sigma_a: f64,

    /// Gyroscope noise density
    pub sigma_w: f64,

    /// Local gravity magnitude (m/s²)
    pub gravity: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            img_width: 0,
            img_height: 0,
            n_tiles_h: 3,
            n_tiles_w: 3,
            max_feat_per_tile: 40,
            init_window_sec: 0.5,
            sigma_a: 0.083,
            sigma_w: 0.0013,
            gravity: 9.81,
        }
    }
}
