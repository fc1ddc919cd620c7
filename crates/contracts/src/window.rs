//! ReplayWindow - time bounds applied by the Stream Merger

use crate::EvalError;

/// Closed `[from, to]` time window in sim-time seconds
///
/// Defaults to effectively unbounded. Messages with timestamps outside
/// the window are never yielded by a merged view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayWindow {
    from: f64,
    to: f64,
}

impl ReplayWindow {
    /// Window covering the whole log
    pub const fn unbounded() -> Self {
        Self {
            from: f64::NEG_INFINITY,
            to: f64::INFINITY,
        }
    }

    /// Bounded window; `from <= to` is required.
    pub fn new(from: f64, to: f64) -> Result<Self, EvalError> {
        if from > to {
            return Err(EvalError::config_validation(
                "window",
                format!("from ({from}) must be <= to ({to})"),
            ));
        }
        Ok(Self { from, to })
    }

    /// Build from optional CLI bounds, falling back to unbounded ends.
    pub fn from_bounds(from: Option<f64>, to: Option<f64>) -> Result<Self, EvalError> {
        Self::new(
            from.unwrap_or(f64::NEG_INFINITY),
            to.unwrap_or(f64::INFINITY),
        )
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    /// Whether `t` falls inside the window (bounds inclusive)
    pub fn contains(&self, t: f64) -> bool {
        t >= self.from && t <= self.to
    }
}

impl Default for ReplayWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}
