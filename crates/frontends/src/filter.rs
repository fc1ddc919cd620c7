//! Shared strapdown propagation core
//!
//! A deliberately small inertial filter backing the shipped variants:
//! stationary bias averaging over a configurable window, quaternion
//! attitude integration, gravity-compensated velocity/position
//! propagation. Readiness latches once the averaging window elapses.

use contracts::{Params, Quaternion, StateEstimate, Vector3};
use nalgebra::{UnitQuaternion, Vector3 as NaVector3};
use tracing::debug;

fn to_na(v: Vector3) -> NaVector3<f64> {
    NaVector3::new(v.x, v.y, v.z)
}

fn from_na(v: &NaVector3<f64>) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

fn quat_out(q: &UnitQuaternion<f64>) -> Quaternion {
    Quaternion::new(q.i, q.j, q.k, q.w)
}

/// Baseline inertial strapdown filter
#[derive(Debug, Clone)]
pub struct InsFilter {
    params: Params,

    t_init: Option<f64>,
    last_imu_t: Option<f64>,
    initialized: bool,

    // stationary averaging accumulators
    sum_w: NaVector3<f64>,
    sum_a: NaVector3<f64>,
    n_samples: u64,

    orientation: UnitQuaternion<f64>,
    velocity: NaVector3<f64>,
    position: NaVector3<f64>,
    gyro_bias: NaVector3<f64>,
    accel_bias: NaVector3<f64>,

    t_state: f64,
}

impl InsFilter {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            t_init: None,
            last_imu_t: None,
            initialized: false,
            sum_w: NaVector3::zeros(),
            sum_a: NaVector3::zeros(),
            n_samples: 0,
            orientation: UnitQuaternion::identity(),
            velocity: NaVector3::zeros(),
            position: NaVector3::zeros(),
            gyro_bias: NaVector3::zeros(),
            accel_bias: NaVector3::zeros(),
            t_state: 0.0,
        }
    }

    pub fn set_up(&mut self, params: &Params) {
        self.params = params.clone();
    }

    /// Establish the reference time; resets all propagation state.
    pub fn init_at_time(&mut self, t: f64) {
        self.t_init = Some(t);
        self.last_imu_t = None;
        self.initialized = false;
        self.sum_w = NaVector3::zeros();
        self.sum_a = NaVector3::zeros();
        self.n_samples = 0;
        self.orientation = UnitQuaternion::identity();
        self.velocity = NaVector3::zeros();
        self.position = NaVector3::zeros();
        self.gyro_bias = NaVector3::zeros();
        self.accel_bias = NaVector3::zeros();
        self.t_state = t;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn process_imu(&mut self, t: f64, _seq: u64, w: Vector3, a: Vector3) -> StateEstimate {
        let w = to_na(w);
        let a = to_na(a);

        if !self.initialized {
            self.accumulate_stationary(t, w, a);
        } else if let Some(last_t) = self.last_imu_t {
            let dt = (t - last_t).max(0.0);
            self.propagate(dt, w, a);
        }

        self.last_imu_t = Some(t);
        self.t_state = t;
        self.snapshot()
    }

    /// Pseudo-update on a vision measurement: light velocity damping,
    /// keeping the baseline bounded over long logs.
    pub fn vision_update(&mut self, t: f64) -> StateEstimate {
        self.velocity *= 0.99;
        self.t_state = t;
        self.snapshot()
    }

    fn accumulate_stationary(&mut self, t: f64, w: NaVector3<f64>, a: NaVector3<f64>) {
        self.sum_w += w;
        self.sum_a += a;
        self.n_samples += 1;

        let Some(t_init) = self.t_init else { return };
        if t - t_init >= self.params.init_window_sec && self.n_samples > 0 {
            let n = self.n_samples as f64;
            self.gyro_bias = self.sum_w / n;
            // stationary assumption: mean specific force is gravity
            self.accel_bias = self.sum_a / n - NaVector3::new(0.0, 0.0, self.params.gravity);
            self.initialized = true;
            debug!(
                t,
                samples = self.n_samples,
                "bias initialization window complete"
            );
        }
    }

    fn propagate(&mut self, dt: f64, w: NaVector3<f64>, a: NaVector3<f64>) {
        let w_corrected = w - self.gyro_bias;
        self.orientation *= UnitQuaternion::from_scaled_axis(w_corrected * dt);

        let gravity = NaVector3::new(0.0, 0.0, self.params.gravity);
        let accel_world = self.orientation * (a - self.accel_bias) - gravity;
        self.velocity += accel_world * dt;
        self.position += self.velocity * dt;
    }

    /// Snapshot stamped with `t` without touching the dynamics
    pub fn snapshot_at(&mut self, t: f64) -> StateEstimate {
        self.t_state = t;
        self.snapshot()
    }

    pub fn snapshot(&self) -> StateEstimate {
        StateEstimate {
            t: self.t_state,
            position: from_na(&self.position),
            orientation: quat_out(&self.orientation),
            accel_bias: from_na(&self.accel_bias),
            gyro_bias: from_na(&self.gyro_bias),
        }
    }
}

impl Default for InsFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Params {
        Params {
            img_width: 240,
            img_height: 180,
            init_window_sec: 0.1,
            ..Default::default()
        }
    }

    fn stationary_sample(filter: &mut InsFilter, t: f64, seq: u64) -> StateEstimate {
        filter.process_imu(
            t,
            seq,
            Vector3::new(0.001, -0.001, 0.0),
            Vector3::new(0.0, 0.0, 9.81),
        )
    }

    #[test]
    fn test_initializes_after_window() {
        let mut filter = InsFilter::new();
        filter.set_up(&params());
        filter.init_at_time(0.0);

        assert!(!filter.is_initialized());
        for i in 0..=20u64 {
            stationary_sample(&mut filter, i as f64 * 0.005, i);
        }
        assert!(filter.is_initialized());
    }

    #[test]
    fn test_bias_averaging_absorbs_stationary_rates() {
        let mut filter = InsFilter::new();
        filter.set_up(&params());
        filter.init_at_time(0.0);

        for i in 0..=40u64 {
            stationary_sample(&mut filter, i as f64 * 0.005, i);
        }
        let state = filter.snapshot();
        assert!((state.gyro_bias.x - 0.001).abs() < 1e-9);
        assert!(state.accel_bias.z.abs() < 1e-6);
        // stationary input keeps the position put
        assert!(state.position.z.abs() < 1e-3);
    }

    #[test]
    fn test_init_at_time_resets() {
        let mut filter = InsFilter::new();
        filter.set_up(&params());
        filter.init_at_time(0.0);
        for i in 0..=40u64 {
            stationary_sample(&mut filter, i as f64 * 0.005, i);
        }
        assert!(filter.is_initialized());

        filter.init_at_time(5.0);
        assert!(!filter.is_initialized());
        assert_eq!(filter.snapshot().t, 5.0);
    }

    #[test]
    fn test_snapshot_carries_last_timestamp() {
        let mut filter = InsFilter::new();
        filter.set_up(&params());
        filter.init_at_time(0.0);
        let state = stationary_sample(&mut filter, 0.005, 0);
        assert_eq!(state.t, 0.005);
    }
}
