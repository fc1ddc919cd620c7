//! Run counters and the end-of-run summary

use tracing::info;

/// Counters accumulated over one replay pass
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayStats {
    pub imu_messages: u64,
    pub image_messages: u64,
    pub event_messages: u64,
    pub pose_messages: u64,

    /// Records dropped for any recoverable reason
    pub skipped: u64,

    /// State updates produced after the readiness latch opened
    pub post_latch_updates: u64,

    pub pose_rows: u64,
    pub bias_rows: u64,
    pub gt_rows: u64,
    pub realtime_rows: u64,
    pub resource_rows: u64,

    /// Accumulated post-latch processing time (µs)
    pub calc_time_us: u64,

    /// Wall time of the whole pass (µs)
    pub wall_time_us: u64,
}

impl ReplayStats {
    pub fn total_messages(&self) -> u64 {
        self.imu_messages + self.image_messages + self.event_messages + self.pose_messages
    }

    pub fn log_summary(&self) {
        info!(
            imu = self.imu_messages,
            images = self.image_messages,
            events = self.event_messages,
            poses = self.pose_messages,
            skipped = self.skipped,
            post_latch_updates = self.post_latch_updates,
            pose_rows = self.pose_rows,
            gt_rows = self.gt_rows,
            resource_rows = self.resource_rows,
            calc_time_us = self.calc_time_us,
            wall_time_us = self.wall_time_us,
            "replay finished"
        );
    }
}
