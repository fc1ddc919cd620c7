//! Tabular and image sinks for replay output

pub mod csv;
pub mod frames;
pub mod rows;

use std::path::Path;

use contracts::EvalError;
use tracing::info;

use crate::sinks::csv::CsvSink;
use crate::sinks::rows::{GtRow, ImuBiasRow, PoseRow, RealtimeRow, ResourceRow};

/// The full set of CSV tables one run writes
///
/// `gt` is only materialized when a ground-truth topic is assigned;
/// no topic means no `gt.csv` on disk.
pub struct TableSet {
    pub pose: CsvSink<PoseRow>,
    pub imu_bias: CsvSink<ImuBiasRow>,
    pub gt: Option<CsvSink<GtRow>>,
    pub realtime: CsvSink<RealtimeRow>,
    pub resource: CsvSink<ResourceRow>,
}

impl TableSet {
    /// Open every table under `out_dir`, writing headers.
    pub fn open(out_dir: &Path, with_gt: bool) -> Result<Self, EvalError> {
        let gt = if with_gt {
            Some(CsvSink::create("gt", &out_dir.join("gt.csv"))?)
        } else {
            None
        };
        info!(dir = %out_dir.display(), with_gt, "output tables opened");
        Ok(Self {
            pose: CsvSink::create("pose", &out_dir.join("pose.csv"))?,
            imu_bias: CsvSink::create("imu_bias", &out_dir.join("imu_bias.csv"))?,
            gt,
            realtime: CsvSink::create("realtime", &out_dir.join("realtime.csv"))?,
            resource: CsvSink::create("resource", &out_dir.join("resource.csv"))?,
        })
    }

    /// Flush every table, attempting all of them even when one fails.
    /// The first failure is returned after the pass.
    pub fn flush_all(&mut self) -> Result<(), EvalError> {
        let mut first_err = None;
        let mut note = |r: Result<(), EvalError>| {
            if let Err(e) = r {
                first_err.get_or_insert(e);
            }
        };
        note(self.pose.flush());
        note(self.imu_bias.flush());
        if let Some(gt) = &mut self.gt {
            note(gt.flush());
        }
        note(self.realtime.flush());
        note(self.resource.flush());
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
