//! LogReader - opens a recorded log directory

use std::path::{Path, PathBuf};

use contracts::{EvalError, ReplayWindow};
use tracing::warn;

use crate::format::Manifest;
use crate::merge::{MergedView, StreamCursor};

/// Handle to an opened log directory
#[derive(Debug)]
pub struct LogReader {
    root: PathBuf,
    manifest: Manifest,
}

impl LogReader {
    /// Open a log directory.
    ///
    /// # Errors
    /// `LogOpen` when `manifest.json` is missing or unparseable.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, EvalError> {
        let root = dir.as_ref().to_path_buf();
        let manifest_path = root.join("manifest.json");

        let content = std::fs::read_to_string(&manifest_path)
            .map_err(|e| EvalError::log_open(root.display().to_string(), e.to_string()))?;

        let manifest: Manifest = serde_json::from_str(&content).map_err(|e| {
            EvalError::log_open(
                root.display().to_string(),
                format!("invalid manifest: {e}"),
            )
        })?;

        Ok(Self { root, manifest })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Create a windowed, merged, single-pass view over the given topics.
    ///
    /// Topic order fixes the cross-stream tie-break for identical
    /// timestamps. Topics absent from the manifest yield nothing (a
    /// warning is logged). The view is not restartable.
    ///
    /// # Errors
    /// `LogOpen` when a stream file listed in the manifest cannot be
    /// opened.
    pub fn view(&self, topics: &[&str], window: ReplayWindow) -> Result<MergedView, EvalError> {
        let mut cursors = Vec::new();
        let mut expected = 0u64;

        for topic in topics {
            let Some(entry) = self.manifest.streams.get(*topic) else {
                warn!(topic, "topic not present in log, skipping");
                continue;
            };

            let path = self.root.join(&entry.file);
            let cursor = StreamCursor::open(topic.to_string(), entry.kind, &path)
                .map_err(|e| EvalError::log_open(path.display().to_string(), e.to_string()))?;

            expected += entry.message_count;
            cursors.push(cursor);
        }

        Ok(MergedView::new(self.root.clone(), cursors, window, expected))
    }
}
