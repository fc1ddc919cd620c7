//! Stream Merger - windowed k-way merge over the selected streams
//!
//! Invariants:
//! - yielded timestamps are globally non-decreasing (per-stream
//!   monotonicity is a recorder-side guarantee)
//! - records outside the window are never yielded
//! - one malformed line is reported as an `Err` item and the merge
//!   continues; it never aborts the pass

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use contracts::{EvalError, ReplayWindow, TimedMessage};

use crate::format::{RawRecord, StreamKind};

/// One stream's read position
pub(crate) struct StreamCursor {
    topic: String,
    kind: StreamKind,
    lines: Lines<BufReader<File>>,
    line_no: u64,
    peeked: Option<Result<RawRecord, EvalError>>,
    done: bool,
}

impl StreamCursor {
    pub(crate) fn open(topic: String, kind: StreamKind, path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            topic,
            kind,
            lines: BufReader::new(file).lines(),
            line_no: 0,
            peeked: None,
            done: false,
        })
    }

    /// Ensure a record (or a parse error) is buffered, applying the
    /// window filter. Retires the cursor once a record passes `to`.
    fn fill_peek(&mut self, window: &ReplayWindow) {
        while self.peeked.is_none() && !self.done {
            let Some(line) = self.lines.next() else {
                self.done = true;
                return;
            };
            self.line_no += 1;

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.peeked = Some(Err(EvalError::malformed_record(
                        &self.topic,
                        self.line_no,
                        e.to_string(),
                    )));
                    return;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<RawRecord>(&line) {
                Ok(record) => {
                    if record.t < window.from() {
                        continue;
                    }
                    if record.t > window.to() {
                        // per-stream order is non-decreasing, nothing
                        // later can re-enter the window
                        self.done = true;
                        return;
                    }
                    self.peeked = Some(Ok(record));
                }
                Err(e) => {
                    self.peeked = Some(Err(EvalError::malformed_record(
                        &self.topic,
                        self.line_no,
                        e.to_string(),
                    )));
                }
            }
        }
    }
}

/// Lazy, finite, single-pass merged view over a log
///
/// Produced by [`crate::LogReader::view`]. Ties between streams with
/// identical timestamps are broken by topic registration order.
pub struct MergedView {
    root: PathBuf,
    window: ReplayWindow,
    cursors: Vec<StreamCursor>,
    expected: u64,
}

impl MergedView {
    pub(crate) fn new(
        root: PathBuf,
        cursors: Vec<StreamCursor>,
        window: ReplayWindow,
        expected: u64,
    ) -> Self {
        Self {
            root,
            window,
            cursors,
            expected,
        }
    }

    /// Manifest message count across the selected streams (pre-window,
    /// for progress reporting only)
    pub fn expected_messages(&self) -> u64 {
        self.expected
    }

    /// Timestamp of the next in-window record without consuming it
    pub fn peek_time(&mut self) -> Option<f64> {
        for cursor in &mut self.cursors {
            cursor.fill_peek(&self.window);
        }
        self.cursors
            .iter()
            .filter_map(|c| match &c.peeked {
                Some(Ok(record)) => Some(record.t),
                _ => None,
            })
            .min_by(|a, b| a.total_cmp(b))
    }

    fn min_cursor(&self) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for (idx, cursor) in self.cursors.iter().enumerate() {
            if let Some(Ok(record)) = &cursor.peeked {
                let better = match best {
                    // registration order breaks exact ties
                    Some((t, _)) => record.t.total_cmp(&t).is_lt(),
                    None => true,
                };
                if better {
                    best = Some((record.t, idx));
                }
            }
        }
        best.map(|(_, idx)| idx)
    }
}

impl Iterator for MergedView {
    type Item = Result<TimedMessage, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        for cursor in &mut self.cursors {
            cursor.fill_peek(&self.window);
        }

        // surface buffered parse errors before picking the next record
        if let Some(cursor) = self
            .cursors
            .iter_mut()
            .find(|c| matches!(c.peeked, Some(Err(_))))
        {
            if let Some(Err(e)) = cursor.peeked.take() {
                return Some(Err(e));
            }
        }

        let idx = self.min_cursor()?;
        let cursor = &mut self.cursors[idx];
        let record = match cursor.peeked.take() {
            Some(Ok(record)) => record,
            _ => return None,
        };

        let t = record.t;
        match record.into_message(cursor.kind, &self.root) {
            Ok(message) => Some(Ok(TimedMessage {
                topic: cursor.topic.clone(),
                t,
                message,
            })),
            Err(message) => Some(Err(EvalError::malformed_record(
                &cursor.topic,
                cursor.line_no,
                message,
            ))),
        }
    }
}
