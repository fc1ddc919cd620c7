//! Typed buffered CSV writer
//!
//! One sink per table; the row type carries its header and its own
//! serialization. Rows are buffered and reach disk on `flush()`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use contracts::EvalError;
use tracing::debug;

/// A row type bound to one CSV table
pub trait CsvRow {
    /// Column names, in order
    const HEADER: &'static [&'static str];

    /// Serialize one row, without the trailing newline.
    fn write_row<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

/// Buffered writer for one table
pub struct CsvSink<R: CsvRow> {
    name: &'static str,
    writer: BufWriter<File>,
    rows: u64,
    _row: PhantomData<R>,
}

impl<R: CsvRow> CsvSink<R> {
    /// Create (truncate) the file and write the header.
    pub fn create(name: &'static str, path: &Path) -> Result<Self, EvalError> {
        let file =
            File::create(path).map_err(|e| EvalError::sink_write(name, e.to_string()))?;
        let mut sink = Self {
            name,
            writer: BufWriter::new(file),
            rows: 0,
            _row: PhantomData,
        };
        writeln!(sink.writer, "{}", R::HEADER.join(","))
            .map_err(|e| EvalError::sink_write(name, e.to_string()))?;
        debug!(sink = name, path = %path.display(), "csv sink opened");
        Ok(sink)
    }

    pub fn add_row(&mut self, row: &R) -> Result<(), EvalError> {
        row.write_row(&mut self.writer)
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|e| EvalError::sink_write(self.name, e.to_string()))?;
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), EvalError> {
        self.writer
            .flush()
            .map_err(|e| EvalError::sink_write(self.name, e.to_string()))
    }

    /// Rows appended since creation (header excluded)
    pub fn rows_written(&self) -> u64 {
        self.rows
    }
}
