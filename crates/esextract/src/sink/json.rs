//! JSON file sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::RowSink;
use crate::error::ExtractResult;
use crate::flatten::FlatRow;

/// Writes rows to a JSON file as one array of records.
///
/// Records are streamed as they are flushed, so the file is valid JSON only
/// after [`finalize`](RowSink::finalize) closes the array. An export that
/// matched nothing produces `[]`.
pub struct JsonSink {
    writer: BufWriter<File>,
    columns: Vec<String>,
    started: bool,
    wrote_row: bool,
}

impl JsonSink {
    /// Creates (or truncates) the output file.
    pub fn create(path: impl AsRef<Path>) -> ExtractResult<Self> {
        let path = path.as_ref();
        super::ensure_parent_dir(path)?;
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            columns: Vec::new(),
            started: false,
            wrote_row: false,
        })
    }
}

impl RowSink for JsonSink {
    fn write_header(&mut self, columns: &[String]) -> ExtractResult<()> {
        self.columns = columns.to_vec();
        self.writer.write_all(b"[")?;
        self.started = true;
        Ok(())
    }

    fn write_rows(&mut self, rows: &[FlatRow]) -> ExtractResult<()> {
        for row in rows {
            if self.wrote_row {
                self.writer.write_all(b",")?;
            }
            serde_json::to_writer(&mut self.writer, &row.to_record(&self.columns))?;
            self.wrote_row = true;
        }
        Ok(())
    }

    fn finalize(&mut self) -> ExtractResult<()> {
        if !self.started {
            self.writer.write_all(b"[")?;
        }
        self.writer.write_all(b"]")?;
        self.writer.flush()?;
        Ok(())
    }
}
