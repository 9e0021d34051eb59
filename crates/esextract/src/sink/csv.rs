//! CSV file sink.

use std::fs::File;
use std::path::Path;

use serde_json::Value;

use super::RowSink;
use crate::error::ExtractResult;
use crate::flatten::FlatRow;

/// Writes rows to a CSV file, one record per document.
///
/// String cells are written verbatim, nulls as empty cells, and any other
/// JSON value (numbers, booleans, arrays, objects) as its compact JSON text.
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Creates (or truncates) the output file.
    pub fn create(path: impl AsRef<Path>) -> ExtractResult<Self> {
        let path = path.as_ref();
        super::ensure_parent_dir(path)?;
        let file = File::create(path)?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
        })
    }
}

impl RowSink for CsvSink {
    fn write_header(&mut self, columns: &[String]) -> ExtractResult<()> {
        self.writer.write_record(columns)?;
        Ok(())
    }

    fn write_rows(&mut self, rows: &[FlatRow]) -> ExtractResult<()> {
        for row in rows {
            self.writer
                .write_record(row.cells.iter().map(render_cell))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn finalize(&mut self) -> ExtractResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
