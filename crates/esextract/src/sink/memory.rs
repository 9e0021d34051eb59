//! In-memory sink.

use serde_json::Value;

use super::RowSink;
use crate::error::ExtractResult;
use crate::flatten::FlatRow;

/// Collects rows in memory instead of writing them anywhere.
///
/// Useful for embedding the exporter in a larger program and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    columns: Vec<String>,
    rows: Vec<FlatRow>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The column list received from the exporter, empty when the export
    /// matched nothing.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The collected rows.
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Consumes the sink into one JSON object per row, keyed by column.
    pub fn into_records(self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.to_record(&self.columns))
            .collect()
    }
}

impl RowSink for MemorySink {
    fn write_header(&mut self, columns: &[String]) -> ExtractResult<()> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_rows(&mut self, rows: &[FlatRow]) -> ExtractResult<()> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }

    fn finalize(&mut self) -> ExtractResult<()> {
        Ok(())
    }
}
