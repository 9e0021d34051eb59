//! Output sinks for flattened rows.
//!
//! A [`RowSink`] receives the column header once, then batches of rows as
//! the exporter flushes its buffer, then a final close. File-backed sinks
//! validate their output directory at creation time so a doomed export
//! fails before any network traffic.

mod csv;
mod json;
mod memory;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
pub use self::memory::MemorySink;

use std::path::Path;

use crate::error::{ExtractResult, InputError};
use crate::flatten::FlatRow;

/// Destination for flattened export rows.
pub trait RowSink {
    /// Receives the column list once, before any rows. Not called when the
    /// export matched nothing.
    fn write_header(&mut self, columns: &[String]) -> ExtractResult<()>;

    /// Writes one flushed batch of rows.
    fn write_rows(&mut self, rows: &[FlatRow]) -> ExtractResult<()>;

    /// Completes the output after the last flush.
    fn finalize(&mut self) -> ExtractResult<()>;
}

/// Fails when the directory an output path points into does not exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> ExtractResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(InputError::OutputDirMissing {
                path: parent.to_path_buf(),
            }
            .into());
        }
    }
    Ok(())
}
