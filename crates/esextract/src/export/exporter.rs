//! The export loop: count, page through hits, flatten, flush.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ExtractResult, TransportError};
use crate::flatten;
use crate::sink::RowSink;

use super::buffer::RowBuffer;
use super::cursor::ExportCursor;
use super::{ExportOptions, ExportRequest, ExportSummary, SearchSource};

/// Drives a full export of one query against one index.
pub struct Exporter<'a, S: SearchSource + ?Sized> {
    source: &'a S,
    options: ExportOptions,
}

impl<'a, S: SearchSource + ?Sized> Exporter<'a, S> {
    /// Creates an exporter with default [`ExportOptions`].
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            options: ExportOptions::default(),
        }
    }

    /// Replaces the export options.
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the export, writing every matching document to `sink` as one row.
    ///
    /// Pages are fetched in ascending `(time, id)` order via `search_after`,
    /// so every document is emitted exactly once. Rows are buffered and
    /// flushed to the sink whenever the flush threshold is reached, then once
    /// more for the remainder. Any transport error aborts the run; rows
    /// already flushed stay written.
    pub async fn run(
        &self,
        request: &ExportRequest,
        sink: &mut dyn RowSink,
    ) -> ExtractResult<ExportSummary> {
        let matched = self
            .source
            .count(&request.index, &request.query.count_body())
            .await?;
        info!(index = %request.index, matched, "counted matching documents");

        let mut summary = ExportSummary {
            matched,
            ..ExportSummary::default()
        };
        let mut columns = request.columns();
        let mut cursor: Option<ExportCursor> = None;
        let mut buffer = RowBuffer::new(self.options.flush_threshold());

        loop {
            let body = request.search_body(self.options.page_size(), cursor.as_ref());
            let docs = self.source.search_page(&request.index, &body).await?;
            if docs.is_empty() {
                break;
            }

            // No requested fields: the first document decides the columns.
            if columns.is_empty() {
                columns = derive_columns(&docs[0], &request.id_field, &request.time_field)?;
            }
            if summary.pages == 0 {
                sink.write_header(&columns)?;
            }
            summary.pages += 1;

            if let Some(last) = docs.last() {
                cursor = Some(ExportCursor::from_document(
                    last,
                    &request.time_field,
                    &request.id_field,
                )?);
            }

            for doc in &docs {
                buffer.push(flatten::flatten_document(doc, &columns));
                summary.rows_written += 1;
                if buffer.is_full() {
                    flush(&mut buffer, sink, &mut summary)?;
                }
            }

            debug!(
                fetched = summary.rows_written,
                total = matched,
                "fetched page of hits"
            );
        }

        if !buffer.is_empty() {
            flush(&mut buffer, sink, &mut summary)?;
        }
        sink.finalize()?;

        if summary.rows_written > 0 {
            info!(
                rows = summary.rows_written,
                pages = summary.pages,
                flushes = summary.flushes,
                "export complete"
            );
        } else {
            info!("no matching documents, nothing exported");
        }
        Ok(summary)
    }
}

fn flush(
    buffer: &mut RowBuffer,
    sink: &mut dyn RowSink,
    summary: &mut ExportSummary,
) -> ExtractResult<()> {
    let rows = buffer.take();
    sink.write_rows(&rows)?;
    summary.flushes += 1;
    Ok(())
}

/// Column list for an export without requested fields: the first document's
/// top-level keys in document order, with the paging fields appended when
/// absent.
fn derive_columns(
    doc: &Value,
    id_field: &str,
    time_field: &str,
) -> Result<Vec<String>, TransportError> {
    let map = doc
        .as_object()
        .ok_or_else(|| TransportError::MalformedResponse {
            operation: "search",
            message: "hit _source is not an object".to_string(),
        })?;
    let mut columns: Vec<String> = map.keys().cloned().collect();
    for paging in [id_field, time_field] {
        if !columns.iter().any(|column| column == paging) {
            columns.push(paging.to_string());
        }
    }
    Ok(columns)
}
