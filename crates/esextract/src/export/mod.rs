//! The paginated export pipeline.
//!
//! [`Exporter`] drives the count→fetch→flatten→write loop against anything
//! implementing [`SearchSource`], bounding memory with a flush threshold.
//! The loop is strictly sequential: a page is flattened and (possibly)
//! flushed before the next request is issued.

pub mod buffer;
pub mod cursor;
pub mod exporter;

pub use buffer::RowBuffer;
pub use cursor::ExportCursor;
pub use exporter::Exporter;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::ExtractResult;
use crate::query::Query;

/// The engine maximum for a single page without scroll APIs.
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Default number of buffered rows before a flush.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 100_000;

/// The two operations the exporter consumes from the search engine.
///
/// Implemented by [`ElasticClient`](crate::client::ElasticClient) for real
/// clusters and by scripted fakes in tests.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Counts the documents matching a query body.
    async fn count(&self, index: &str, body: &Value) -> ExtractResult<u64>;

    /// Fetches one page of hit `_source` documents for a full search body
    /// (query, size, sort, optional `_source` filter and `search_after`).
    async fn search_page(&self, index: &str, body: &Value) -> ExtractResult<Vec<Value>>;
}

/// Everything a single export run needs besides connection state.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// The index to search.
    pub index: String,
    /// The built query.
    pub query: Query,
    /// Requested output fields. Empty means: derive the column list from the
    /// first returned document.
    pub fields: Vec<String>,
    /// The time field of the paging sort key.
    pub time_field: String,
    /// The id field of the paging sort key.
    pub id_field: String,
}

impl ExportRequest {
    /// Creates an export request.
    pub fn new(
        index: impl Into<String>,
        query: Query,
        fields: Vec<String>,
        time_field: impl Into<String>,
        id_field: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            query,
            fields,
            time_field: time_field.into(),
            id_field: id_field.into(),
        }
    }

    /// The effective output columns: the requested fields with the paging
    /// fields appended when not already present.
    ///
    /// Empty when no fields were requested; the exporter then derives columns
    /// from the first document.
    pub fn columns(&self) -> Vec<String> {
        if self.fields.is_empty() {
            return Vec::new();
        }
        let mut columns = self.fields.clone();
        for paging in [&self.id_field, &self.time_field] {
            if !columns.contains(paging) {
                columns.push(paging.clone());
            }
        }
        columns
    }

    /// Composes the full search body for one page.
    pub(crate) fn search_body(&self, page_size: usize, cursor: Option<&ExportCursor>) -> Value {
        let mut body = self.query.body().clone();
        body["size"] = json!(page_size);
        body["sort"] = json!([sort_clause(&self.time_field), sort_clause(&self.id_field)]);

        let columns = self.columns();
        if !columns.is_empty() {
            body["_source"] = json!(columns);
        }
        if let Some(cursor) = cursor {
            body["search_after"] = cursor.search_after();
        }
        body
    }
}

fn sort_clause(field: &str) -> Value {
    let mut clause = serde_json::Map::new();
    clause.insert(field.to_string(), json!({ "order": "asc" }));
    Value::Object(clause)
}

/// Knobs for one export run.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    page_size: usize,
    flush_threshold: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

impl ExportOptions {
    /// Sets the per-request page size, clamped to `1..=`[`MAX_PAGE_SIZE`].
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Sets the buffered-row count that triggers a flush (minimum 1).
    pub fn with_flush_threshold(mut self, flush_threshold: usize) -> Self {
        self.flush_threshold = flush_threshold.max(1);
        self
    }

    /// The per-request page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The flush threshold in rows.
    pub fn flush_threshold(&self) -> usize {
        self.flush_threshold
    }
}

/// What an export run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Total hits reported by the count request (informational).
    pub matched: u64,
    /// Rows written across all flushes.
    pub rows_written: u64,
    /// Non-empty pages fetched.
    pub pages: u64,
    /// Flush operations performed.
    pub flushes: u64,
}
