//! Elasticsearch Search Export
//!
//! This crate exports the full result set of an Elasticsearch query to CSV or
//! JSON, walking past the 10,000-hit result window with `search_after`
//! pagination. Nested documents are flattened into rectangular rows by
//! dot-path projection, so every document becomes exactly one output row.
//!
//! # Features
//!
//! - **Boolean query building**: query-string search over chosen fields,
//!   exists constraints, match-all, AND/OR combination, and an optional
//!   inclusive date range
//! - **Deep pagination**: a stable two-key ascending sort (time field, then
//!   id field) driven by `search_after`, so exports of any size see each
//!   document exactly once
//! - **Flattening**: dot-path field projection with list mapping; missing
//!   values become empty cells, never errors
//! - **Bounded memory**: rows are buffered and flushed at a configurable
//!   threshold instead of accumulating the whole result set
//! - **Sinks**: CSV file, JSON file (one array of records), or in-memory
//!   collection
//!
//! # Architecture
//!
//! - [`config`] - connection and fallback settings resolved from the environment
//! - [`query`] - boolean query construction with eager validation
//! - [`export`] - the paginated count/fetch/flatten/write loop
//! - [`flatten`] - dot-path projection of nested documents into rows
//! - [`sink`] - output destinations for flattened rows
//! - [`client`] - the Elasticsearch transport
//! - [`error`] - error types for all operations
//!
//! # Quick Start
//!
//! ```no_run
//! use esextract::ElasticClient;
//! use esextract::config::ExtractConfig;
//! use esextract::export::{ExportOptions, ExportRequest};
//! use esextract::query::QueryBuilder;
//!
//! # async fn run() -> esextract::ExtractResult<()> {
//! // Connection settings come from ELASTIC_HOST, ELASTIC_PORT and friends.
//! let config = ExtractConfig::from_env()?;
//! let client = ElasticClient::new(&config)?;
//!
//! let query = QueryBuilder::new()
//!     .with_search(["text", "user.name"], "(happy OR glad)")
//!     .with_date_field("created_at")
//!     .with_start_date("2020-01-01")
//!     .with_end_date("2020-06-30")
//!     .build()?;
//!
//! let request = ExportRequest::new(
//!     config.index(None)?,
//!     query,
//!     vec!["id".into(), "created_at".into(), "text".into()],
//!     config.paging_time_field(None)?,
//!     config.paging_id_field(None)?,
//! );
//!
//! let summary =
//!     esextract::export_to_csv(&client, &request, ExportOptions::default(), "tweets.csv")
//!         .await?;
//! println!("wrote {} rows", summary.rows_written);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod flatten;
pub mod query;
pub mod sink;

// Re-export commonly used types at crate root
pub use client::ElasticClient;
pub use config::ExtractConfig;
pub use error::{ExtractError, ExtractResult};
pub use export::{ExportOptions, ExportRequest, ExportSummary, Exporter, SearchSource};
pub use query::{CombineMode, Query, QueryBuilder, SearchTerm};
pub use sink::{CsvSink, JsonSink, MemorySink, RowSink};

use std::path::Path;

use serde_json::Value;

/// Exports every document matching `request` to a CSV file at `path`.
pub async fn export_to_csv(
    source: &dyn SearchSource,
    request: &ExportRequest,
    options: ExportOptions,
    path: impl AsRef<Path>,
) -> ExtractResult<ExportSummary> {
    let mut sink = CsvSink::create(path)?;
    Exporter::new(source)
        .with_options(options)
        .run(request, &mut sink)
        .await
}

/// Exports every document matching `request` to a JSON file at `path`,
/// written as one array of records.
pub async fn export_to_json(
    source: &dyn SearchSource,
    request: &ExportRequest,
    options: ExportOptions,
    path: impl AsRef<Path>,
) -> ExtractResult<ExportSummary> {
    let mut sink = JsonSink::create(path)?;
    Exporter::new(source)
        .with_options(options)
        .run(request, &mut sink)
        .await
}

/// Runs the export in memory and returns one JSON record per document.
pub async fn collect(
    source: &dyn SearchSource,
    request: &ExportRequest,
    options: ExportOptions,
) -> ExtractResult<Vec<Value>> {
    let mut sink = MemorySink::new();
    Exporter::new(source)
        .with_options(options)
        .run(request, &mut sink)
        .await?;
    Ok(sink.into_records())
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
