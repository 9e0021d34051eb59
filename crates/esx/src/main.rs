//! esx - Elasticsearch search export
//!
//! Builds a boolean query from command-line flags, pages through every
//! matching document and writes one flattened row per document to a CSV or
//! JSON file.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing::info;

use esextract::config::ExtractConfig;
use esextract::export::{ExportOptions, ExportRequest, Exporter};
use esextract::query::{CombineMode, QueryBuilder};
use esextract::sink::{CsvSink, JsonSink, RowSink};
use esextract::{ElasticClient, ExtractError};

/// Command-line arguments.
///
/// Connection settings (host, port, credentials) and fallbacks for the index,
/// date field and paging fields come from the environment; see
/// [`ExtractConfig`] for the variable names.
#[derive(Debug, Parser)]
#[command(name = "esx")]
#[command(about = "Export the full result set of an Elasticsearch query to CSV or JSON")]
struct Cli {
    /// Match every document instead of filtering. A date range still applies.
    #[arg(short, long)]
    match_all: bool,

    /// A query-string search over a space-separated field list; repeatable.
    /// Example: -s "text user.name" "(happy OR glad)"
    #[arg(short, long, num_args = 2, value_names = ["FIELDS", "QUERY"], action = clap::ArgAction::Append)]
    search: Vec<String>,

    /// Only match documents where this field has a value; repeatable.
    #[arg(short, long, value_name = "FIELD")]
    exists: Vec<String>,

    /// How multiple search/exists constraints combine.
    #[arg(long, value_enum, default_value = "and")]
    combine: CombineArg,

    /// Index to search (falls back to DEFAULT_INDEX).
    #[arg(short, long)]
    index: Option<String>,

    /// Output fields; omit to export whole documents with columns taken from
    /// the first hit.
    #[arg(short, long, num_args = 1.., value_name = "FIELD")]
    fields: Vec<String>,

    /// Field the date range filters on (falls back to DEFAULT_DATE_FIELD).
    #[arg(short, long)]
    date_field: Option<String>,

    /// Inclusive start of the date range (yyyy-MM-dd). Requires --end.
    #[arg(long, value_name = "DATE")]
    start: Option<String>,

    /// Inclusive end of the date range (yyyy-MM-dd, or "now"). Requires --start.
    #[arg(long, value_name = "DATE")]
    end: Option<String>,

    /// Output file path.
    #[arg(short, long, default_value = "output.csv")]
    out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Unique tie-breaker field for pagination (falls back to PAGE_ID_FIELD).
    #[arg(long, value_name = "FIELD")]
    page_id: Option<String>,

    /// Time field for pagination ordering (falls back to PAGE_TIME_FIELD).
    #[arg(long, value_name = "FIELD")]
    page_time: Option<String>,

    /// Documents fetched per request (max 10000).
    #[arg(long, default_value = "10000")]
    page_size: usize,

    /// Buffered rows before a flush to the output file.
    #[arg(long, default_value = "100000")]
    flush_threshold: usize,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "ESX_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// How multiple query constraints combine.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CombineArg {
    /// Every constraint must match.
    And,
    /// At least one constraint must match.
    Or,
}

impl From<CombineArg> for CombineMode {
    fn from(arg: CombineArg) -> Self {
        match arg {
            CombineArg::And => CombineMode::Must,
            CombineArg::Or => CombineMode::Should,
        }
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values, one row per document.
    Csv,
    /// One JSON array of record objects.
    Json,
}

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("esx={level},esextract={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Reports an eager validation failure and stops before any network call.
fn fail(error: ExtractError) -> ! {
    eprintln!("error: {error}");
    std::process::exit(1);
}

fn build_query(args: &Cli, config: &ExtractConfig) -> Result<esextract::Query, ExtractError> {
    let mut builder = QueryBuilder::new()
        .with_match_all(args.match_all)
        .with_combine_mode(args.combine.into());

    for pair in args.search.chunks(2) {
        if let [fields, query] = pair {
            builder = builder.with_search(fields.split_whitespace(), query.as_str());
        }
    }
    for field in &args.exists {
        builder = builder.with_exists(field.as_str());
    }

    if let Some(field) = config.date_field(args.date_field.as_deref()) {
        builder = builder.with_date_field(field);
    }
    if let Some(start) = args.start.as_deref() {
        builder = builder.with_start_date(start);
    }
    if let Some(end) = args.end.as_deref() {
        builder = builder.with_end_date(end);
    }

    builder.build()
}

/// Opens the output file for the selected format.
///
/// Runs with the other argument checks, before the first network call.
fn open_sink(format: OutputFormat, path: &Path) -> Result<Box<dyn RowSink>, ExtractError> {
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvSink::create(path)?),
        OutputFormat::Json => Box::new(JsonSink::create(path)?),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(&args.log_level);

    let config = match ExtractConfig::from_env() {
        Ok(config) => config,
        Err(e) => fail(e.into()),
    };

    let query = match build_query(&args, &config) {
        Ok(query) => query,
        Err(e) => fail(e),
    };

    let index = match config.index(args.index.as_deref()) {
        Ok(index) => index,
        Err(e) => fail(e.into()),
    };
    let time_field = match config.paging_time_field(args.page_time.as_deref()) {
        Ok(field) => field,
        Err(e) => fail(e.into()),
    };
    let id_field = match config.paging_id_field(args.page_id.as_deref()) {
        Ok(field) => field,
        Err(e) => fail(e.into()),
    };

    let request = ExportRequest::new(index, query, args.fields.clone(), time_field, id_field);
    let options = ExportOptions::default()
        .with_page_size(args.page_size)
        .with_flush_threshold(args.flush_threshold);

    let client = match ElasticClient::new(&config) {
        Ok(client) => client,
        Err(e) => fail(e),
    };

    let mut sink = match open_sink(args.format, &args.out) {
        Ok(sink) => sink,
        Err(e) => fail(e),
    };

    info!(
        index = %request.index,
        out = %args.out.display(),
        format = ?args.format,
        "starting export"
    );

    let summary = Exporter::new(&client)
        .with_options(options)
        .run(&request, sink.as_mut())
        .await?;

    info!(
        matched = summary.matched,
        rows = summary.rows_written,
        pages = summary.pages,
        out = %args.out.display(),
        "export finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use esextract::error::InputError;

    #[test]
    fn test_open_sink_rejects_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let result = open_sink(OutputFormat::Csv, &path);
        assert!(matches!(
            result,
            Err(ExtractError::Input(InputError::OutputDirMissing { .. }))
        ));
    }

    #[test]
    fn test_open_sink_creates_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        assert!(open_sink(OutputFormat::Json, &path).is_ok());
        assert!(path.exists());
    }
}
