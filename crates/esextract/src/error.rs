//! Error types for the export pipeline.
//!
//! Errors are split into three categories matching where they arise:
//! configuration resolution, input validation, and transport. Configuration
//! and input errors are raised eagerly, before any network call; transport
//! errors abort the export with no retry.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all export operations.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Configuration resolution errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation errors
    #[error(transparent)]
    Input(#[from] InputError),

    /// Search engine transport errors
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// File I/O errors
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding errors
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised when a required setting cannot be resolved from either an
/// explicit value or its environment fallback.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No index was supplied and `DEFAULT_INDEX` is not set.
    #[error("no index supplied and no DEFAULT_INDEX fallback is set")]
    IndexUnresolved,

    /// A date range was requested without a usable date field.
    #[error("a date range needs a date field: none supplied and no DEFAULT_DATE_FIELD fallback is set")]
    DateFieldUnresolved,

    /// No paging id field was supplied and `PAGE_ID_FIELD` is not set.
    #[error("no paging id field supplied and no PAGE_ID_FIELD fallback is set")]
    PagingIdUnresolved,

    /// No paging time field was supplied and `PAGE_TIME_FIELD` is not set.
    #[error("no paging time field supplied and no PAGE_TIME_FIELD fallback is set")]
    PagingTimeUnresolved,

    /// An environment variable held a value that could not be parsed.
    #[error("invalid {name} value {value:?}: {message}")]
    InvalidEnvValue {
        name: &'static str,
        value: String,
        message: String,
    },

    /// The composed node URL could not be parsed.
    #[error("invalid node url {url:?}: {message}")]
    InvalidNodeUrl { url: String, message: String },
}

/// Errors raised by eager validation of caller-supplied parameters.
#[derive(Error, Debug)]
pub enum InputError {
    /// The query has no constraint at all.
    #[error("no search terms, exists fields, or match-all flag supplied")]
    EmptyQuery,

    /// Only one of the two range endpoints was supplied.
    #[error("start and end dates must be supplied together")]
    IncompleteDateRange,

    /// A date literal did not parse as `yyyy-MM-dd`.
    #[error("invalid date {value:?}: expected yyyy-MM-dd")]
    InvalidDate { value: String },

    /// The directory portion of the output path does not exist.
    #[error("output directory {} does not exist", .path.display())]
    OutputDirMissing { path: PathBuf },
}

/// Errors raised while talking to the search engine.
///
/// None of these are retried; the export loop terminates on the first one,
/// leaving any rows already flushed to disk in place.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The underlying client failed to send or receive.
    #[error("elasticsearch request failed: {0}")]
    Request(#[from] elasticsearch::Error),

    /// The transport could not be constructed from the configuration.
    #[error("failed to build the elasticsearch transport: {message}")]
    ClientBuild { message: String },

    /// The engine answered with a non-success HTTP status.
    #[error("{operation} request returned status {status}: {body}")]
    ErrorStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The engine answered 2xx but the body was not the expected shape.
    #[error("malformed {operation} response: {message}")]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },
}

/// Result type alias for export operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::IndexUnresolved;
        assert_eq!(
            err.to_string(),
            "no index supplied and no DEFAULT_INDEX fallback is set"
        );

        let err = ConfigError::InvalidEnvValue {
            name: "ELASTIC_PORT",
            value: "nine".to_string(),
            message: "invalid digit found in string".to_string(),
        };
        assert!(err.to_string().contains("ELASTIC_PORT"));
        assert!(err.to_string().contains("nine"));
    }

    #[test]
    fn test_input_error_display() {
        let err = InputError::IncompleteDateRange;
        assert_eq!(err.to_string(), "start and end dates must be supplied together");

        let err = InputError::InvalidDate {
            value: "2020-13-40".to_string(),
        };
        assert!(err.to_string().contains("2020-13-40"));

        let err = InputError::OutputDirMissing {
            path: PathBuf::from("/no/such/dir"),
        };
        assert!(err.to_string().contains("/no/such/dir"));
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::ErrorStatus {
            operation: "search",
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "search request returned status 500: boom");

        let err = TransportError::MalformedResponse {
            operation: "count",
            message: "missing count field".to_string(),
        };
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn test_extract_error_from_sub_errors() {
        let err: ExtractError = ConfigError::DateFieldUnresolved.into();
        assert!(matches!(err, ExtractError::Config(_)));

        let err: ExtractError = InputError::EmptyQuery.into();
        assert!(matches!(err, ExtractError::Input(_)));

        let err: ExtractError = TransportError::ClientBuild {
            message: "bad".to_string(),
        }
        .into();
        assert!(matches!(err, ExtractError::Transport(_)));
    }

    #[test]
    fn test_extract_error_transparent_display() {
        let err: ExtractError = InputError::EmptyQuery.into();
        assert_eq!(
            err.to_string(),
            "no search terms, exists fields, or match-all flag supplied"
        );
    }
}
