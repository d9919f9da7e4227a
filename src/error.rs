//! Error types for hubcsv operations.
//!
//! Defines error types for the three stages of an export run:
//! - Fetching rows from the HuggingFace datasets-server
//! - Converting fetched records into a table
//! - Writing the table to a CSV file

use thiserror::Error;

/// Errors that can occur while fetching rows from the datasets-server.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The API returned a non-success status.
    #[error("API returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// API rate limit exceeded (HTTP 429).
    #[error("Rate limited: retry after {retry_after:?} seconds")]
    RateLimited {
        /// Optional retry-after duration in seconds.
        retry_after: Option<u64>,
    },

    /// Failed to parse the response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The server reported more rows than it returned.
    #[error("Dataset truncated: expected {expected} rows, received {received}")]
    Truncated { expected: usize, received: usize },
}

/// Errors that can occur when converting fetched records into a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// A record was not a key/value object.
    #[error("Record at index {index} is not an object: {value}")]
    NotAnObject { index: usize, value: String },

    /// The split carried no column metadata.
    #[error("Split '{0}' has no feature columns")]
    NoColumns(String),
}

/// Errors that can occur while writing the output file.
#[derive(Debug, Error)]
pub enum WriteError {
    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Renaming the temp file onto the destination failed.
    #[error("Failed to persist output file: {0}")]
    Persist(String),
}

/// Errors that can occur while building or reading the CSV index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV file has no header record.
    #[error("CSV file '{0}' is empty")]
    EmptyCsv(String),

    /// A required column is missing from the CSV header.
    #[error("Column '{0}' not found in CSV header")]
    MissingColumn(String),

    /// The index file is not in the expected format.
    #[error("Corrupt index file: {0}")]
    Corrupt(String),
}

/// Errors that can occur while serving or issuing search queries.
#[derive(Debug, Error)]
pub enum SearchError {
    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The query is missing a required part.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The index could not be read.
    #[error("{0}")]
    Index(#[from] IndexError),
}

/// Any failure of an export run, tagged by the stage it occurred in.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Conversion(#[from] TableError),

    #[error("{0}")]
    Write(#[from] WriteError),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
