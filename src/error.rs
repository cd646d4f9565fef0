//! Error types for problem-crawler
//!
//! Errors come in two tiers:
//! - [`Error`] is fatal to a run (bad configuration, unusable metadata index,
//!   unwritable output directory) and is propagated to the caller.
//! - [`FetchFailure`] classifies a single failed detail attempt. Every variant
//!   is retryable; failures are contained in the retry controller and only
//!   surface as a final per-item classification.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for problem-crawler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for problem-crawler
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "start")
        key: Option<String>,
    },

    /// The metadata index could not be obtained or is unusable
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Failures while obtaining the metadata index
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Local snapshot could not be read
    #[error("failed to read metadata snapshot {path}: {source}")]
    ReadSnapshot {
        /// Path of the snapshot file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Snapshot or remote body is not valid index JSON
    #[error("failed to parse metadata from {origin}: {source}")]
    Parse {
        /// Where the metadata came from (file path or URL)
        origin: String,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// Remote index request failed at the transport level
    #[error("failed to fetch metadata from {url}: {source}")]
    Fetch {
        /// Index URL
        url: String,
        /// Underlying transport error
        source: reqwest::Error,
    },

    /// Remote index answered with a non-success status
    #[error("metadata endpoint {url} returned HTTP {status}")]
    Status {
        /// Index URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The index holds no work entries
    #[error("metadata index contains no problems")]
    Empty,
}

/// Classification of one failed detail attempt
///
/// All variants are transient from the crawler's point of view: the attempt
/// is retried until the attempt budget runs out.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// Timeout, connection refused, reset, etc.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than HTTP 200
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body was not valid JSON
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// Valid JSON without a `data.question` object
    #[error("invalid payload: response has no data.question object")]
    InvalidPayload,

    /// The document could not be written to disk
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    /// The run was cancelled before the item completed
    #[error("interrupted")]
    Interrupted,
}

impl FetchFailure {
    /// Short machine-readable tag for log fields
    pub fn reason(&self) -> &'static str {
        match self {
            FetchFailure::Transport(e) if e.is_timeout() => "timeout",
            FetchFailure::Transport(e) if e.is_connect() => "connect",
            FetchFailure::Transport(_) => "transport",
            FetchFailure::Status(_) => "status",
            FetchFailure::MalformedJson(_) => "malformed_json",
            FetchFailure::InvalidPayload => "invalid_payload",
            FetchFailure::Write(_) => "write",
            FetchFailure::Interrupted => "interrupted",
        }
    }
}
