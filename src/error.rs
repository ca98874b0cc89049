//! Error types.
//!
//! Only [`ConfigError`] ever reaches a caller. Capture and encoding failures are
//! absorbed inside the pipeline so logging is never the reason an exchange fails.

use std::num::ParseIntError;
use std::str::ParseBoolError;

/// Invalid logger configuration, reported when the configuration is built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid maxContentSize {value:?}: {source}")]
    InvalidMaxContentSize {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid boolean for {name}: {value:?}: {source}")]
    InvalidFlag {
        name: &'static str,
        value: String,
        #[source]
        source: ParseBoolError,
    },
    #[error("excluded path must not be empty")]
    EmptyExcludedPath,
    #[error("excluded path {0:?} must start with '/'")]
    RelativeExcludedPath(String),
}

/// Failure while reading a body through a capture.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to read body: {0}")]
    Read(#[from] axum::Error),
    /// A read failure replayed to the downstream reader of a captured body.
    #[error("captured body stream failed: {0}")]
    Replay(String),
}

/// A summary could not be turned into a log line.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("cannot serialize summary to JSON: {0}")]
    Json(#[from] serde_json::Error),
}
