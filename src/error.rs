//! Error types for the planner.

use thiserror::Error;

/// Request validation and precondition failures.
///
/// Everything here rejects the whole planning request; nothing is partially
/// applied.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("mandatory-first stop `{0}` does not match any stop in the request")]
    UnknownMandatoryStop(String),

    #[error("stop id `{0}` appears more than once")]
    DuplicateStopId(String),

    #[error("stop `{id}` has work duration {minutes} min, expected at least 1")]
    InvalidWorkMinutes { id: String, minutes: u32 },

    #[error("{count} stops requested, at most {max} allowed per day")]
    TooManyStops { count: usize, max: usize },

    #[error("distance matrix is {actual} wide where {expected} was expected")]
    MatrixDimension { expected: usize, actual: usize },

    #[error("index {index} is outside the valid range 1..{len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("route index {index} does not refer to one of the {stops} stops")]
    RouteIndexOutOfRange { index: usize, stops: usize },

    #[error("invalid planner configuration: {0}")]
    InvalidConfig(String),
}

/// Failures of the networked distance lookup.
///
/// These never reach callers of [`crate::matrix::compute`]; they select the
/// fallback branch instead.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("distance API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("distance API returned status {status}: {message}")]
    Api { status: String, message: String },

    #[error("distance API response malformed: {0}")]
    Malformed(String),
}

/// Failures while loading a configuration or request file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush output: {0}")]
    Io(#[from] std::io::Error),
}
