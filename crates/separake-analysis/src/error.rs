//! Error types for the analysis pipeline
//!
//! Every failure that aborts a run carries the path it was raised for.

use std::path::PathBuf;

/// Analysis errors
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// File system error on a specific path
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON document (parameters, arguments, results, snapshot)
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Parameters document is valid JSON but not an object
    #[error("parameters in {0} must be a JSON object")]
    ParametersNotObject(PathBuf),

    /// `partial_length` string other than the known sentinels
    #[error("unexpected echo-count label {label:?} in {path}")]
    UnknownEchoLabel { path: PathBuf, label: String },

    /// `partial_length` number that is not an integer
    #[error("echo count {value} in {path} is not an integer")]
    NonIntegerEchoCount { path: PathBuf, value: f64 },

    /// A metric array shorter than the `sdr` array of the same record
    #[error("record {record} in {path}: `{metric}` has {actual} entries, expected at least {expected}")]
    MetricLengthMismatch {
        path: PathBuf,
        record: usize,
        metric: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Source index with no entry in the source label table
    #[error("no speaker label for source index {index} (table has {table_len} entries)")]
    MissingSourceLabel { index: usize, table_len: usize },

    /// Snapshot written with an incompatible layout
    #[error("snapshot {path} has format version {found}, expected {expected}")]
    SnapshotVersion { path: PathBuf, found: u32, expected: u32 },

    /// Figures directory is not created by the pipeline
    #[error("figures directory {0} does not exist")]
    MissingFiguresDir(PathBuf),

    /// Nothing to aggregate
    #[error("no result rows were found in the given directories")]
    EmptyTable,

    /// Configuration file could not be parsed
    #[error("invalid configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration parsed but semantically invalid
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Drawing backend failure
    #[error("failed to render {path}: {message}")]
    Plot { path: PathBuf, message: String },
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        AnalysisError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
