use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a source file into a [`Dataset`](super::model::Dataset).
///
/// A missing source is *not* an error: the repository reports it as
/// `Ok(None)` so the shell can ask for an upload instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON row {row} is not an object")]
    NotAnObject { row: usize },

    #[error("expected a top-level JSON array of records")]
    NotAnArray,

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}
