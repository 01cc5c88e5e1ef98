use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading the input file.
///
/// The loader never surfaces these to its caller; they are logged and the
/// file yields zero records.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("permission denied reading {path} after {attempts} attempts")]
    AccessDenied { path: PathBuf, attempts: u32 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while producing the CSV report
#[derive(Debug, Error)]
pub enum ReportError {
    /// No key path carried a non-null scalar
    #[error("no data to write to the CSV")]
    EmptyAggregation,

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to move CSV into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
