use core_types::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("No usable rows in {0}")]
    NoData(String),

    #[error("Rows from {origin} do not form a valid price series: {source}")]
    Series {
        origin: String,
        #[source]
        source: CoreError,
    },

    #[error("Malformed output row {line}: {reason}")]
    MalformedOutput { line: usize, reason: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }
}
