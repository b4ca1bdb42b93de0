use datastore::{PriorMismatch, StoreError};
use scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Data store error: {0}")]
    Store(#[from] StoreError),

    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Prior output does not match the current series: {0}")]
    PriorRejected(#[from] PriorMismatch),

    #[error("Run was stopped before {0}.")]
    Stopped(&'static str),
}
