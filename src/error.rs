use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between an HTTP request and the store.
///
/// The `Display` text of `InvalidTimestamp` and `NoMatch` is the exact body
/// the HTTP boundary sends back, so these messages are part of the contract.
#[derive(Error, Debug)]
pub enum SatError {
    #[error("Incorrect data format, should be YYYY-MM-DDTHH:MM:SS")]
    InvalidTimestamp,

    #[error("Invalid coordinate: {value}")]
    InvalidCoordinate { value: String },

    #[error("No satellites for the given parameters")]
    NoMatch,

    #[error("Dataset not found at path: {path}")]
    DatasetNotFound { path: PathBuf },

    #[error("Malformed dataset {path}: {reason}")]
    DatasetMalformed { path: PathBuf, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SatError>;
