//! Error types for varguard operations.

use thiserror::Error;

/// Errors that can occur while configuring or running a validation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No properties present in options")]
    MissingProperties,

    #[error("Invalid properties: {0}")]
    InvalidProperties(String),

    #[error("Cannot write corrections: stylesheet has no source path")]
    MissingPath,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
