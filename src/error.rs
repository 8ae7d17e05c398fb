//! Error handling for listing processing operations.
//!
//! Only structural failures are errors: unreadable input, unwritable output
//! and invalid configuration. Malformed or missing field values never reach
//! this type; the field parsers absorb them as missing values.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input file not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

pub type Result<T> = std::result::Result<T, ListingError>;
