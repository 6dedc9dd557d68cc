//! Error types for hexfilter construction and streaming

use std::io;
use thiserror::Error;

/// Hexfilter error type
#[derive(Error, Debug)]
pub enum Error {
    /// A description filter pattern failed to compile
    #[error("Invalid description pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The record pattern derived from the dialect failed to compile
    #[error("Invalid record pattern: {0}")]
    InvalidRecordPattern(#[source] regex::Error),

    /// Dialect settings that can never match a record
    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),

    /// I/O error from the caller's reader or writer
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for hexfilter operations
pub type Result<T> = std::result::Result<T, Error>;
