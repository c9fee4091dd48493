//! Error Types

use thiserror::Error;

/// Errors reported by the library.
///
/// Store operations themselves never fail: a missing key is `None` or `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Rejected cleaner configuration
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The value and expiration indices disagree
    #[error("index corrupted: {0}")]
    IndexCorrupted(String),

    /// Malformed `key=value[:ttl]` entry text
    #[error("invalid entry: {0}")]
    InvalidEntry(String),
}

pub type Result<T> = std::result::Result<T, Error>;
