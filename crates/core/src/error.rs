//! Error types for Rivulet
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Every error is the terminal outcome of a single call. Nothing is
//! retried internally; retry policy belongs to the calling transport
//! layer.

use thiserror::Error;

/// Result type alias for Rivulet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for stream operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The named stream, shard, or resource does not exist
    #[error("{kind} not found: {name}")]
    ResourceNotFound {
        /// Resource kind ("stream", "shard", ...)
        kind: &'static str,
        /// The name or id that failed to resolve
        name: String,
    },

    /// Create on an already-existing name
    #[error("resource already in use: {0}")]
    ResourceInUse(String),

    /// Malformed input: bad iterator type, unroutable hash key,
    /// unknown iterator token, unlocatable sequence number
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Iterator token found but past its time-to-live
    #[error("shard iterator has expired")]
    ExpiredIterator,
}

impl Error {
    /// Shorthand for a missing stream
    pub fn stream_not_found(name: impl Into<String>) -> Self {
        Error::ResourceNotFound {
            kind: "stream",
            name: name.into(),
        }
    }

    /// Shorthand for a missing shard
    pub fn shard_not_found(name: impl Into<String>) -> Self {
        Error::ResourceNotFound {
            kind: "shard",
            name: name.into(),
        }
    }

    /// Stable short code for the error kind
    ///
    /// `PutRecords` per-entry failures carry this code next to the
    /// human-readable message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::ResourceNotFound { .. } => "ResourceNotFound",
            Error::ResourceInUse(_) => "ResourceInUse",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::ExpiredIterator => "ExpiredIterator",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::stream_not_found("orders");
        let msg = err.to_string();
        assert!(msg.contains("stream not found"));
        assert!(msg.contains("orders"));
    }

    #[test]
    fn test_error_display_in_use() {
        let err = Error::ResourceInUse("orders".to_string());
        assert!(err.to_string().contains("already in use"));
    }

    #[test]
    fn test_error_display_invalid_argument() {
        let err = Error::InvalidArgument("bad shard iterator".to_string());
        let msg = err.to_string();
        assert!(msg.contains("invalid argument"));
        assert!(msg.contains("bad shard iterator"));
    }

    #[test]
    fn test_error_display_expired_iterator() {
        assert!(Error::ExpiredIterator.to_string().contains("expired"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::stream_not_found("x").code(), "ResourceNotFound");
        assert_eq!(Error::ResourceInUse("x".into()).code(), "ResourceInUse");
        assert_eq!(
            Error::InvalidArgument("x".into()).code(),
            "InvalidArgument"
        );
        assert_eq!(Error::ExpiredIterator.code(), "ExpiredIterator");
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
