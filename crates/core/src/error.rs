//! Error types for e-paper conversions.
//!
//! Every failure that can happen while fetching, decoding, assembling or
//! writing an issue is a variant of [`EpaperError`]. A conversion has no
//! partial-success mode: any error returned from the pipeline aborts the run.
//!
//! # Example
//!
//! ```rust
//! use epaper_core::{EpaperError, Result};
//!
//! fn check_entitlement(title: &str, subscribed: bool) -> Result<()> {
//!     if !subscribed {
//!         return Err(EpaperError::NotEntitled { title: title.to_string() });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for conversion operations.
///
/// Missing pictures are not errors; they are recorded on the picture itself
/// (observed size `0`) and rendered as a placeholder.
#[derive(Error, Debug)]
pub enum EpaperError {
    /// HTTP transport errors from reqwest.
    ///
    /// Network errors, DNS failures, TLS and connection problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided (base URL or a derived resource URL).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered a JSON resource with a non-success status.
    #[error("Server returned {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// A response body could not be decoded into the expected record.
    #[error("Failed to decode {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// A resource the pipeline depends on does not exist.
    #[error("Resource not found: {0}")]
    MissingResource(String),

    /// The issue was neither subscribed nor purchased.
    #[error("{title} was neither subscribed nor purchased")]
    NotEntitled { title: String },

    /// The requested edition is not in the edition catalog.
    #[error("There is no edition named {0}")]
    UnknownEdition(String),

    /// The login endpoint rejected the credentials.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// The issue record contradicts itself (e.g. page titles vs. page count).
    #[error("Inconsistent issue {title}: {reason}")]
    InconsistentIssue { title: String, reason: String },

    /// A date could not be interpreted as `YYYYMMDD`.
    #[error("Invalid issue date: {0}")]
    InvalidDate(String),

    /// The assembled package broke one of its cross-reference invariants.
    #[error("Package invariant violated: {0}")]
    Package(String),

    /// A timestamp could not be formatted.
    #[error("Failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    /// Errors from the zip container.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An archive path was written twice.
    #[error("Archive entry written twice: {0}")]
    DuplicateEntry(String),

    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for EpaperError.
pub type Result<T> = std::result::Result<T, EpaperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EpaperError::UnknownEdition("az-x".to_string());
        assert!(err.to_string().contains("az-x"));
    }

    #[test]
    fn test_not_entitled_names_issue() {
        let err = EpaperError::NotEntitled { title: "Dürener Zeitung".to_string() };
        assert_eq!(err.to_string(), "Dürener Zeitung was neither subscribed nor purchased");
    }

    #[test]
    fn test_http_status_error() {
        let err = EpaperError::HttpStatus { status: 404, url: "https://example.com/api/az-d/20200821/3".to_string() };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("20200821/3"));
    }

    #[test]
    fn test_timeout_error() {
        let err = EpaperError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }
}
