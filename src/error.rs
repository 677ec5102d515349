//! Error handling for zipmirror.
//!
//! Every fault the pipeline can hit is a variant of [`Error`]. The
//! orchestrator turns most of them into per-archive reports; only a
//! failure to read the index page ends the run.

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can happen while mirroring.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// Captures failures that don't fit into other categories, such as a
    /// blocking task that panicked.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The URL does not yield a usable local filename once cleaned.
    #[error("Invalid filename after cleaning: {0:?}")]
    InvalidFilename(String),

    /// I/O Error.
    ///
    /// Wraps standard I/O errors raised while staging, promoting or
    /// extracting files.
    #[error("I/O error: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    ///
    /// Network failures, HTTP status errors and body read errors.
    #[error("Reqwest error: {source}")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised by the HTTP middleware stack.
    #[error("HTTP middleware error: {source}")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// No data arrived within the configured read timeout.
    #[error("Timed out after {0:?} waiting for data")]
    Timeout(std::time::Duration),

    /// The staged file does not have the size the server announced.
    #[error("Download incomplete (size mismatch): expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// A partial response does not start where the staged file ends.
    #[error("Server answered range request for offset {requested} starting at {received:?}")]
    RangeMismatch {
        requested: u64,
        received: Option<u64>,
    },

    /// The server refused the requested range and the staged bytes do not
    /// match its total size.
    #[error("Range starting at {offset} not satisfiable (server total: {total:?})")]
    RangeNotSatisfiable { offset: u64, total: Option<u64> },

    /// The archive contains entries that would escape the target directory.
    #[error("Suspicious path(s) in {}: {}", .archive.display(), .entries.join(", "))]
    UnsafeArchive {
        archive: PathBuf,
        entries: Vec<String>,
    },

    /// The archive could not be read.
    #[error("Zip error: {source}")]
    Zip {
        #[from]
        source: zip::result::ZipError,
    },
}

impl Error {
    /// Whether a download attempt that failed with this error is worth
    /// repeating.
    ///
    /// Client errors other than `408 Request Timeout` and
    /// `429 Too Many Requests` cannot succeed on a retry; everything else
    /// (transport faults, timeouts, size mismatches, server errors) can.
    pub fn is_retryable(&self) -> bool {
        let status = match self {
            Error::Reqwest { source } => source.status(),
            Error::Middleware {
                source: reqwest_middleware::Error::Reqwest(source),
            } => source.status(),
            Error::InvalidUrl(_) | Error::InvalidFilename(_) | Error::UnsafeArchive { .. } => {
                return false
            }
            _ => None,
        };
        match status {
            Some(StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS) => true,
            Some(code) => !code.is_client_error(),
            None => true,
        }
    }
}

/// Result type alias for operations that can fail with a zipmirror error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_is_retryable() {
        let err = Error::SizeMismatch {
            expected: 10,
            actual: 4,
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("size mismatch"));
    }

    #[test]
    fn test_invalid_filename_is_not_retryable() {
        assert!(!Error::InvalidFilename("?*".into()).is_retryable());
    }

    #[test]
    fn test_unsafe_archive_lists_entries() {
        let err = Error::UnsafeArchive {
            archive: PathBuf::from("evil.zip"),
            entries: vec!["../../etc/passwd".into(), "/abs".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("evil.zip"));
        assert!(msg.contains("../../etc/passwd, /abs"));
    }
}
