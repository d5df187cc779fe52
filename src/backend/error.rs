//! Error types shared across the update pipeline.

use std::io;

/// Convenient result alias for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors that can occur while polling, downloading, or installing a
/// release. Every variant renders as a message fit for a failure
/// notification; none are retried past the HTTP client's own policy.
#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    /// Transport-level failure (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response after redirect resolution.
    #[error("server returned HTTP {status} for {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },
    /// A redirect response without a usable Location header.
    #[error("redirect from {0} carried no download location")]
    Redirect(String),
    /// The response body is not an archive.
    #[error("downloaded file is not a ZIP archive (Content-Type: {0})")]
    ContentMismatch(String),
    /// The downloaded file is not a structurally valid archive.
    #[error("invalid ZIP archive: {0}")]
    CorruptArchive(String),
    /// The version-history API rejected the request or sent a malformed
    /// envelope.
    #[error("{0}")]
    Protocol(String),
    /// Filesystem operation failed while installing or listing versions.
    #[error("{context}: {source}")]
    Filesystem {
        context: String,
        source: io::Error,
    },
}

impl UpdateError {
    pub(crate) fn fs(context: impl Into<String>, source: io::Error) -> Self {
        Self::Filesystem {
            context: context.into(),
            source,
        }
    }
}
