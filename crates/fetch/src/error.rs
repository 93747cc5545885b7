//! Fetch Error Types

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Upstream took longer than the configured request timeout
    #[display("request timed out")]
    Timeout,
    /// Upstream answered with a non-success status code
    #[display("upstream returned HTTP {_0}")]
    Status(#[error(not(source))] u16),
    /// Connection, TLS or body transfer failure
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// URL could not be parsed into a request
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
}
impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing in komik retries on its own; callers can decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Status(status) => *status >= 500,
            Self::InvalidUrl(_) => false,
        }
    }

    /// Whether upstream reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(404 | 410))
    }
}
