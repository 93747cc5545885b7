//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the fetch, archive and
//! config crates are re-raised into one of these kinds, keeping the original
//! as a child frame.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream could not be reached, timed out, or answered with an error
    #[display("upstream unavailable")]
    UpstreamUnavailable,
    /// The page exists but has no record in it, or upstream said it's gone
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// None of the requested chapters belong to the series
    #[display("no valid chapters selected")]
    EmptySelection,
    /// An archive could not be packed
    #[display("could not build archive")]
    Archive,
    /// The job was cancelled before it finished
    #[display("cancelled")]
    Cancelled,
    /// A file name template failed to compile or render
    #[display("issue with file name generation from template")]
    Template,
    /// A URL or link could not be resolved against the site
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// An event could not be encoded
    #[display("could not encode event")]
    Encode,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable | Self::Archive)
    }
}

/// Re-raises a fetch failure: upstream 404/410 becomes [`ErrorKind::NotFound`],
/// anything else [`ErrorKind::UpstreamUnavailable`].
#[track_caller]
pub(crate) fn fetch(err: komik_fetch::error::Error, url: &str) -> Error {
    let kind = if err.is_not_found() { ErrorKind::NotFound(url.to_string()) } else { ErrorKind::UpstreamUnavailable };
    err.raise(kind)
}

/// Re-raises an archive failure, keeping cancellation distinguishable.
#[track_caller]
pub(crate) fn archive(err: komik_archive::error::Error) -> Error {
    let kind = match &*err {
        komik_archive::error::ErrorKind::Cancelled => ErrorKind::Cancelled,
        _ => ErrorKind::Archive,
    };
    err.raise(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_upstream_pages_are_not_found() {
        let err = fetch(exn::Exn::from(komik_fetch::error::ErrorKind::Status(404)), "https://x/komik/a");
        assert_eq!(*err, ErrorKind::NotFound("https://x/komik/a".to_string()));
        let err = fetch(exn::Exn::from(komik_fetch::error::ErrorKind::Timeout), "https://x/komik/a");
        assert_eq!(*err, ErrorKind::UpstreamUnavailable);
        assert!(err.is_retryable());
    }

    #[test]
    fn cancelled_archives_stay_cancelled() {
        let err = archive(exn::Exn::from(komik_archive::error::ErrorKind::Cancelled));
        assert_eq!(*err, ErrorKind::Cancelled);
        let err = archive(exn::Exn::from(komik_archive::error::ErrorKind::Write));
        assert_eq!(*err, ErrorKind::Archive);
    }
}
