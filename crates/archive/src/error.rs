//! Archive Error Types

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The ZIP container could not be written
    #[display("could not write archive")]
    Write,
    /// The build was cancelled before it finished
    #[display("archive build cancelled")]
    Cancelled,
    /// One asset could not be fetched and was left out (1-based index)
    #[display("asset {_0} skipped")]
    PartialAsset(#[error(not(source))] usize),
}
impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::PartialAsset(_))
    }
}
