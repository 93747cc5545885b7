//! Fetching raw bytes (pages and images) from upstream.
//!
//! Everything above this crate talks to a [`FetcherHandle`], so tests swap in
//! a [`MockFetcher`] (behind the `mock` feature) instead of a live site.

pub mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use crate::http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, HttpFetcher};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockFetcher;
use async_trait::async_trait;
use std::sync::Arc;

pub type FetcherHandle = Arc<dyn Fetcher + Send + Sync>;

/// Retrieves the body of a URL.
///
/// Implementations make exactly one attempt; there is no retrying at this
/// layer.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> error::Result<Vec<u8>>;
}
