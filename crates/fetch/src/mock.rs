//! In-memory fetcher for testing.

use crate::Fetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Serves canned bodies keyed by exact URL and counts every call.
///
/// Unknown URLs answer with `Status(404)`, the same as upstream would for a
/// missing page. Ideal for tests that need to assert how many times a layer
/// above actually went to the network.
#[derive(Debug)]
pub struct MockFetcher {
    pages: HashMap<String, Vec<u8>>,
    failures: HashMap<String, u16>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockFetcher {
    pub fn with_pages(pages: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        Self {
            pages: pages.into_iter().map(|(url, body)| (url.into(), body.into())).collect(),
            failures: HashMap::new(),
            delay: None,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Adds (or replaces) a canned body.
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Makes a URL answer with the given HTTP status instead of its body.
    pub fn with_failure(mut self, url: impl Into<String>, status: u16) -> Self {
        self.failures.insert(url.into(), status);
        self
    }

    /// Sleeps before answering every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `url` has been fetched.
    pub fn calls(&self, url: &str) -> usize {
        self.lock_calls().get(url).copied().unwrap_or_default()
    }

    /// Number of fetches across all URLs.
    pub fn total_calls(&self) -> usize {
        self.lock_calls().values().sum()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        // A poisoned lock only means another test thread panicked mid-count.
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
impl Default for MockFetcher {
    fn default() -> Self {
        let pages: [(&str, &str); 0] = [];
        Self::with_pages(pages)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        *self.lock_calls().entry(url.to_string()).or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = self.failures.get(url) {
            exn::bail!(ErrorKind::Status(*status));
        }
        self.pages.get(url).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::Status(404)))
    }
}
