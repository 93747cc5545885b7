use crate::Fetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_USER_AGENT: &str = concat!("komik/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Fetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}
impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Network("could not build HTTP client".to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(status, bytes))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|err| classify(url, err))?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if !status.is_success() {
            tracing::debug!("Upstream returned a non-success status");
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let body = response.bytes().await.map_err(|err| classify(url, err))?;
        tracing::Span::current().record("bytes", body.len());
        Ok(body.to_vec())
    }
}

fn classify(url: &str, err: reqwest::Error) -> crate::error::Error {
    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else if err.is_builder() {
        ErrorKind::InvalidUrl(url.to_string())
    } else if let Some(status) = err.status() {
        ErrorKind::Status(status.as_u16())
    } else {
        ErrorKind::Network(err.to_string())
    };
    exn::Exn::from(err).raise(kind)
}
