use crate::batch::BatchJob;
use crate::error::{self, ErrorKind, Result};
use crate::site::Site;
use crate::template::FileNamer;
use exn::ResultExt;
use komik_archive::{Archive, ArchiveBuilder, Container, SkippedAsset};
use komik_cache::{Cache, CacheKey, Operation};
use komik_config::Config;
use komik_extract::models::{ChapterPage, Listing, ListingEntry, MangaDetail};
use komik_extract::{Extractor, Outcome};
use komik_fetch::{FetcherHandle, HttpFetcher};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

/// Operations dropped by [`Komik::invalidate_cache`]. Search results are left
/// to expire on their own.
const REFRESHED_OPERATIONS: [Operation; 3] = [Operation::Listing, Operation::Detail, Operation::Chapter];

/// A finished single-file download.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    /// Images left out because they failed to download
    pub skipped: Vec<SkippedAsset>,
}

/// The scraper service: cached record lookups and archive downloads.
///
/// Cheap to clone; clones share the fetcher and caches.
#[derive(Clone)]
pub struct Komik {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: FetcherHandle,
    site: Site,
    namer: FileNamer,
    ttl: Duration,
    asset_concurrency: usize,
    chapter_concurrency: usize,
    listings: Cache<Listing>,
    details: Cache<MangaDetail>,
    chapters: Cache<ChapterPage>,
}

impl Komik {
    pub fn new(config: &Config, fetcher: FetcherHandle) -> Result<Self> {
        let base = config.base_url().or_raise(|| ErrorKind::InvalidUrl(config.base_url.clone()))?;
        let inner = Inner {
            fetcher,
            site: Site::new(base)?,
            namer: FileNamer::new(&config.templates)?,
            ttl: config.cache_ttl(),
            asset_concurrency: config.asset_concurrency.max(1),
            chapter_concurrency: config.chapter_concurrency.max(1),
            listings: Cache::new(),
            details: Cache::new(),
            chapters: Cache::new(),
        };
        Ok(Self { inner: Arc::new(inner) })
    }

    /// Builds the service around a live HTTP fetcher.
    pub fn connect(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout())
            .or_raise(|| ErrorKind::UpstreamUnavailable)?;
        Self::new(config, Arc::new(fetcher))
    }

    pub fn site(&self) -> &Site {
        &self.inner.site
    }

    pub(crate) fn namer(&self) -> &FileNamer {
        &self.inner.namer
    }

    pub(crate) fn chapter_concurrency(&self) -> usize {
        self.inner.chapter_concurrency
    }

    /// A listing page (popular, latest, or a next-page link from a previous
    /// listing).
    #[instrument(skip(self), fields(hit))]
    pub async fn fetch_listing(&self, page_url: &str, force_refresh: bool) -> Result<Listing> {
        let url = self.site().page_url(page_url)?;
        let key = CacheKey::new(Operation::Listing, url.as_str());
        let (this, url) = (self, &url);
        let cached = self
            .inner
            .listings
            .get_or_compute(key, self.inner.ttl, force_refresh, move || async move {
                let body = this.page(url).await?;
                Ok::<_, error::Error>(this.extractor(&body).listing())
            })
            .await?;
        tracing::Span::current().record("hit", cached.hit);
        Ok(cached.value)
    }

    /// Search results for `query`. An empty result is not an error.
    #[instrument(skip(self), fields(hit))]
    pub async fn search_listing(&self, query: &str) -> Result<Vec<ListingEntry>> {
        let url = self.site().search_url(query)?;
        let key = CacheKey::new(Operation::Search, query.trim());
        let (this, url) = (self, &url);
        let cached = self
            .inner
            .listings
            .get_or_compute(key, self.inner.ttl, false, move || async move {
                let body = this.page(url).await?;
                Ok::<_, error::Error>(this.extractor(&body).listing())
            })
            .await?;
        tracing::Span::current().record("hit", cached.hit);
        Ok(cached.value.entries)
    }

    /// A series' metadata and chapter list.
    #[instrument(skip(self), fields(hit))]
    pub async fn fetch_detail(&self, content_url: &str, force_refresh: bool) -> Result<MangaDetail> {
        let url = self.site().content_url(content_url)?;
        let key = CacheKey::new(Operation::Detail, self.site().canonical(url.as_str()));
        let (this, url) = (self, &url);
        let cached = self
            .inner
            .details
            .get_or_compute(key, self.inner.ttl, force_refresh, move || async move {
                let body = this.page(url).await?;
                found(this.extractor(&body).detail(), url)
            })
            .await?;
        tracing::Span::current().record("hit", cached.hit);
        Ok(cached.value)
    }

    /// A chapter's reader page.
    #[instrument(skip(self), fields(hit))]
    pub async fn fetch_chapter_page(&self, chapter_url: &str, force_refresh: bool) -> Result<ChapterPage> {
        let url = self.site().chapter_url(chapter_url)?;
        let key = CacheKey::new(Operation::Chapter, self.site().canonical(url.as_str()));
        let (this, url) = (self, &url);
        let cached = self
            .inner
            .chapters
            .get_or_compute(key, self.inner.ttl, force_refresh, move || async move {
                let body = this.page(url).await?;
                found(this.extractor(&body).chapter(), url)
            })
            .await?;
        tracing::Span::current().record("hit", cached.hit);
        Ok(cached.value)
    }

    /// One chapter as a `.cbz`. Images that fail to download are left out.
    #[instrument(skip(self, cancel))]
    pub async fn build_single_chapter_archive(
        &self,
        chapter_url: &str,
        cancel: &CancellationToken,
    ) -> Result<Download> {
        let page = self.fetch_chapter_page(chapter_url, false).await?;
        let archive = self.chapter_archive(&page.images, cancel).await?;
        let container = Container::Cbz;
        Ok(Download {
            file_name: container.file_name(&self.namer().chapter(&page.title)?),
            mime: container.mime(),
            bytes: archive.bytes,
            skipped: archive.skipped,
        })
    }

    /// Prepares a batch of chapters from one series.
    ///
    /// `selected` holds chapter links in any form (absolute or canonical);
    /// they're matched against the detail page's canonical links. An empty
    /// selection is rejected before any network activity.
    #[instrument(skip(self, selected), fields(selected = selected.len()))]
    pub async fn build_batch_archive(&self, content_url: &str, selected: &HashSet<String>) -> Result<BatchJob> {
        if selected.is_empty() {
            exn::bail!(ErrorKind::EmptySelection);
        }
        let wanted: HashSet<String> = selected.iter().map(|link| self.site().canonical(link)).collect();
        let detail = self.fetch_detail(content_url, false).await?;
        let chapters: Vec<_> = detail.chapters.into_iter().filter(|chapter| wanted.contains(&chapter.link)).collect();
        if chapters.is_empty() {
            tracing::warn!(title = %detail.title, "None of the selected chapters belong to this series");
            exn::bail!(ErrorKind::EmptySelection);
        }
        Ok(BatchJob::new(self.clone(), detail.title, chapters))
    }

    /// Drops cached listings, details and chapter pages.
    #[instrument(skip(self))]
    pub fn invalidate_cache(&self) {
        let dropped = self.inner.listings.invalidate_all(&REFRESHED_OPERATIONS)
            + self.inner.details.invalidate_all(&REFRESHED_OPERATIONS)
            + self.inner.chapters.invalidate_all(&REFRESHED_OPERATIONS);
        tracing::info!(dropped, "Cache invalidated");
    }

    pub(crate) async fn chapter_archive(&self, images: &[String], cancel: &CancellationToken) -> Result<Archive> {
        ArchiveBuilder::new(self.inner.fetcher.clone())
            .with_concurrency(self.inner.asset_concurrency)
            .build(images, cancel)
            .await
            .map_err(error::archive)
    }

    async fn page(&self, url: &Url) -> Result<Vec<u8>> {
        self.inner.fetcher.fetch(url.as_str()).await.map_err(|err| {
            tracing::warn!(url = %url, error = ?err, "Upstream request failed");
            error::fetch(err, url.as_str())
        })
    }

    fn extractor(&self, body: &[u8]) -> Extractor {
        Extractor::from_html(body, self.site().host())
    }
}

fn found<T>(outcome: Outcome<T>, url: &Url) -> Result<T> {
    match outcome {
        Outcome::Found(value) => Ok(value),
        Outcome::NotFound => exn::bail!(ErrorKind::NotFound(url.to_string())),
    }
}
