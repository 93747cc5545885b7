use crate::entry::ArchiveEntry;
use crate::error::{ErrorKind, Result};
use crate::pack::pack;
use exn::ResultExt;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use komik_fetch::FetcherHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

pub const DEFAULT_ASSET_CONCURRENCY: usize = 8;

/// An image that was left out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAsset {
    /// 1-based position in the chapter's image list
    pub index: usize,
    pub url: String,
    pub reason: String,
}

/// A packed chapter archive.
#[derive(Debug, Clone)]
pub struct Archive {
    pub bytes: Vec<u8>,
    /// Entry names, in archive order
    pub entries: Vec<String>,
    pub skipped: Vec<SkippedAsset>,
}

/// Fetches a chapter's images and packs them into a ZIP.
#[derive(Clone)]
pub struct ArchiveBuilder {
    fetcher: FetcherHandle,
    concurrency: usize,
}
impl ArchiveBuilder {
    pub fn new(fetcher: FetcherHandle) -> Self {
        Self { fetcher, concurrency: DEFAULT_ASSET_CONCURRENCY }
    }

    /// Maximum number of image fetches in flight; clamped to at least one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Builds an archive from image URLs in reading order.
    ///
    /// Every image is named by its original position, so a failed image
    /// leaves a gap (`001`, `002`, `004`) rather than shifting later pages.
    /// Cancelling `cancel` stops scheduling fetches, drops those in flight,
    /// and fails with [`ErrorKind::Cancelled`].
    #[instrument(skip(self, images, cancel), fields(images = images.len(), skipped))]
    pub async fn build(&self, images: &[String], cancel: &CancellationToken) -> Result<Archive> {
        let mut slots: Vec<Option<Vec<u8>>> = vec![None; images.len()];
        let mut skipped = Vec::new();

        let mut pending = images.iter().enumerate().map(|(position, url)| {
            let fetcher = self.fetcher.clone();
            async move { (position, fetcher.fetch(url).await) }
        });
        let mut processing = FuturesUnordered::new();
        processing.extend(pending.by_ref().take(self.concurrency));
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(in_flight = processing.len(), "Archive build cancelled");
                    exn::bail!(ErrorKind::Cancelled);
                },
                next = processing.next() => next,
            };
            let Some((position, result)) = next else {
                break;
            };
            match result {
                Ok(bytes) => slots[position] = Some(bytes),
                Err(err) => {
                    let index = position + 1;
                    let reason = (*err).to_string();
                    let err = err.raise(ErrorKind::PartialAsset(index));
                    tracing::warn!(error = ?err, url = %images[position], "Skipping image that failed to download");
                    skipped.push(SkippedAsset { index, url: images[position].clone(), reason });
                },
            }
            // Pop-n-push, keeping input order for what's scheduled next.
            if let Some(fetch) = pending.next() {
                processing.push(fetch);
            }
        }
        tracing::Span::current().record("skipped", skipped.len());

        let entries: Vec<ArchiveEntry> = slots
            .into_iter()
            .zip(images)
            .enumerate()
            .filter_map(|(position, (bytes, url))| Some(ArchiveEntry::new(position + 1, url, bytes?)))
            .collect();
        let names = entries.iter().map(ArchiveEntry::file_name).collect();
        let bytes = tokio::task::spawn_blocking(move || pack(&entries))
            .await
            .or_raise(|| ErrorKind::Write)??;
        Ok(Archive { bytes, entries: names, skipped })
    }
}
