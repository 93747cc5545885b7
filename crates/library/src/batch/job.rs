use super::event::BatchEvent;
use crate::Komik;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use komik_archive::{Container, UniqueNames, pack_named};
use komik_extract::models::ChapterRef;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// A prepared batch download, created by
/// [`Komik::build_batch_archive`](crate::Komik::build_batch_archive).
///
/// Nothing is fetched until [`run`](Self::run) is polled.
pub struct BatchJob {
    komik: Komik,
    manga: String,
    chapters: Vec<ChapterRef>,
    state: watch::Sender<JobState>,
}

/// What happened to one chapter.
enum ChapterResult {
    Packed(Vec<u8>),
    /// No images on the reader page
    Empty,
    Failed(crate::error::Error),
}

impl BatchJob {
    pub(crate) fn new(komik: Komik, manga: String, chapters: Vec<ChapterRef>) -> Self {
        let (state, _) = watch::channel(JobState::Pending);
        Self { komik, manga, chapters, state }
    }

    pub fn manga(&self) -> &str {
        &self.manga
    }

    /// Selected chapters, in detail page order.
    pub fn chapters(&self) -> &[ChapterRef] {
        &self.chapters
    }

    /// Watches the job's state; stays readable after the job is consumed.
    pub fn state(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    /// Downloads every selected chapter and packs them into one ZIP.
    ///
    /// Chapters are processed with bounded concurrency, but inner archives
    /// are written in detail page order regardless of which finishes first.
    /// A chapter that fails, or has no images, is logged and left out.
    /// Cancelling `cancel` drops all in-flight work and ends the stream with
    /// an [`Error`](BatchEvent::Error) event.
    pub fn run(self, cancel: CancellationToken) -> impl Stream<Item = BatchEvent> + Send {
        stream! {
            let BatchJob { komik, manga, chapters, state } = self;
            state.send_replace(JobState::Running);
            tracing::info!(manga = %manga, chapters = chapters.len(), "Batch started");

            let total = chapters.len();
            let mut slots: Vec<Option<Vec<u8>>> = vec![None; total];
            let mut skipped = Vec::new();
            let mut completed = 0usize;
            let mut cancelled = false;

            let mut pending = chapters.iter().enumerate().map(|(position, chapter)| {
                let komik = komik.clone();
                let cancel = cancel.clone();
                async move { (position, process_chapter(&komik, chapter, &cancel).await) }
            });
            let mut processing = FuturesUnordered::new();
            processing.extend(pending.by_ref().take(komik.chapter_concurrency()));
            loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        cancelled = true;
                        break;
                    },
                    next = processing.next() => next,
                };
                let Some((position, result)) = next else {
                    break;
                };
                let chapter = &chapters[position];
                match result {
                    ChapterResult::Packed(bytes) => slots[position] = Some(bytes),
                    ChapterResult::Empty => {
                        tracing::warn!(chapter = %chapter.title, "Skipping chapter without images");
                        skipped.push(chapter.title.clone());
                    },
                    ChapterResult::Failed(err) if *err == ErrorKind::Cancelled => {
                        cancelled = true;
                        break;
                    },
                    ChapterResult::Failed(err) => {
                        tracing::warn!(chapter = %chapter.title, error = ?err, "Skipping chapter that failed");
                        skipped.push(chapter.title.clone());
                    },
                }
                completed += 1;
                yield BatchEvent::Progress {
                    percent: completed as f64 / total as f64 * 100.0,
                    chapter: chapter.title.clone(),
                    completed,
                    total,
                };
                // Pop-n-push, but FIFO instead of LIFO.
                if let Some(next) = pending.next() {
                    processing.push(next);
                }
            }
            drop(processing);

            if cancelled {
                tracing::warn!(manga = %manga, completed, total, "Batch cancelled");
                state.send_replace(JobState::Failed);
                yield BatchEvent::Error { message: ErrorKind::Cancelled.to_string() };
                return;
            }

            match assemble(&komik, &manga, &chapters, slots).await {
                Ok((file_name, packed, archive)) => {
                    tracing::info!(manga = %manga, packed, skipped = skipped.len(), "Batch complete");
                    state.send_replace(JobState::Completed);
                    yield BatchEvent::Complete {
                        file_name,
                        mime: Container::Zip.mime(),
                        chapters: packed,
                        skipped,
                        archive,
                    };
                },
                Err(err) => {
                    tracing::warn!(manga = %manga, error = ?err, "Batch failed");
                    state.send_replace(JobState::Failed);
                    yield BatchEvent::Error { message: (*err).to_string() };
                },
            }
        }
    }
}

async fn process_chapter(komik: &Komik, chapter: &ChapterRef, cancel: &CancellationToken) -> ChapterResult {
    let page = match komik.fetch_chapter_page(&chapter.link, false).await {
        Ok(page) => page,
        Err(err) => return ChapterResult::Failed(err),
    };
    if page.images.is_empty() {
        return ChapterResult::Empty;
    }
    match komik.chapter_archive(&page.images, cancel).await {
        Ok(archive) => ChapterResult::Packed(archive.bytes),
        Err(err) => ChapterResult::Failed(err),
    }
}

/// Names the inner archives and packs the outer one, in detail page order.
async fn assemble(
    komik: &Komik,
    manga: &str,
    chapters: &[ChapterRef],
    slots: Vec<Option<Vec<u8>>>,
) -> Result<(String, usize, Vec<u8>)> {
    let mut names = UniqueNames::default();
    let mut files = Vec::new();
    for (chapter, bytes) in chapters.iter().zip(slots) {
        let Some(bytes) = bytes else {
            continue;
        };
        let stem = komik.namer().entry(manga, &chapter.title, files.len() + 1)?;
        files.push((names.next(&stem, Container::Cbz), bytes));
    }
    let packed = files.len();
    let file_name = Container::Zip.file_name(&komik.namer().batch(manga, packed)?);
    let archive = tokio::task::spawn_blocking(move || {
        pack_named(files.iter().map(|(name, bytes)| (name.as_str(), bytes.as_slice())))
    })
    .await
    .or_raise(|| ErrorKind::Archive)?
    .map_err(crate::error::archive)?;
    Ok((file_name, packed, archive))
}
