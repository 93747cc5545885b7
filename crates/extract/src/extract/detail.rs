use super::{Extractor, child_text, non_empty_attr, text};
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{ChapterRef, MangaDetail};
use crate::outcome::Outcome;
use exn::OptionExt;
use scraper::ElementRef;
use tracing::instrument;

const DEFAULT_RATING: &str = "0";

/// Labels recognised in the metadata block, in the order they're checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaLabel {
    Released,
    Author,
    Status,
    TotalChapter,
}
impl MetaLabel {
    const ALL: [MetaLabel; 4] = [MetaLabel::Released, MetaLabel::Author, MetaLabel::Status, MetaLabel::TotalChapter];

    fn prefix(self) -> &'static str {
        match self {
            MetaLabel::Released => "Released:",
            MetaLabel::Author => "Author:",
            MetaLabel::Status => "Status:",
            MetaLabel::TotalChapter => "Total Chapter:",
        }
    }

    /// Splits a metadata line into its label and trimmed value.
    fn parse(line: &str) -> Option<(MetaLabel, &str)> {
        let line = line.trim();
        Self::ALL.into_iter().find_map(|label| line.strip_prefix(label.prefix()).map(|value| (label, value.trim())))
    }
}

impl Extractor {
    /// Extracts a series' metadata and chapter list from its detail page.
    ///
    /// Returns [`Outcome::NotFound`] when the page has no title, which is how
    /// the site renders series that don't exist.
    #[instrument(skip(self), fields(chapters))]
    pub fn detail(&self) -> Outcome<MangaDetail> {
        let title = match self.detail_title() {
            Ok(title) => title,
            Err(err) => {
                tracing::warn!(error = ?err, "Detail page has no title; treating as not found");
                return Outcome::NotFound;
            },
        };

        let mut detail = MangaDetail {
            thumbnail: self.attr_or_empty(&consts::DETAIL_THUMBNAIL_SELECTOR, "src"),
            title,
            native_title: self.text_or_empty(&consts::DETAIL_NATIVE_TITLE_SELECTOR),
            synopsis: self.text_or_empty(&consts::DETAIL_SYNOPSIS_SELECTOR),
            genres: self.document.select(&consts::DETAIL_GENRE_SELECTOR).map(text).collect(),
            release: String::new(),
            author: String::new(),
            status: String::new(),
            kind: self.text_or_empty(&consts::DETAIL_TYPE_SELECTOR),
            total_chapters: String::new(),
            updated_on: self.attr_or_empty(&consts::DETAIL_UPDATED_SELECTOR, "datetime"),
            rating: self.rating(),
            chapters: self.chapter_refs(),
        };
        for line in self.document.select(&consts::DETAIL_META_SELECTOR).map(text) {
            let Some((label, value)) = MetaLabel::parse(&line) else {
                continue;
            };
            let field = match label {
                MetaLabel::Released => &mut detail.release,
                MetaLabel::Author => &mut detail.author,
                MetaLabel::Status => &mut detail.status,
                MetaLabel::TotalChapter => &mut detail.total_chapters,
            };
            *field = value.to_string();
        }
        tracing::Span::current().record("chapters", detail.chapters.len());
        Outcome::Found(detail)
    }

    fn detail_title(&self) -> Result<String> {
        self.first(&consts::DETAIL_TITLE_SELECTOR)
            .map(text)
            .filter(|title| !title.is_empty())
            .ok_or_raise(|| ErrorKind::MissingField("title"))
    }

    fn rating(&self) -> String {
        self.first(&consts::DETAIL_RATING_SELECTOR)
            .and_then(|el| non_empty_attr(&el, "data-ratingkomik"))
            .filter(|rating| consts::RATING_REGEX.is_match(rating))
            .unwrap_or(DEFAULT_RATING)
            .to_string()
    }

    fn chapter_refs(&self) -> Vec<ChapterRef> {
        self.document.select(&consts::DETAIL_CHAPTER_ITEM_SELECTOR).filter_map(|item| self.chapter_ref(&item)).collect()
    }

    fn chapter_ref(&self, item: &ElementRef<'_>) -> Option<ChapterRef> {
        let anchor = item.select(&consts::DETAIL_CHAPTER_LINK_SELECTOR).next()?;
        let href = non_empty_attr(&anchor, "href")?;
        Some(ChapterRef {
            title: text(anchor),
            link: self.normalize(href),
            published: child_text(item, &consts::DETAIL_CHAPTER_TIME_SELECTOR).unwrap_or_default(),
        })
    }
}
