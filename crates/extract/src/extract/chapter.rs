use super::{Extractor, non_empty_attr, text};
use crate::consts;
use crate::models::{ChapterOption, ChapterPage};
use crate::outcome::Outcome;
use scraper::{ElementRef, Selector};
use tracing::instrument;

impl Extractor {
    /// Extracts a reader page: title, chapter picker, sibling links and the
    /// page images in reading order.
    ///
    /// Lazily-loaded images carry their URL in `data-src` instead of `src`;
    /// `src` wins when both are present. Returns [`Outcome::NotFound`] when
    /// the page has no chapter title.
    #[instrument(skip(self), fields(images))]
    pub fn chapter(&self) -> Outcome<ChapterPage> {
        let Some(title) = self.first(&consts::CHAPTER_TITLE_SELECTOR).map(text).filter(|title| !title.is_empty())
        else {
            tracing::warn!("Reader page has no chapter title; treating as not found");
            return Outcome::NotFound;
        };
        let page = ChapterPage {
            title,
            options: self.chapter_options(),
            prev: self.sibling(&consts::CHAPTER_PREV_SELECTOR),
            next: self.sibling(&consts::CHAPTER_NEXT_SELECTOR),
            images: self.images(),
        };
        tracing::Span::current().record("images", page.images.len());
        Outcome::Found(page)
    }

    fn chapter_options(&self) -> Vec<ChapterOption> {
        let mut seen_selected = false;
        self.document
            .select(&consts::CHAPTER_OPTION_SELECTOR)
            .filter_map(|option| {
                let link = non_empty_attr(&option, "value")?;
                // Only the first flagged option counts; broken markup has been
                // seen flagging more than one.
                let selected = option.value().attr("selected").is_some() && !seen_selected;
                seen_selected |= selected;
                Some(ChapterOption {
                    title: text(option),
                    link: self.normalize(link),
                    selected,
                })
            })
            .collect()
    }

    fn sibling(&self, selector: &Selector) -> Option<String> {
        self.first(selector).and_then(|el| non_empty_attr(&el, "href")).map(|href| self.normalize(href))
    }

    fn images(&self) -> Vec<String> {
        self.document.select(&consts::CHAPTER_IMAGE_SELECTOR).filter_map(|img| image_source(&img)).collect()
    }
}

fn image_source(img: &ElementRef<'_>) -> Option<String> {
    let source = non_empty_attr(img, "src").or_else(|| non_empty_attr(img, "data-src"));
    if source.is_none() {
        tracing::debug!(html = %img.html(), "Dropping reader image without a source");
    }
    source.map(str::to_string)
}
