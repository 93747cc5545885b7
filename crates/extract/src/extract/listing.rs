use super::{Extractor, child_text, non_empty_attr};
use crate::consts::{self, NOT_AVAILABLE};
use crate::models::{Listing, ListingEntry};
use scraper::{ElementRef, Selector};
use tracing::instrument;

impl Extractor {
    /// Extracts every item block of a listing page (popular, latest, search).
    ///
    /// A page without any item blocks is a valid, empty listing. Items lacking
    /// a title or a link are skipped, since they can't be shown or followed.
    #[instrument(skip(self), fields(entries, skipped))]
    pub fn listing(&self) -> Listing {
        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for (position, item) in self.document.select(&consts::LISTING_ITEM_SELECTOR).enumerate() {
            match self.listing_entry(&item) {
                Some(entry) => entries.push(entry),
                None => {
                    skipped += 1;
                    tracing::debug!(position, "Skipping listing item without a title or link");
                },
            }
        }
        let next_page = self.first(&consts::NEXT_PAGE_SELECTOR).and_then(|el| non_empty_attr(&el, "href")).map(str::to_string);
        tracing::Span::current().record("entries", entries.len()).record("skipped", skipped);
        Listing { entries, next_page }
    }

    fn listing_entry(&self, item: &ElementRef<'_>) -> Option<ListingEntry> {
        let title = child_text(item, &consts::LISTING_TITLE_SELECTOR).filter(|title| !title.is_empty())?;
        let href = item.select(&consts::LISTING_LINK_SELECTOR).next().and_then(|el| non_empty_attr(&el, "href"))?;
        let cover = item
            .select(&consts::LISTING_COVER_SELECTOR)
            .next()
            .and_then(|el| non_empty_attr(&el, "src"))
            .unwrap_or_default()
            .to_string();
        let or_na = |selector: &Selector| child_text(item, selector).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Some(ListingEntry {
            title,
            link: self.normalize(href),
            cover,
            chapter: or_na(&consts::LISTING_CHAPTER_SELECTOR),
            score: or_na(&consts::LISTING_SCORE_SELECTOR),
            updated_at: item
                .select(&consts::LISTING_TIME_SELECTOR)
                .next()
                .and_then(|el| non_empty_attr(&el, "datetime"))
                .map(str::to_string),
            kind: or_na(&consts::LISTING_TYPE_SELECTOR),
            status: or_na(&consts::LISTING_STATUS_SELECTOR),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Extractor, NOT_AVAILABLE};

    const HOST: &str = "komikcast.bz";

    fn item(title: &str, href: &str, extra: &str) -> String {
        format!(
            r#"<div class="list-update_item">
                <a href="{href}">
                    <div class="list-update_item-image"><img src="https://cdn.example/{title}.jpg"></div>
                    <div class="list-update_item-info"><h3 class="title"> {title} </h3>{extra}</div>
                </a>
            </div>"#
        )
    }

    fn page(items: &[String], pagination: &str) -> String {
        format!(r#"<html><body><div class="list-update_items">{}</div>{pagination}</body></html>"#, items.join("\n"))
    }

    #[test]
    fn empty_listing_is_not_an_error() {
        let listing = Extractor::from_html("<html><body><p>Nothing here</p></body></html>", HOST).listing();
        assert!(listing.is_empty());
        assert_eq!(listing.next_page, None);
    }

    #[test]
    fn missing_score_degrades_to_placeholder() {
        let full = item(
            "One Piece",
            "https://komikcast.bz/komik/one-piece/",
            r#"<div class="chapter">Ch.1100</div><div class="numscore">8.70</div>
               <span class="type">Manga</span><span class="status">Ongoing</span>
               <time class="timeago" datetime="2024-05-01T10:20:30+07:00"></time>"#,
        );
        let partial = item("Solo Leveling", "/komik/solo-leveling/", r#"<div class="chapter">Ch.200</div>"#);
        let listing = Extractor::from_html(page(&[full, partial], ""), HOST).listing();

        assert_eq!(listing.entries.len(), 2);
        let first = &listing.entries[0];
        assert_eq!(first.title, "One Piece");
        assert_eq!(first.link, "one-piece");
        assert_eq!(first.cover, "https://cdn.example/One Piece.jpg");
        assert_eq!(first.chapter, "Ch.1100");
        assert_eq!(first.score, "8.70");
        assert_eq!(first.kind, "Manga");
        assert_eq!(first.status, "Ongoing");
        assert_eq!(first.updated_at.as_deref(), Some("2024-05-01T10:20:30+07:00"));

        let second = &listing.entries[1];
        assert_eq!(second.title, "Solo Leveling");
        assert_eq!(second.link, "solo-leveling");
        assert_eq!(second.chapter, "Ch.200");
        assert_eq!(second.score, NOT_AVAILABLE);
        assert_eq!(second.kind, NOT_AVAILABLE);
        assert_eq!(second.status, NOT_AVAILABLE);
        assert_eq!(second.updated_at, None);
    }

    #[test]
    fn items_without_title_or_link_are_skipped() {
        let no_title = r#"<div class="list-update_item"><a href="/komik/ghost/">nothing</a></div>"#.to_string();
        let no_link = r#"<div class="list-update_item"><h3 class="title">Orphan</h3></div>"#.to_string();
        let good = item("Kept", "/komik/kept/", "");
        let listing = Extractor::from_html(page(&[no_title, no_link, good], ""), HOST).listing();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].title, "Kept");
    }

    #[test]
    fn extracts_next_page_link() {
        let pagination = r#"<div class="pagination">
            <a class="page-numbers" href="https://komikcast.bz/daftar-komik/page/1/">1</a>
            <a class="next page-numbers" href="https://komikcast.bz/daftar-komik/page/2/">Next</a>
        </div>"#;
        let listing = Extractor::from_html(page(&[item("A", "/komik/a/", "")], pagination), HOST).listing();
        assert_eq!(listing.next_page.as_deref(), Some("https://komikcast.bz/daftar-komik/page/2/"));
    }

    #[test]
    fn invalid_utf8_does_not_abort_extraction() {
        let mut html = page(&[item("Bytes", "/komik/bytes/", "")], "").into_bytes();
        html.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        let listing = Extractor::from_html(html, HOST).listing();
        assert_eq!(listing.entries.len(), 1);
    }
}
