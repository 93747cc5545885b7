//! Main extraction logic for listing, detail and reader pages.

mod chapter;
mod detail;
mod listing;

use crate::link::normalize;
use scraper::{ElementRef, Html, Selector};

/// A parsed page, ready for one of the extraction variants.
///
/// Holds the site host so every link pulled out of the page can be
/// normalized. The underlying [`Html`] document is not `Send`; build the
/// extractor, pull the record out, and drop it before the next `.await`.
#[derive(Debug)]
pub struct Extractor {
    document: Html,
    host: String,
}
impl Extractor {
    pub fn from_document(document: Html, host: impl Into<String>) -> Self {
        Self { document, host: host.into() }
    }

    /// Parses raw page bytes.
    ///
    /// Accepts raw bytes, instead of requiring HTML to be valid UTF-8. Invalid
    /// byte sequences are replaced with U+FFFD before parsing.
    pub fn from_html(html: impl AsRef<[u8]>, host: impl Into<String>) -> Self {
        let html = String::from_utf8_lossy(html.as_ref());
        Self::from_document(Html::parse_document(&html), host)
    }

    fn normalize(&self, raw: &str) -> String {
        normalize(raw, &self.host)
    }

    fn first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// Trimmed text of the first match, or an empty string.
    fn text_or_empty(&self, selector: &Selector) -> String {
        self.first(selector).map(text).unwrap_or_default()
    }

    /// Attribute of the first match, or an empty string.
    fn attr_or_empty(&self, selector: &Selector, attr: &str) -> String {
        self.first(selector).and_then(|el| el.value().attr(attr)).map(str::to_string).unwrap_or_default()
    }
}

/// Trimmed text content of an element and all of its descendants.
fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first descendant matching `selector`.
fn child_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).next().map(text)
}

/// Non-empty attribute value of an element.
fn non_empty_attr<'a>(element: &ElementRef<'a>, attr: &str) -> Option<&'a str> {
    element.value().attr(attr).map(str::trim).filter(|value| !value.is_empty())
}
