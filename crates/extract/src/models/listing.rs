use super::Age;
use time::OffsetDateTime;

/// One item block of a listing page.
///
/// Optional fields whose node is missing from the markup hold
/// [`NOT_AVAILABLE`](crate::NOT_AVAILABLE) instead of failing the item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListingEntry {
    /// Series title
    pub title: String,
    /// Canonical (normalized, host-relative) link to the detail page
    pub link: String,
    /// Cover image URL, empty when the item has no cover
    pub cover: String,
    /// Latest chapter label, e.g. `"Ch.1100"`
    pub chapter: String,
    /// Score as printed on the page, e.g. `"8.70"`
    pub score: String,
    /// Raw ISO-8601 timestamp of the last update, if the page carries one
    pub updated_at: Option<String>,
    /// Content type, e.g. `"Manga"` or `"Manhwa"`
    pub kind: String,
    /// Publication status, e.g. `"Ongoing"`
    pub status: String,
}
impl ListingEntry {
    /// How long ago the entry was last updated, relative to `now`.
    ///
    /// Returns `None` when the page had no timestamp or it could not be parsed.
    pub fn age(&self, now: OffsetDateTime) -> Option<Age> {
        let updated_at = Age::parse_timestamp(self.updated_at.as_deref()?).ok()?;
        Some(Age::between(updated_at, now))
    }
}

/// A parsed listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Listing {
    /// Entries in source order
    pub entries: Vec<ListingEntry>,
    /// Absolute URL of the next page, when the page has pagination
    pub next_page: Option<String>,
}
impl Listing {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
