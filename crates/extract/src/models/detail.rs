/// A chapter as listed on a series' detail page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChapterRef {
    /// Chapter label, e.g. `"Chapter 1100"`
    pub title: String,
    /// Canonical link; this is the key batch selections are matched against
    pub link: String,
    /// Publication label as printed on the page, e.g. `"2 hari lalu"`
    pub published: String,
}

/// Everything the detail page says about one series.
///
/// Metadata fields the page doesn't provide are left empty rather than
/// failing the extraction; only a missing title makes the page "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MangaDetail {
    pub thumbnail: String,
    pub title: String,
    pub native_title: String,
    pub synopsis: String,
    /// Genre tags in page order
    pub genres: Vec<String>,
    pub release: String,
    pub author: String,
    pub status: String,
    pub kind: String,
    pub total_chapters: String,
    pub updated_on: String,
    /// Numeric rating string, `"0"` when absent
    pub rating: String,
    /// Chapters in source page order
    pub chapters: Vec<ChapterRef>,
}
impl MangaDetail {
    /// Finds a chapter by its canonical link.
    pub fn chapter(&self, link: &str) -> Option<&ChapterRef> {
        self.chapters.iter().find(|chapter| chapter.link == link)
    }
}
