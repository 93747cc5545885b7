/// An entry of the reader's chapter picker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChapterOption {
    pub title: String,
    /// Canonical link of the chapter
    pub link: String,
    /// Whether this is the chapter currently being read
    pub selected: bool,
}

/// A reader page: one chapter's images plus navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChapterPage {
    pub title: String,
    /// Chapter picker entries in page order; at most one is `selected`
    pub options: Vec<ChapterOption>,
    /// Canonical link of the previous chapter
    pub prev: Option<String>,
    /// Canonical link of the next chapter
    pub next: Option<String>,
    /// Absolute image URLs in reading order
    pub images: Vec<String>,
}
impl ChapterPage {
    /// The chapter picker entry flagged as the current chapter.
    pub fn current(&self) -> Option<&ChapterOption> {
        self.options.iter().find(|option| option.selected)
    }
}
