use std::sync::LazyLock;

use regex::Regex;

const FALLBACK_EXTENSION: &str = "jpg";

static EXTENSION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,5}$").unwrap());

/// One image inside a chapter archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// 1-based position in the chapter's image list
    pub index: usize,
    pub extension: String,
    pub bytes: Vec<u8>,
}
impl ArchiveEntry {
    pub fn new(index: usize, url: &str, bytes: Vec<u8>) -> Self {
        Self { index, extension: extension_of(url), bytes }
    }

    /// Zero-padded so lexicographic order is reading order.
    pub fn file_name(&self) -> String {
        format!("{:03}.{}", self.index, self.extension)
    }
}

/// File extension of an image URL's last path segment.
///
/// Query string and fragment are ignored. Anything that doesn't look like a
/// short alphanumeric extension falls back to `jpg`.
pub fn extension_of(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    segment
        .rsplit_once('.')
        .map(|(_, extension)| extension)
        .filter(|extension| EXTENSION_REGEX.is_match(extension))
        .unwrap_or(FALLBACK_EXTENSION)
        .to_ascii_lowercase()
}
