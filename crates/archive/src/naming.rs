use std::collections::HashMap;

const FALLBACK_NAME: &str = "untitled";

/// Strips a title down to a name that's safe on any filesystem.
///
/// Keeps alphanumerics (Unicode included), spaces, hyphens and underscores,
/// then trims surrounding whitespace. A title with nothing left becomes
/// `untitled`.
pub fn safe_file_name(title: &str) -> String {
    let kept: String = title.chars().filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_')).collect();
    match kept.trim() {
        "" => FALLBACK_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// The two download containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// A single chapter's images
    Cbz,
    /// A batch of chapter archives
    Zip,
}
impl Container {
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Cbz => "cbz",
            Container::Zip => "zip",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Container::Cbz => "application/x-cbz",
            Container::Zip => "application/zip",
        }
    }

    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.extension())
    }
}

/// Hands out names that are unique within one archive.
///
/// The first use of a name is returned as-is; repeats get ` (2)`, ` (3)`, ...
/// appended to the stem.
#[derive(Debug, Default)]
pub struct UniqueNames {
    seen: HashMap<String, usize>,
}
impl UniqueNames {
    pub fn next(&mut self, stem: &str, container: Container) -> String {
        let mut count = self.seen.get(stem).copied().unwrap_or_default();
        loop {
            count += 1;
            let candidate = if count == 1 { stem.to_string() } else { format!("{stem} ({count})") };
            // A suffixed candidate may itself collide with a literal title.
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(stem.to_string(), count);
                self.seen.entry(candidate.clone()).or_insert(1);
                return container.file_name(&candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Chapter 12: The Return!", "Chapter 12 The Return")]
    #[case("One Piece / Bahasa Indonesia", "One Piece  Bahasa Indonesia")]
    #[case("solo_leveling-ragnarok", "solo_leveling-ragnarok")]
    #[case("  ../../etc/passwd  ", "etcpasswd")]
    #[case("ワンピース 1100", "ワンピース 1100")]
    #[case("???", "untitled")]
    #[case("", "untitled")]
    fn safe_names(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(safe_file_name(title), expected);
    }

    #[test]
    fn container_metadata() {
        assert_eq!(Container::Cbz.file_name("Ch 1"), "Ch 1.cbz");
        assert_eq!(Container::Cbz.mime(), "application/x-cbz");
        assert_eq!(Container::Zip.file_name("One Piece_batch"), "One Piece_batch.zip");
        assert_eq!(Container::Zip.mime(), "application/zip");
    }

    #[test]
    fn duplicate_names_are_disambiguated() {
        let mut names = UniqueNames::default();
        assert_eq!(names.next("Chapter 1", Container::Cbz), "Chapter 1.cbz");
        assert_eq!(names.next("Chapter 1", Container::Cbz), "Chapter 1 (2).cbz");
        assert_eq!(names.next("Chapter 2", Container::Cbz), "Chapter 2.cbz");
        assert_eq!(names.next("Chapter 1", Container::Cbz), "Chapter 1 (3).cbz");
    }

    #[test]
    fn suffixed_names_do_not_collide_with_literal_titles() {
        let mut names = UniqueNames::default();
        assert_eq!(names.next("A (2)", Container::Cbz), "A (2).cbz");
        assert_eq!(names.next("A", Container::Cbz), "A.cbz");
        assert_eq!(names.next("A", Container::Cbz), "A (3).cbz");
    }
}
