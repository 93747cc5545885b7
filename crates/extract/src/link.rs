//! Canonical link normalization.
//!
//! Links scraped from the site come in many shapes: absolute URLs, root
//! relative paths, paths with the `komik/` content namespace, and the odd
//! doubly-encoded `//` run. [`normalize`] turns all of them into the same
//! host-relative identifier, which is what the cache and the batch
//! selection use as a key.

/// Path segment the site prefixes onto content (series) links.
pub const CONTENT_NAMESPACE: &str = "komik/";

/// Normalizes a raw link into a canonical, host-relative path.
///
/// 1. When `raw` contains `host`, everything up to and including the host and
///    its path separator is dropped; otherwise leading slashes are dropped.
/// 2. Every occurrence of the [`CONTENT_NAMESPACE`] segment is removed.
/// 3. Runs of slashes are collapsed into a single slash.
/// 4. One trailing slash is removed.
///
/// The steps are repeated until the output stops changing, so the function is
/// idempotent for every input. Each step can only remove characters, which
/// guarantees the loop terminates.
///
/// # Examples
///
/// ```rust
/// use komik_extract::normalize;
///
/// let host = "komikcast.bz";
/// assert_eq!(normalize("https://komikcast.bz/komik/one-piece/", host), "one-piece");
/// assert_eq!(normalize("/chapter//one-piece-chapter-1/", host), "chapter/one-piece-chapter-1");
/// assert_eq!(normalize(&normalize("//komik//x//", host), host), normalize("//komik//x//", host));
/// ```
pub fn normalize(raw: &str, host: &str) -> String {
    let mut current = normalize_once(raw, host);
    loop {
        let next = normalize_once(&current, host);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(raw: &str, host: &str) -> String {
    let relative = strip_host(raw, host);
    let mut link = relative.replace(CONTENT_NAMESPACE, "");
    while link.contains("//") {
        link = link.replace("//", "/");
    }
    if link.ends_with('/') {
        link.pop();
    }
    link
}

fn strip_host<'a>(raw: &'a str, host: &str) -> &'a str {
    if !host.is_empty() {
        let separated = format!("{host}/");
        if let Some(position) = raw.rfind(&separated) {
            return &raw[position + separated.len()..];
        }
        if raw.ends_with(host) {
            return "";
        }
    }
    raw.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HOST: &str = "komikcast.bz";

    #[rstest]
    #[case("https://komikcast.bz/komik/one-piece/", "one-piece")]
    #[case("https://komikcast.bz/komik/one-piece", "one-piece")]
    #[case("http://www.komikcast.bz/komik/one-piece/", "one-piece")]
    #[case("/komik/one-piece/", "one-piece")]
    #[case("komik/one-piece", "one-piece")]
    #[case("https://komikcast.bz/chapter/one-piece-chapter-1100-bahasa-indonesia/", "chapter/one-piece-chapter-1100-bahasa-indonesia")]
    #[case("https://komikcast.bz//komik//solo-leveling//", "solo-leveling")]
    #[case("series/komik/inner/komik/tail/", "series/inner/tail")]
    #[case("https://komikcast.bz", "")]
    #[case("", "")]
    #[case("////", "")]
    #[case("/", "")]
    fn normalizes_links(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw, HOST), expected);
    }

    #[rstest]
    #[case("kokomik/mik/")]
    #[case("komik//x")]
    #[case("//komik//x//")]
    #[case("komikcast.bkomik/z/rest")]
    #[case("https://komikcast.bz/a/https://komikcast.bz/b/")]
    #[case("\u{fffd}/\u{1F600}//komik/")]
    fn normalization_is_idempotent_on_awkward_inputs(#[case] raw: &str) {
        let once = normalize(raw, HOST);
        assert_eq!(normalize(&once, HOST), once, "input: {raw:?}");
    }

    #[test]
    fn normalization_is_idempotent_on_generated_inputs() {
        // Small deterministic generator so failures are reproducible.
        const PIECES: [&str; 9] = ["/", "//", "komik/", "k", "o", "mik/", HOST, "a", "-"];
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..2_000 {
            let mut raw = String::new();
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let length = (seed % 12) as usize;
            let mut state = seed;
            for _ in 0..length {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
                raw.push_str(PIECES[(state >> 33) as usize % PIECES.len()]);
            }
            let once = normalize(&raw, HOST);
            assert_eq!(normalize(&once, HOST), once, "input: {raw:?}");
            assert!(!once.contains("//"), "input: {raw:?}");
            assert!(!once.ends_with('/'), "input: {raw:?}");
        }
    }

    #[test]
    fn empty_host_does_not_match_everything() {
        assert_eq!(normalize("/komik/x/", ""), "x");
    }
}
