use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use komik_extract::{CONTENT_NAMESPACE, normalize};
use url::Url;

/// Resolves canonical links and listing pages against the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    base: Url,
    host: String,
}
impl Site {
    pub fn new(mut base: Url) -> Result<Self> {
        let host = base.host_str().ok_or_raise(|| ErrorKind::InvalidUrl(base.to_string()))?.to_string();
        // Joining relative paths onto `https://host/sub` would drop `sub`.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base, host })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The canonical link for an absolute URL or an already-canonical link.
    pub fn canonical(&self, link: &str) -> String {
        normalize(link, &self.host)
    }

    /// Where a series' detail page lives.
    ///
    /// Absolute URLs are used as given; canonical links are resolved below
    /// the content namespace (`komik/`).
    pub fn content_url(&self, link: &str) -> Result<Url> {
        if let Some(url) = absolute(link) {
            return Ok(url);
        }
        let canonical = self.non_empty_canonical(link)?;
        self.join(&format!("{CONTENT_NAMESPACE}{canonical}"))
    }

    /// Where a chapter's reader page lives.
    pub fn chapter_url(&self, link: &str) -> Result<Url> {
        if let Some(url) = absolute(link) {
            return Ok(url);
        }
        let canonical = self.non_empty_canonical(link)?;
        self.join(&canonical)
    }

    /// A listing page: absolute URLs as given, anything else relative to the
    /// site root (so a listing's raw next-page link can be passed straight back).
    pub fn page_url(&self, link: &str) -> Result<Url> {
        match absolute(link) {
            Some(url) => Ok(url),
            None => self.join(link.trim_start_matches('/')),
        }
    }

    pub fn popular_url(&self, page: u32) -> Result<Url> {
        self.join(&format!("daftar-komik/?status=&type=&orderby=popular&page={}", page.max(1)))
    }

    pub fn latest_url(&self, page: u32) -> Result<Url> {
        self.join(&format!("daftar-komik/?orderby=update&page={}", page.max(1)))
    }

    pub fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.query_pairs_mut().clear().append_pair("s", query.trim());
        Ok(url)
    }

    fn non_empty_canonical(&self, link: &str) -> Result<String> {
        let canonical = self.canonical(link);
        if canonical.is_empty() {
            exn::bail!(ErrorKind::NotFound(link.to_string()));
        }
        Ok(canonical)
    }

    fn join(&self, relative: &str) -> Result<Url> {
        self.base.join(relative).or_raise(|| ErrorKind::InvalidUrl(relative.to_string()))
    }
}

fn absolute(link: &str) -> Option<Url> {
    Url::parse(link.trim()).ok().filter(|url| matches!(url.scheme(), "http" | "https"))
}
