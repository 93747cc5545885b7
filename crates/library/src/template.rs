//! Download file naming.
//!
//! File names come from user-configured [upon] templates. The template
//! syntax follows upon's Mustache-like conventions (`{{ variable }}`,
//! `{{ value|formatter }}`), extended with:
//!
//! - **`safe`**: strips a string down to alphanumerics, spaces, hyphens and
//!   underscores (see [`komik_archive::safe_file_name`]).
//! - **`truncate`**: truncates strings to a maximum byte length at a
//!   character boundary, usable as either `truncate(value, n)` or
//!   `{{ value|truncate: n }}`.
//!
//! # Template Variables
//!
//! | Template  | Variable | Type     | Description                        |
//! |-----------|----------|----------|------------------------------------|
//! | `chapter` | `title`  | `String` | Chapter title                      |
//! | `batch`   | `manga`  | `String` | Series title                       |
//! | `batch`   | `count`  | `u64`    | Chapters in the batch              |
//! | `entry`   | `manga`  | `String` | Series title                       |
//! | `entry`   | `title`  | `String` | Chapter title                      |
//! | `entry`   | `index`  | `u64`    | 1-based position within the batch  |
//!
//! Rendered names never contain path separators; whatever a template
//! produces is stripped of them, and an empty result becomes `untitled`.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use komik_config::Templates;
use tracing::instrument;
use upon::{Engine, Template};

const FALLBACK_NAME: &str = "untitled";

/// Renders file name stems (no extension) for every kind of download.
///
/// Templates are compiled eagerly so that syntax errors surface at creation
/// time rather than halfway through a batch.
pub struct FileNamer {
    engine: Engine<'static>,
    chapter: Template<'static>,
    batch: Template<'static>,
    entry: Template<'static>,
}
impl FileNamer {
    pub fn new(templates: &Templates) -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let compile = |source: &str| engine.compile(source.to_string()).or_raise(|| ErrorKind::Template);
        let chapter = compile(&templates.chapter)?;
        let batch = compile(&templates.batch)?;
        let entry = compile(&templates.entry)?;
        Ok(Self { engine, chapter, batch, entry })
    }

    /// Single chapter download.
    pub fn chapter(&self, title: &str) -> Result<String> {
        self.render(&self.chapter, upon::value! { title: title })
    }

    /// Batch download of `count` chapters.
    pub fn batch(&self, manga: &str, count: usize) -> Result<String> {
        self.render(&self.batch, upon::value! { manga: manga, count: count as u64 })
    }

    /// Chapter archive inside a batch, `index` being its 1-based position.
    pub fn entry(&self, manga: &str, title: &str, index: usize) -> Result<String> {
        self.render(&self.entry, upon::value! { manga: manga, title: title, index: index as u64 })
    }

    #[instrument(level = "debug", skip_all, fields(name))]
    fn render(&self, template: &Template<'static>, value: upon::Value) -> Result<String> {
        let rendered = template.render(&self.engine, value).to_string().or_raise(|| ErrorKind::Template)?;
        let name = Self::sanitize(&rendered);
        tracing::Span::current().record("name", name.as_str());
        Ok(name)
    }

    /// Drops path separators and control characters, then trims.
    fn sanitize(rendered: &str) -> String {
        let cleaned: String = rendered.chars().filter(|c| !matches!(c, '/' | '\\') && !c.is_control()).collect();
        match cleaned.trim().trim_matches('.') {
            "" => FALLBACK_NAME.to_string(),
            trimmed => trimmed.to_string(),
        }
    }
}

/// Custom [`upon`] extensions for file-name-safe string manipulation.
mod addons {
    use komik_archive::safe_file_name;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Formatter that keeps only characters safe in any file name.
    fn safe_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", safe_file_name(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Truncates a string to a maximum byte length at a character boundary.
    fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
        s[..s.floor_char_boundary(max_bytes)].to_string()
    }

    /// Registers the `safe` formatter and `truncate` function on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("safe", safe_formatter);
        engine.add_function("truncate", truncate_to_char_boundary);
    }
}
