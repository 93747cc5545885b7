//! Layered configuration for komik.
//!
//! Layers, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A config file: either the path given explicitly, or any of
//!    `config.toml`, `config.yaml`, `config.yml` and `config.json` found in
//!    the platform config directory (e.g. `~/.config/komik/`).
//! 3. `KOMIK_`-prefixed environment variables. Nested keys use a double
//!    underscore: `KOMIK_TEMPLATES__BATCH="{{ manga|safe }}"`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_PREFIX: &str = "KOMIK_";
const CONFIG_FILE_NAMES: [&str; 4] = ["config.toml", "config.yaml", "config.yml", "config.json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root every canonical link is resolved against
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,
    /// How long fetched records stay cached, in seconds
    pub cache_ttl_secs: u64,
    /// Image fetches in flight per chapter archive
    pub asset_concurrency: usize,
    /// Chapters processed at once within a batch
    pub chapter_concurrency: usize,
    pub templates: Templates,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://komikcast.bz/".to_string(),
            user_agent: concat!("komik/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            cache_ttl_secs: 300,
            asset_concurrency: 8,
            chapter_concurrency: 2,
            templates: Templates::default(),
        }
    }
}

/// File name templates, without extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    /// Single chapter download; `title` is available
    pub chapter: String,
    /// Batch download; `manga` and `count` are available
    pub batch: String,
    /// Chapter archive inside a batch; `title`, `manga` and `index` are available
    pub entry: String,
}
impl Default for Templates {
    fn default() -> Self {
        Self {
            chapter: "{{ title|safe }}".to_string(),
            batch: "{{ manga|safe }}_batch".to_string(),
            entry: "{{ title|safe }}".to_string(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from every layer.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path)?)
    }

    /// Assembles the layers without extracting them.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                figment = merge_file(figment, path)?;
            },
            None => {
                for path in discovered_files() {
                    tracing::debug!(path = %path.display(), "Using discovered config file");
                    figment = merge_file(figment, &path)?;
                }
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.asset_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("asset_concurrency must be at least 1".to_string()));
        }
        if self.chapter_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("chapter_concurrency must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("request_timeout_secs must be at least 1".to_string()));
        }
        self.base_url()?;
        Ok(())
    }

    /// The parsed site root.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .or_raise(|| ErrorKind::Invalid(format!("base_url is not a URL: {}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            exn::bail!(ErrorKind::Invalid(format!("base_url must be an http(s) URL with a host: {}", self.base_url)));
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

fn discovered_files() -> Vec<PathBuf> {
    let Some(dirs) = ProjectDirs::from("", "", "komik") else {
        return Vec::new();
    };
    CONFIG_FILE_NAMES.iter().map(|name| dirs.config_dir().join(name)).filter(|path| path.is_file()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    /// Defaults plus one file, without the environment layer.
    fn from_file(path: &Path) -> Result<Config> {
        let figment = merge_file(Figment::from(Serialized::defaults(Config::default())), path)?;
        Config::from_figment(figment)
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.base_url().unwrap().host_str(), Some("komikcast.bz"));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let toml = file(
            ".toml",
            r#"
            base_url = "https://mirror.example/"
            asset_concurrency = 4

            [templates]
            batch = "{{ manga|safe }} ({{ count }})"
            "#,
        );
        let config = from_file(toml.path()).unwrap();
        assert_eq!(config.base_url, "https://mirror.example/");
        assert_eq!(config.asset_concurrency, 4);
        assert_eq!(config.chapter_concurrency, 2);
        assert_eq!(config.templates.batch, "{{ manga|safe }} ({{ count }})");
        assert_eq!(config.templates.chapter, Templates::default().chapter);
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let yaml = file(".yml", "cache_ttl_secs: 60\nchapter_concurrency: 1\n");
        let config = from_file(yaml.path()).unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.chapter_concurrency, 1);
    }

    #[rstest]
    #[case("asset_concurrency = 0")]
    #[case("chapter_concurrency = 0")]
    #[case("request_timeout_secs = 0")]
    #[case(r#"base_url = "not a url""#)]
    #[case(r#"base_url = "ftp://komikcast.bz/""#)]
    fn rejects_invalid_values(#[case] contents: &str) {
        let toml = file(".toml", contents);
        let err = from_file(toml.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn wrong_types_fail_to_load() {
        let toml = file(".toml", r#"asset_concurrency = "lots""#);
        let err = from_file(toml.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::figment(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let ini = file(".ini", "asset_concurrency = 3");
        let err = Config::figment(Some(ini.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }
}
