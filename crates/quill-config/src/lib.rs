//! Configuration management for Quill.
//!
//! Parses `quill.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. All fields have
//! defaults, so a missing config file yields a usable configuration for a
//! blog rooted in the current directory.
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! base_url = "https://blog.example.com"
//!
//! [content]
//! source_dir = "contents"
//! output_dir = "public"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Persisted artifact filenames, relative to the output directory.
pub const MANIFEST_FILENAME: &str = "content-manifest.json";
pub const SEARCH_INDEX_FILENAME: &str = "search-index.json";
pub const SITEMAP_FILENAME: &str = "sitemap.xml";
pub const RSS_FILENAME: &str = "rss.xml";

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity, used by the feed generators.
    pub site: SiteConfig,
    /// Content tree and output locations.
    pub content: ContentConfig,
}

/// Site identity configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Site description.
    pub description: String,
    /// Base URL without trailing slash (e.g., `https://blog.example.com`).
    pub base_url: String,
    /// Content language code.
    pub language: String,
    /// Author name.
    pub author: String,
    /// Author email, used in the RSS author element.
    pub email: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quill Blog".to_owned(),
            description: String::new(),
            base_url: "http://localhost:3000".to_owned(),
            language: "en".to_owned(),
            author: String::new(),
            email: String::new(),
        }
    }
}

/// Content tree configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Root directory of the article tree.
    pub source_dir: PathBuf,
    /// Directory where build artifacts are published.
    pub output_dir: PathBuf,
    /// Root path segment for served media (`/<media_root>/<slug>/...`).
    pub media_root: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("contents"),
            output_dir: PathBuf::from("public"),
            media_root: "images".to_owned(),
        }
    }
}

impl Config {
    /// Load configuration, searching `start_dir` and its parents for
    /// `quill.toml`.
    ///
    /// Returns the default configuration when no file is found. Relative
    /// content paths are resolved against the config file's directory (or
    /// `start_dir` when defaulted).
    pub fn load(start_dir: &Path) -> Result<Self, ConfigError> {
        match find_config_file(start_dir) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default_with_base(start_dir)),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let base = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(base);
        Ok(config)
    }

    /// Default configuration with content paths anchored at `base`.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        let mut config = Self::default();
        config.resolve_paths(base);
        config
    }

    /// Anchor relative content paths at `base`.
    fn resolve_paths(&mut self, base: &Path) {
        if self.content.source_dir.is_relative() {
            self.content.source_dir = base.join(&self.content.source_dir);
        }
        if self.content.output_dir.is_relative() {
            self.content.output_dir = base.join(&self.content.output_dir);
        }
    }

    /// Path of the persisted manifest snapshot.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.content.output_dir.join(MANIFEST_FILENAME)
    }

    /// Path of the persisted search index.
    #[must_use]
    pub fn search_index_path(&self) -> PathBuf {
        self.content.output_dir.join(SEARCH_INDEX_FILENAME)
    }

    /// Path of the generated sitemap.
    #[must_use]
    pub fn sitemap_path(&self) -> PathBuf {
        self.content.output_dir.join(SITEMAP_FILENAME)
    }

    /// Path of the generated RSS feed.
    #[must_use]
    pub fn rss_path(&self) -> PathBuf {
        self.content.output_dir.join(RSS_FILENAME)
    }
}

/// Search for the config file in `start_dir` and its parents.
fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = Some(start_dir);
    while let Some(current) = dir {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.content.source_dir, PathBuf::from("contents"));
        assert_eq!(config.content.output_dir, PathBuf::from("public"));
        assert_eq!(config.content.media_root, "images");
        assert_eq!(config.site.language, "en");
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[site]
title = "Frank's Tech Blog"
base_url = "https://blog.example.com"
author = "frank"
email = "frank@example.com"

[content]
source_dir = "articles"
media_root = "media"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.site.title, "Frank's Tech Blog");
        assert_eq!(config.site.base_url, "https://blog.example.com");
        assert_eq!(config.content.source_dir, temp.path().join("articles"));
        // Defaulted section keeps its defaults
        assert_eq!(config.content.output_dir, temp.path().join("public"));
        assert_eq!(config.content.media_root, "media");
    }

    #[test]
    fn test_load_discovers_in_parent() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "[site]\ntitle = \"Parent\"\n",
        )
        .unwrap();
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::load(&nested).unwrap();
        assert_eq!(config.site.title, "Parent");
        assert_eq!(config.content.source_dir, temp.path().join("contents"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.site.title, "Quill Blog");
        assert_eq!(config.content.source_dir, temp.path().join("contents"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[site\ntitle=").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_artifact_paths() {
        let config = Config::default_with_base(Path::new("/srv/blog"));
        assert_eq!(
            config.manifest_path(),
            PathBuf::from("/srv/blog/public/content-manifest.json")
        );
        assert_eq!(
            config.sitemap_path(),
            PathBuf::from("/srv/blog/public/sitemap.xml")
        );
        assert_eq!(
            config.rss_path(),
            PathBuf::from("/srv/blog/public/rss.xml")
        );
        assert_eq!(
            config.search_index_path(),
            PathBuf::from("/srv/blog/public/search-index.json")
        );
    }
}
