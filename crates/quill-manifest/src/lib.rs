//! Content discovery and manifest building for Quill.
//!
//! The manifest is the persisted catalogue snapshot of the content tree:
//! per-article metadata sorted newest-first plus the derived facet lists
//! (categories, tags, series). It is rebuilt from scratch on every run and
//! contains no article bodies, so reloading it is cheap.
//!
//! # Layout
//!
//! - [`scanner`]: walks `contents/<category>/<article>/index.md`
//! - [`builder`]: parses discovered articles, sorts, persists
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), quill_manifest::ManifestError> {
//! use std::path::Path;
//!
//! let manifest = quill_manifest::generate(
//!     Path::new("contents"),
//!     Path::new("public/content-manifest.json"),
//! )?;
//! println!("{} articles", manifest.articles.len());
//! # Ok(())
//! # }
//! ```

mod builder;
mod scanner;

use serde::{Deserialize, Serialize};

pub use builder::{
    build_manifest, generate, load_manifest, parse_date, scan_articles, write_atomic,
    write_manifest,
};
pub use scanner::{DiscoveredArticle, ENTRY_FILE, discover};

/// Metadata for a single article, as persisted in the manifest.
///
/// Field names on disk are camelCase for compatibility with the consumers
/// of `content-manifest.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMeta {
    /// Identifier: `<category>/<article-key>`, unique catalogue-wide.
    pub slug: String,
    /// First path segment of the slug.
    pub category: String,
    /// Title from frontmatter, or the article directory name.
    pub title: String,
    /// Publication date (ISO-8601); defaults to build time when the
    /// frontmatter has none or an unparseable one.
    pub date: String,
    /// Short excerpt for listings and feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Ordered tag list (may be empty).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Series name, when the article belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Position within the series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_order: Option<i64>,
    /// First image reference found in the raw body (pre-rewrite).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_image: Option<String>,
}

impl ArticleMeta {
    /// Series sort position: explicit order, or 0 when the article is in a
    /// series without one.
    #[must_use]
    pub fn series_position(&self) -> i64 {
        self.series_order.unwrap_or(0)
    }
}

/// The persisted catalogue snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Article metadata, sorted by date descending (ties keep scan order).
    pub articles: Vec<ArticleMeta>,
    /// Distinct categories, ascending.
    pub categories: Vec<String>,
    /// Distinct tags across all articles, ascending.
    pub tags: Vec<String>,
    /// Distinct series names, ascending (series-less articles excluded).
    pub series: Vec<String>,
    /// Build timestamp (ISO-8601).
    pub generated_at: String,
}

/// Error type for manifest building and persistence.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// I/O failure reading the content root or writing the snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
