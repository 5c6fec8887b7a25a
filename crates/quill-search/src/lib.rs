//! Search index building for Quill.
//!
//! Produces a flattened, markup-stripped document set for an external
//! full-text search component. The index is built directly from the source
//! tree (not from the manifest) so it carries full body text, truncated to
//! a fixed budget per document.
//!
//! The core's contract ends at producing `search-index.json`; executing
//! queries is the external indexer's job.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use quill_manifest::{DiscoveredArticle, discover, write_atomic};

/// Maximum characters of stripped body text per document.
pub const MAX_CONTENT_CHARS: usize = 5000;

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]+`").unwrap());
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#{1,6}\s+").unwrap());
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_~]").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

/// One searchable document, as persisted in `search-index.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    /// Article identifier (`<category>/<key>`).
    pub id: String,
    /// Title from frontmatter, or the identifier.
    pub title: String,
    /// Excerpt from frontmatter (empty string when absent).
    pub excerpt: String,
    /// Markup-stripped body, truncated to [`MAX_CONTENT_CHARS`].
    pub content: String,
    /// Category (first identifier segment).
    pub category: String,
    /// Tag list.
    pub tags: Vec<String>,
    /// Publication date (ISO-8601; build time when absent).
    pub date: String,
}

/// Error type for search index persistence.
#[derive(Debug, thiserror::Error)]
pub enum SearchIndexError {
    /// I/O failure writing the index.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Index serialization failure.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Build search documents for every article in the content tree.
///
/// Unreadable articles are logged and skipped; a missing tree yields an
/// empty index.
#[must_use]
pub fn build_search_index(content_dir: &Path) -> Vec<SearchDocument> {
    let fallback_date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    discover(content_dir)
        .iter()
        .filter_map(|article| search_document(article, &fallback_date))
        .collect()
}

/// Build one search document from a discovered article.
fn search_document(article: &DiscoveredArticle, fallback_date: &str) -> Option<SearchDocument> {
    let text = match fs::read_to_string(&article.path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(slug = %article.slug, error = %e, "Failed to read article, excluding from index");
            return None;
        }
    };

    let (frontmatter, body) = quill_frontmatter::split(&text);

    Some(SearchDocument {
        id: article.slug.clone(),
        title: frontmatter
            .title
            .unwrap_or_else(|| article.slug.clone()),
        excerpt: frontmatter.excerpt.unwrap_or_default(),
        content: truncate_chars(&strip_markup(body), MAX_CONTENT_CHARS),
        category: article.category.clone(),
        tags: frontmatter.tags,
        date: frontmatter
            .date
            .unwrap_or_else(|| fallback_date.to_owned()),
    })
}

/// Strip markdown syntax down to searchable plain text.
///
/// Removes code fences, inline code, image markup, and heading/emphasis
/// markers; keeps link text; collapses blank-line runs into single spaces.
#[must_use]
pub fn strip_markup(body: &str) -> String {
    let text = CODE_FENCE_RE.replace_all(body, "");
    let text = INLINE_CODE_RE.replace_all(&text, "");
    let text = IMAGE_RE.replace_all(&text, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = HEADING_RE.replace_all(&text, "");
    let text = EMPHASIS_RE.replace_all(&text, "");
    let text = BLANK_RUN_RE.replace_all(&text, " ");
    text.trim().to_owned()
}

/// Truncate to a character budget without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_owned(),
        None => text.to_owned(),
    }
}

/// Persist the index as pretty-printed JSON.
pub fn write_search_index(
    documents: &[SearchDocument],
    path: &Path,
) -> Result<(), SearchIndexError> {
    let json = serde_json::to_string_pretty(documents)?;
    write_atomic(path, json.as_bytes())?;
    Ok(())
}

/// Run the full search index stage: build and persist.
pub fn generate(
    content_dir: &Path,
    output_path: &Path,
) -> Result<Vec<SearchDocument>, SearchIndexError> {
    let documents = build_search_index(content_dir);
    write_search_index(&documents, output_path)?;
    Ok(documents)
}
