//! Manifest building and persistence.
//!
//! The builder turns discovered articles into [`ArticleMeta`] records,
//! sorts them newest-first, derives the facet lists, and persists the
//! snapshot as JSON. Per-article failures (unreadable file, bad encoding)
//! are logged and the article is excluded; they never fail the build.

use std::cmp::Reverse;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rayon::prelude::*;
use regex::Regex;

use quill_frontmatter::Frontmatter;

use crate::scanner::{DiscoveredArticle, discover};
use crate::{ArticleMeta, Manifest, ManifestError};

/// Matches the first markdown image reference in a body.
static FIRST_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").unwrap());

/// Scan the content tree and parse every discovered article.
///
/// Parsing is per-article independent and runs in parallel; the returned
/// order matches discovery order (the date sort happens in
/// [`build_manifest`], after collection, so parallelism never leaks into
/// catalogue ordering).
#[must_use]
pub fn scan_articles(content_dir: &Path) -> Vec<ArticleMeta> {
    let discovered = discover(content_dir);
    let fallback_date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    discovered
        .par_iter()
        .filter_map(|article| read_article_meta(article, &fallback_date))
        .collect()
}

/// Read and parse one article's metadata.
///
/// Returns `None` (with a logged warning) when the entry file cannot be
/// read or decoded.
fn read_article_meta(article: &DiscoveredArticle, fallback_date: &str) -> Option<ArticleMeta> {
    let text = match fs::read_to_string(&article.path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(slug = %article.slug, error = %e, "Failed to read article, excluding");
            return None;
        }
    };

    let (frontmatter, body) = quill_frontmatter::split(&text);
    Some(article_meta(article, &frontmatter, body, fallback_date))
}

/// Assemble an [`ArticleMeta`] from split frontmatter and body.
fn article_meta(
    article: &DiscoveredArticle,
    frontmatter: &Frontmatter,
    body: &str,
    fallback_date: &str,
) -> ArticleMeta {
    let key = article
        .slug
        .rsplit('/')
        .next()
        .unwrap_or(article.slug.as_str());

    let date = match &frontmatter.date {
        Some(date) if parse_date(date).is_some() => date.clone(),
        Some(date) => {
            tracing::warn!(slug = %article.slug, date, "Unparseable date, using build time");
            fallback_date.to_owned()
        }
        None => fallback_date.to_owned(),
    };

    ArticleMeta {
        slug: article.slug.clone(),
        category: article.category.clone(),
        title: frontmatter.title.clone().unwrap_or_else(|| key.to_owned()),
        date,
        excerpt: frontmatter.excerpt.clone(),
        tags: frontmatter.tags.clone(),
        series: frontmatter.series.clone(),
        series_order: frontmatter.series_order,
        first_image: first_image(body),
    }
}

/// Detect the first image reference in a raw markdown body.
///
/// Regex-based so the manifest build never needs a full render.
#[must_use]
pub fn first_image(body: &str) -> Option<String> {
    FIRST_IMAGE_RE
        .captures(body)
        .map(|caps| caps[1].to_owned())
}

/// Build the catalogue snapshot from parsed article metadata.
///
/// Articles are sorted by publication date descending with a stable sort,
/// so equal dates keep their scan order. Facet lists are distinct and
/// sorted ascending; the series list excludes series-less articles.
#[must_use]
pub fn build_manifest(mut articles: Vec<ArticleMeta>) -> Manifest {
    articles.sort_by_cached_key(|a| Reverse(sort_timestamp(&a.date)));

    let categories: std::collections::BTreeSet<String> =
        articles.iter().map(|a| a.category.clone()).collect();
    let tags: std::collections::BTreeSet<String> =
        articles.iter().flat_map(|a| a.tags.iter().cloned()).collect();
    let series: std::collections::BTreeSet<String> =
        articles.iter().filter_map(|a| a.series.clone()).collect();

    Manifest {
        articles,
        categories: categories.into_iter().collect(),
        tags: tags.into_iter().collect(),
        series: series.into_iter().collect(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Parse a publication date, accepting RFC 3339, a naive datetime, or a
/// bare date.
#[must_use]
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// Millisecond sort key for a date string; unparseable dates sort oldest.
fn sort_timestamp(date: &str) -> i64 {
    parse_date(date)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .timestamp_millis()
}

/// Write bytes to a file atomically (temp file + rename).
///
/// A failed write never corrupts a previously published artifact at the
/// same path.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)
}

/// Persist the manifest as pretty-printed JSON.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), ManifestError> {
    let json = serde_json::to_string_pretty(manifest)?;
    write_atomic(path, json.as_bytes())?;
    Ok(())
}

/// Load a previously persisted manifest.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Run the full manifest stage: scan, build, persist.
pub fn generate(content_dir: &Path, output_path: &Path) -> Result<Manifest, ManifestError> {
    let articles = scan_articles(content_dir);
    let manifest = build_manifest(articles);
    write_manifest(&manifest, output_path)?;
    Ok(manifest)
}
