//! Sitemap and RSS feed generation for Quill.
//!
//! Both generators are pure functions of the manifest snapshot and the
//! site configuration — they never read article bodies. Output files are
//! written atomically so a failed generation cannot corrupt a previously
//! published feed.

mod rss_feed;
mod sitemap;

pub use rss_feed::{build_rss, generate_rss};
pub use sitemap::{build_sitemap, generate_sitemap};

/// Error type for feed generation.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// I/O failure writing a feed file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// URL of an article page under the site base URL.
pub(crate) fn article_url(base_url: &str, slug: &str) -> String {
    format!("{base_url}/article/{slug}")
}

/// Date portion (`YYYY-MM-DD`) of an ISO-8601 timestamp.
pub(crate) fn date_part(date: &str) -> &str {
    date.split('T').next().unwrap_or(date)
}

/// Escape special XML characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
