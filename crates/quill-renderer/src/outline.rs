//! Outline recovery from rendered HTML.
//!
//! The renderer emits the outline as a structured side-channel of
//! [`crate::ArticleRenderer::render`]; that is the preferred source.
//! [`extract_outline`] exists for consumers that hold only stored HTML
//! (e.g., a cached page) and need to recover the outline without the
//! original markdown.

use std::sync::LazyLock;

use regex::Regex;

use crate::state::OutlineEntry;

/// Matches level 2-3 headings as emitted by the renderer, with or without
/// the self-referencing anchor wrapper around the heading text.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<h([23]) id="([^"]+)">(?:<a[^>]*>)?([^<]+)(?:</a>)?</h[23]>"#).unwrap()
});

/// Extract the heading outline from rendered HTML.
///
/// Pure function over the rendered output: recovers ids exactly as the
/// renderer emitted them, including counter-suffixed duplicates. Returns an
/// empty list when no eligible headings exist.
#[must_use]
pub fn extract_outline(html: &str) -> Vec<OutlineEntry> {
    HEADING_RE
        .captures_iter(html)
        .map(|caps| OutlineEntry {
            id: caps[2].to_owned(),
            text: caps[3].to_owned(),
            // The character class guarantees a single digit 2 or 3.
            level: caps[1].parse().unwrap_or(2),
        })
        .collect()
}
