//! Full per-article record served by the retrieval layer.

use chrono::{SecondsFormat, Utc};
use quill_renderer::{ArticleRenderer, OutlineEntry, reading_time};

/// A fully rendered article: frontmatter metadata plus every derived view
/// of the body.
///
/// Built directly from the source file (not from the manifest), so it is
/// available even before a manifest rebuild picks the article up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Article {
    /// Identifier: `<category>/<article-key>`.
    pub slug: String,
    /// Category (first slug segment).
    pub category: String,
    /// Title from frontmatter, or the article key.
    pub title: String,
    /// Publication date; falls back to render time when absent.
    pub date: String,
    /// Short excerpt, when authored.
    pub excerpt: Option<String>,
    /// Ordered tag list.
    pub tags: Vec<String>,
    /// Series name, when the article belongs to one.
    pub series: Option<String>,
    /// Position within the series.
    pub series_order: Option<i64>,
    /// Plain markdown body (frontmatter stripped).
    pub content: String,
    /// Rendered HTML body.
    pub html: String,
    /// Heading outline (levels 2-3).
    pub outline: Vec<OutlineEntry>,
    /// First image reference in body order, pre-rewrite.
    pub first_image: Option<String>,
    /// Estimated reading time in minutes.
    pub reading_time: u32,
}

impl Article {
    /// Parse and render an article from its raw source text.
    #[must_use]
    pub fn from_source(slug: &str, media_root: &str, text: &str) -> Self {
        let (frontmatter, body) = quill_frontmatter::split(text);
        let rendered = ArticleRenderer::new(slug, media_root).render(body);

        let (category, key) = slug.split_once('/').unwrap_or(("", slug));

        Self {
            slug: slug.to_owned(),
            category: category.to_owned(),
            title: frontmatter.title.unwrap_or_else(|| key.to_owned()),
            date: frontmatter
                .date
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            excerpt: frontmatter.excerpt,
            tags: frontmatter.tags,
            series: frontmatter.series,
            series_order: frontmatter.series_order,
            content: body.to_owned(),
            html: rendered.html,
            outline: rendered.outline,
            first_image: rendered.first_image,
            reading_time: reading_time(body),
        }
    }
}
