//! Markdown to HTML rendering for Quill articles.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::state::{CodeBlockState, HeadingState, ImageState, OutlineEntry, TableState, escape_html};

/// Languages the client-side highlighter understands.
///
/// Fences declaring one of these render with a `language-<lang>` class;
/// anything else falls back to a plain `<pre><code>` block so an unknown
/// language can never break rendering.
const RECOGNIZED_LANGUAGES: &[&str] = &[
    "bash", "c", "cpp", "csharp", "css", "diff", "docker", "dockerfile", "go", "gradle", "groovy",
    "hcl", "html", "http", "java", "javascript", "json", "jsx", "kotlin", "markdown", "properties",
    "python", "ruby", "rust", "scss", "sh", "shell", "sql", "terraform", "toml", "tsx",
    "typescript", "xml", "yaml", "yml", "zsh",
];

/// Result of rendering an article body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Heading outline (levels 2-3, document order).
    pub outline: Vec<OutlineEntry>,
    /// First image reference in body order, before any path rewriting.
    pub first_image: Option<String>,
}

/// Markdown renderer for a single article.
///
/// Walks the pulldown-cmark event stream and produces HTML with:
/// - stable heading anchors (`<h2 id="..."><a href="#...">...</a></h2>`)
/// - relative image sources rewritten under the article's media path
/// - GFM tables, strikethrough, and task lists
///
/// The renderer is single-use: one article per instance, since heading id
/// deduplication and first-image capture are per-document state.
pub struct ArticleRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    /// Article identifier (`<category>/<key>`), namespaces media paths.
    slug: String,
    /// Root path segment for rewritten media references.
    media_root: String,
    pending_image: Option<(String, String)>,
    first_image: Option<String>,
}

impl ArticleRenderer {
    /// Create a renderer for the article identified by `slug`.
    ///
    /// Relative image references are rewritten to
    /// `/<media_root>/<slug>/<reference>`.
    #[must_use]
    pub fn new(slug: impl Into<String>, media_root: impl Into<String>) -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(),
            slug: slug.into(),
            media_root: media_root.into(),
            pending_image: None,
            first_image: None,
        }
    }

    /// Parser options: GFM superset (tables, strikethrough, task lists).
    #[must_use]
    pub fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM
    }

    /// Render a markdown body and return HTML plus side-channel outputs.
    pub fn render(mut self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, Self::parser_options());
        for event in parser {
            self.process_event(event);
        }

        RenderResult {
            html: self.output,
            outline: self.heading.take_outline(),
            first_image: self.first_image,
        }
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the anchor id is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => {
                self.output.push_str("<blockquote>");
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        info.split_whitespace().next().map(str::to_owned)
                    }
                    _ => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => {
                self.output.push_str("<li>");
            }
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let cell = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{cell}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link { dest_url, .. } => {
                let link_tag = format!(r#"<a href="{}">"#, escape_html(&dest_url));
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                if self.first_image.is_none() {
                    self.first_image = Some(dest_url.to_string());
                }
                // Alt text arrives as inline events; the tag is written in end_tag.
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    write!(
                        self.output,
                        r##"<h{level} id="{id}"><a href="#{id}">{}</a></h{level}>"##,
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => {
                self.output.push_str("</blockquote>");
            }
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                self.code_block(lang.as_deref(), &content);
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => {
                self.output.push_str("</li>");
            }
            TagEnd::Table => {
                self.output.push_str("</tbody></table>");
            }
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => {
                self.output.push_str("</tr>");
            }
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    self.write_image(&src, &alt, &title);
                }
            }
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.heading.is_active() {
            self.heading.push_text(code);
            write!(
                self.heading.html_buffer(),
                "<code>{}</code>",
                escape_html(code)
            )
            .unwrap();
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else {
            self.output.push('\n');
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        self.output.push_str(if checked {
            r#"<input type="checkbox" checked disabled>"#
        } else {
            r#"<input type="checkbox" disabled>"#
        });
    }

    /// Write a fenced code block, with a highlighter class for recognized
    /// languages and a plain block otherwise.
    fn code_block(&mut self, lang: Option<&str>, content: &str) {
        match lang {
            Some(lang) if RECOGNIZED_LANGUAGES.contains(&lang.to_lowercase().as_str()) => {
                write!(
                    self.output,
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape_html(&lang.to_lowercase()),
                    escape_html(content)
                )
                .unwrap();
            }
            _ => {
                write!(self.output, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
            }
        }
    }

    /// Write an image tag with the source rewritten under the media path.
    fn write_image(&mut self, src: &str, alt: &str, title: &str) {
        let src = rewrite_image_src(src, &self.media_root, &self.slug);
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            self.output,
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(&src),
            escape_html(alt)
        )
        .unwrap();
    }
}

/// Rewrite a relative image reference to its served media path.
///
/// References with a network scheme, protocol-relative `//`, `data:` URIs,
/// or a leading `/` are left untouched. Everything else is treated as a
/// file sitting next to the article source and becomes
/// `/<media_root>/<slug>/<reference>`.
#[must_use]
pub fn rewrite_image_src(src: &str, media_root: &str, slug: &str) -> String {
    if src.starts_with("http://")
        || src.starts_with("https://")
        || src.starts_with("//")
        || src.starts_with("data:")
        || src.starts_with('/')
    {
        return src.to_owned();
    }

    let relative = src.strip_prefix("./").unwrap_or(src);
    format!("/{media_root}/{slug}/{relative}")
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(markdown: &str) -> RenderResult {
        ArticleRenderer::new("cloud/s3-basics", "images").render(markdown)
    }

    #[test]
    fn test_basic_paragraph() {
        let result = render("Hello, world!");
        assert_eq!(result.html, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_anchor_wrapped() {
        let result = render("## Overview");
        assert_eq!(
            result.html,
            r##"<h2 id="overview"><a href="#overview">Overview</a></h2>"##
        );
    }

    #[test]
    fn test_outline_levels_2_and_3_only() {
        let result = render("# Title\n\n## Overview\n\n### Details\n\n#### Minutiae");
        assert_eq!(result.outline.len(), 2);
        assert_eq!(result.outline[0].id, "overview");
        assert_eq!(result.outline[0].text, "Overview");
        assert_eq!(result.outline[0].level, 2);
        assert_eq!(result.outline[1].id, "details");
        assert_eq!(result.outline[1].level, 3);
    }

    #[test]
    fn test_duplicate_heading_ids_suffixed() {
        let result = render("## FAQ\n\n## FAQ\n\n## FAQ");
        let ids: Vec<_> = result.outline.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
        assert!(result.html.contains(r##"<h2 id="faq-2">"##));
    }

    #[test]
    fn test_localized_heading_keeps_script() {
        let result = render("## 시작하기");
        assert!(result.html.contains(r##"<h2 id="시작하기">"##));
        assert_eq!(result.outline[0].id, "시작하기");
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## Install `npm`");
        assert!(result.html.contains("<code>npm</code>"));
        assert_eq!(result.outline[0].text, "Install npm");
        assert_eq!(result.outline[0].id, "install-npm");
    }

    #[test]
    fn test_recognized_language_gets_class() {
        let result = render("```rust\nfn main() {}\n```");
        assert!(result.html.contains(r#"class="language-rust""#));
        assert!(result.html.contains("fn main() {}"));
    }

    #[test]
    fn test_unrecognized_language_renders_plain() {
        let result = render("```brainfuck\n+++\n```");
        assert!(result.html.contains("<pre><code>+++"));
        assert!(!result.html.contains("language-"));
    }

    #[test]
    fn test_no_language_renders_plain() {
        let result = render("```\nplain text\n```");
        assert!(result.html.contains("<pre><code>plain text"));
    }

    #[test]
    fn test_relative_image_rewritten() {
        let result = render("![diagram](./diagram.png)");
        assert!(
            result
                .html
                .contains(r#"<img src="/images/cloud/s3-basics/diagram.png" alt="diagram">"#)
        );
    }

    #[test]
    fn test_bare_relative_image_rewritten() {
        let result = render("![shot](screenshot.png)");
        assert!(
            result
                .html
                .contains(r#"src="/images/cloud/s3-basics/screenshot.png""#)
        );
    }

    #[test]
    fn test_network_image_untouched() {
        let result = render("![ext](https://example.com/pic.png)");
        assert!(result.html.contains(r#"src="https://example.com/pic.png""#));
    }

    #[test]
    fn test_absolute_image_untouched() {
        let result = render("![abs](/static/pic.png)");
        assert!(result.html.contains(r#"src="/static/pic.png""#));
    }

    #[test]
    fn test_first_image_is_pre_rewrite_reference() {
        let result = render("intro\n\n![one](./diagram.png)\n\n![two](./other.png)");
        assert_eq!(result.first_image, Some("./diagram.png".to_owned()));
    }

    #[test]
    fn test_first_image_network_reference_counts() {
        let result = render("![one](https://example.com/a.png)\n\n![two](./b.png)");
        assert_eq!(
            result.first_image,
            Some("https://example.com/a.png".to_owned())
        );
    }

    #[test]
    fn test_no_image_yields_none() {
        let result = render("no images here");
        assert_eq!(result.first_image, None);
    }

    #[test]
    fn test_table() {
        let result = render("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(result.html.contains("<table>"));
        assert!(result.html.contains("<thead>"));
        assert!(result.html.contains("<th>"));
        assert!(result.html.contains("<tbody>"));
        assert!(result.html.contains("<td>"));
    }

    #[test]
    fn test_strikethrough() {
        let result = render("~~deleted~~");
        assert!(result.html.contains("<s>deleted</s>"));
    }

    #[test]
    fn test_task_list() {
        let result = render("- [ ] Unchecked\n- [x] Checked");
        assert!(result.html.contains(r#"<input type="checkbox" disabled>"#));
        assert!(
            result
                .html
                .contains(r#"<input type="checkbox" checked disabled>"#)
        );
    }

    #[test]
    fn test_link_href_escaped() {
        let result = render("[docs](https://example.com?a=1&b=2)");
        assert!(
            result
                .html
                .contains(r#"<a href="https://example.com?a=1&amp;b=2">docs</a>"#)
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let markdown = "# Title\n\n## Overview\n\n![d](./diagram.png)\n\n```rust\nfn x() {}\n```";
        let first = render(markdown);
        let second = render(markdown);
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_escaped_outside_code() {
        let result = render("a < b & c");
        assert_eq!(result.html, "<p>a &lt; b &amp; c</p>");
    }
}
