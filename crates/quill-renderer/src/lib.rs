//! Markdown rendering for Quill articles.
//!
//! This crate turns article bodies into HTML with stable, navigable
//! heading anchors and emits two side-channel outputs alongside the HTML:
//! the heading outline (levels 2-3) and the first embedded image
//! reference.
//!
//! # Example
//!
//! ```
//! use quill_renderer::ArticleRenderer;
//!
//! let result = ArticleRenderer::new("cloud/s3-basics", "images")
//!     .render("## Overview\n\n![diagram](./diagram.png)");
//!
//! assert_eq!(result.outline[0].id, "overview");
//! assert_eq!(result.first_image.as_deref(), Some("./diagram.png"));
//! assert!(result.html.contains("/images/cloud/s3-basics/diagram.png"));
//! ```

mod outline;
mod readtime;
mod renderer;
mod state;

pub use outline::extract_outline;
pub use readtime::reading_time;
pub use renderer::{ArticleRenderer, RenderResult, rewrite_image_src};
pub use state::{OutlineEntry, escape_html, slugify};
