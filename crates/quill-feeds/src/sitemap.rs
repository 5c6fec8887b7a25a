//! Sitemap generation.
//!
//! Emits a `sitemap.xml` listing the home page, the series index, and one
//! entry per article, with fixed change-frequency and priority per page
//! type.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://blog.example.com/article/cloud/s3-basics</loc>
//!     <lastmod>2024-01-10</lastmod>
//!     <changefreq>monthly</changefreq>
//!     <priority>0.8</priority>
//!   </url>
//! </urlset>
//! ```

use std::fmt::Write as _;
use std::path::Path;

use chrono::Utc;

use quill_config::SiteConfig;
use quill_manifest::{Manifest, write_atomic};

use crate::{FeedError, article_url, date_part, escape_xml};

/// XML namespace for the sitemap `urlset`.
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Single URL entry in the sitemap.
struct UrlEntry {
    /// Full URL location.
    loc: String,
    /// Last modification date (`YYYY-MM-DD`).
    lastmod: String,
    /// Expected change frequency for this page type.
    changefreq: &'static str,
    /// Crawl priority for this page type.
    priority: &'static str,
}

/// Build the sitemap XML for a manifest snapshot.
#[must_use]
pub fn build_sitemap(site: &SiteConfig, manifest: &Manifest) -> String {
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let mut urls = vec![
        UrlEntry {
            loc: site.base_url.clone(),
            lastmod: today.clone(),
            changefreq: "daily",
            priority: "1.0",
        },
        UrlEntry {
            loc: format!("{}/series", site.base_url),
            lastmod: today,
            changefreq: "weekly",
            priority: "0.9",
        },
    ];

    for article in &manifest.articles {
        urls.push(UrlEntry {
            loc: article_url(&site.base_url, &article.slug),
            lastmod: date_part(&article.date).to_owned(),
            changefreq: "monthly",
            priority: "0.8",
        });
    }

    into_xml(&urls)
}

/// Serialize URL entries as a `urlset` document.
fn into_xml(urls: &[UrlEntry]) -> String {
    let mut xml = String::with_capacity(4096);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    let _ = writeln!(xml, r#"<urlset xmlns="{SITEMAP_NS}">"#);

    for entry in urls {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape_xml(&entry.loc));
        let _ = writeln!(xml, "    <lastmod>{}</lastmod>", entry.lastmod);
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq);
        let _ = writeln!(xml, "    <priority>{}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Build and atomically write the sitemap.
pub fn generate_sitemap(
    site: &SiteConfig,
    manifest: &Manifest,
    output_path: &Path,
) -> Result<(), FeedError> {
    let xml = build_sitemap(site, manifest);
    write_atomic(output_path, xml.as_bytes())?;
    Ok(())
}
