//! RSS feed generation.
//!
//! Emits the most recent 20 manifest articles as RSS 2.0 items. The
//! manifest is already date-descending, so the item list is a direct
//! prefix — no re-sort.

use std::path::Path;

use chrono::Utc;
use rss::{Category, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use quill_config::SiteConfig;
use quill_manifest::{ArticleMeta, Manifest, parse_date, write_atomic};

use crate::{FeedError, article_url, escape_xml};

/// Number of articles included in the feed.
const FEED_ITEM_LIMIT: usize = 20;

/// Build the RSS feed XML for a manifest snapshot.
#[must_use]
pub fn build_rss(site: &SiteConfig, manifest: &Manifest) -> String {
    let items: Vec<Item> = manifest
        .articles
        .iter()
        .take(FEED_ITEM_LIMIT)
        .filter_map(|article| article_to_item(site, article))
        .collect();

    let channel = ChannelBuilder::default()
        .title(site.title.clone())
        .link(site.base_url.clone())
        .description(site.description.clone())
        .language(site.language.clone())
        .last_build_date(Utc::now().to_rfc2822())
        .generator("quill".to_owned())
        .items(items)
        .build();

    channel.to_string()
}

/// Convert a manifest entry to an RSS item.
///
/// Returns `None` when the publication date cannot be parsed (the
/// manifest builder normalizes dates, so this only guards hand-edited
/// snapshots).
fn article_to_item(site: &SiteConfig, article: &ArticleMeta) -> Option<Item> {
    let pub_date = parse_date(&article.date)?.to_rfc2822();
    let link = article_url(&site.base_url, &article.slug);

    let mut categories: Vec<Category> = Vec::new();
    categories.push(category(&article.category));
    for tag in &article.tags {
        categories.push(category(tag));
    }
    if let Some(series) = &article.series {
        categories.push(category(&format!("Series: {series}")));
    }

    let author = if site.email.is_empty() {
        None
    } else {
        Some(format!("{} ({})", site.email, site.author))
    };

    Some(
        ItemBuilder::default()
            .title(article.title.clone())
            .link(link.clone())
            .guid(GuidBuilder::default().permalink(true).value(link).build())
            .pub_date(pub_date)
            .description(article.excerpt.as_deref().map(escape_xml))
            .categories(categories)
            .author(author)
            .build(),
    )
}

fn category(name: &str) -> Category {
    let mut category = Category::default();
    category.set_name(name);
    category
}

/// Build and atomically write the RSS feed.
pub fn generate_rss(
    site: &SiteConfig,
    manifest: &Manifest,
    output_path: &Path,
) -> Result<(), FeedError> {
    let xml = build_rss(site, manifest);
    write_atomic(output_path, xml.as_bytes())?;
    Ok(())
}
