//! End-to-end pipeline test: content tree → manifest → retrieval, search
//! index, and feeds.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use quill_config::Config;
use quill_store::Store;

fn write_article(root: &Path, slug: &str, content: &str) {
    let dir = root.join(slug);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("index.md"), content).unwrap();
}

/// The concrete scenario from the pipeline contract: one article with a
/// heading and a relative image, checked across every derived artifact.
#[test]
fn s3_basics_scenario() {
    let temp = tempfile::tempdir().unwrap();
    let config = Config::default_with_base(temp.path());
    let contents = &config.content.source_dir;

    write_article(
        contents,
        "cloud/s3-basics",
        "---\ntitle: S3 Basics\ndate: 2024-01-10\ntags: [aws, storage]\n---\n\n## Overview\n\n![diagram](./diagram.png)\n",
    );

    // Manifest stage
    let manifest =
        quill_manifest::generate(contents, &config.manifest_path()).unwrap();
    assert_eq!(manifest.articles.len(), 1);

    let entry = &manifest.articles[0];
    assert_eq!(entry.slug, "cloud/s3-basics");
    assert_eq!(entry.category, "cloud");
    assert_eq!(entry.title, "S3 Basics");
    assert_eq!(entry.first_image.as_deref(), Some("./diagram.png"));
    assert_eq!(entry.slug, format!("{}/{}", entry.category, "s3-basics"));

    // Retrieval stage
    let store = Store::new(contents, config.manifest_path(), config.content.media_root.as_str());
    let article = store.article("cloud/s3-basics").unwrap();

    assert_eq!(article.outline.len(), 1);
    assert_eq!(article.outline[0].id, "overview");
    assert_eq!(article.outline[0].text, "Overview");
    assert_eq!(article.outline[0].level, 2);
    assert!(
        article
            .html
            .contains(r#"src="/images/cloud/s3-basics/diagram.png""#)
    );

    // Search stage
    let documents =
        quill_search::generate(contents, &config.search_index_path()).unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, "cloud/s3-basics");
    assert!(!documents[0].content.contains("!["));

    // Feed stage
    quill_feeds::generate_sitemap(&config.site, &manifest, &config.sitemap_path()).unwrap();
    quill_feeds::generate_rss(&config.site, &manifest, &config.rss_path()).unwrap();

    let sitemap = fs::read_to_string(config.sitemap_path()).unwrap();
    assert!(sitemap.contains("/article/cloud/s3-basics</loc>"));
    assert!(sitemap.contains("<lastmod>2024-01-10</lastmod>"));

    let rss = fs::read_to_string(config.rss_path()).unwrap();
    assert!(rss.contains("S3 Basics"));
    assert!(rss.contains("<category>aws</category>"));
}

/// Related lookups across categories via shared tags.
#[test]
fn related_articles_across_categories() {
    let temp = tempfile::tempdir().unwrap();
    let config = Config::default_with_base(temp.path());
    let contents = &config.content.source_dir;

    write_article(
        contents,
        "cloud/s3-basics",
        "---\ntitle: S3\ndate: 2024-03-01\ntags: [aws]\n---\nBody\n",
    );
    write_article(
        contents,
        "devops/deploy-aws",
        "---\ntitle: Deploy\ndate: 2024-02-01\ntags: [aws, ci]\n---\nBody\n",
    );
    write_article(
        contents,
        "database/indexes",
        "---\ntitle: Indexes\ndate: 2024-01-01\ntags: [postgres]\n---\nBody\n",
    );

    quill_manifest::generate(contents, &config.manifest_path()).unwrap();
    let store = Store::new(contents, config.manifest_path(), config.content.media_root.as_str());

    // The two aws-tagged articles appear in each other's related lists.
    let from_s3: Vec<_> = store
        .related("cloud/s3-basics", 5)
        .iter()
        .map(|a| a.slug.clone())
        .collect();
    assert_eq!(from_s3, vec!["devops/deploy-aws"]);

    let from_deploy: Vec<_> = store
        .related("devops/deploy-aws", 5)
        .iter()
        .map(|a| a.slug.clone())
        .collect();
    assert_eq!(from_deploy, vec!["cloud/s3-basics"]);

    // An article sharing neither tag nor category is excluded from both.
    assert!(!from_s3.contains(&"database/indexes".to_owned()));
}

/// Rebuilding an unchanged tree yields an identical catalogue.
#[test]
fn rebuild_is_deterministic() {
    let temp = tempfile::tempdir().unwrap();
    let config = Config::default_with_base(temp.path());
    let contents = &config.content.source_dir;

    for (slug, date) in [
        ("cloud/a", "2024-01-10"),
        ("cloud/b", "2024-01-10"),
        ("database/c", "2024-02-01"),
    ] {
        write_article(
            contents,
            slug,
            &format!("---\ntitle: {slug}\ndate: {date}\ntags: [t]\n---\nBody\n"),
        );
    }

    let first = quill_manifest::generate(contents, &config.manifest_path()).unwrap();
    let second = quill_manifest::generate(contents, &config.manifest_path()).unwrap();

    assert_eq!(first.articles, second.articles);
    assert_eq!(first.categories, second.categories);
    assert_eq!(first.tags, second.tags);
    assert_eq!(first.series, second.series);

    // Date-descending with ties in scan order.
    let slugs: Vec<_> = first.articles.iter().map(|a| a.slug.as_str()).collect();
    assert_eq!(slugs, vec!["database/c", "cloud/a", "cloud/b"]);
}
