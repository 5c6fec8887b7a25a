//! Pipeline stage commands.
//!
//! Each stage is independent: `build` runs them in sequence and keeps
//! going when an individual stage fails, so one broken stage can never
//! block the others from publishing. Failures are reported at exit.

use quill_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Rebuild the content manifest.
pub(crate) fn run_manifest(config: &Config, output: &Output) -> Result<(), CliError> {
    output.info("Scanning content directory...");
    let manifest =
        quill_manifest::generate(&config.content.source_dir, &config.manifest_path())?;

    output.success(&format!(
        "Manifest generated at {}",
        config.manifest_path().display()
    ));
    output.info(&format!(
        "  articles: {}, categories: {}, tags: {}, series: {}",
        manifest.articles.len(),
        manifest.categories.len(),
        manifest.tags.len(),
        manifest.series.len()
    ));
    Ok(())
}

/// Rebuild the search index.
pub(crate) fn run_search_index(config: &Config, output: &Output) -> Result<(), CliError> {
    output.info("Generating search index...");
    let documents =
        quill_search::generate(&config.content.source_dir, &config.search_index_path())?;

    let size_kb = std::fs::metadata(config.search_index_path())
        .map(|m| m.len() as f64 / 1024.0)
        .unwrap_or_default();
    output.success(&format!(
        "Search index saved to {} ({} documents, {size_kb:.2} KB)",
        config.search_index_path().display(),
        documents.len()
    ));
    Ok(())
}

/// Regenerate sitemap and RSS feed from the persisted manifest.
pub(crate) fn run_feeds(config: &Config, output: &Output) -> Result<(), CliError> {
    let manifest_path = config.manifest_path();
    let manifest = quill_manifest::load_manifest(&manifest_path).map_err(|e| {
        CliError::Stage(format!(
            "cannot load manifest at {} ({e}); run `quill manifest` first",
            manifest_path.display()
        ))
    })?;

    output.info("Generating sitemap...");
    quill_feeds::generate_sitemap(&config.site, &manifest, &config.sitemap_path())?;
    output.success(&format!(
        "Sitemap generated at {} ({} URLs)",
        config.sitemap_path().display(),
        manifest.articles.len() + 2
    ));

    output.info("Generating RSS feed...");
    quill_feeds::generate_rss(&config.site, &manifest, &config.rss_path())?;
    output.success(&format!(
        "RSS feed generated at {} ({} items)",
        config.rss_path().display(),
        manifest.articles.len().min(20)
    ));
    Ok(())
}

/// Run every pipeline stage in sequence.
///
/// A failed stage is reported and the remaining stages still run; the
/// command exits with an error when any stage failed.
pub(crate) fn run_build(config: &Config, output: &Output) -> Result<(), CliError> {
    let stages: [(&str, fn(&Config, &Output) -> Result<(), CliError>); 3] = [
        ("manifest", run_manifest),
        ("search-index", run_search_index),
        ("feeds", run_feeds),
    ];

    let mut failed = Vec::new();
    for (name, stage) in stages {
        if let Err(e) = stage(config, output) {
            output.warning(&format!("Stage {name} failed: {e}"));
            failed.push(name);
        }
    }

    if failed.is_empty() {
        output.success("Build completed");
        Ok(())
    } else {
        Err(CliError::Stage(format!(
            "{} stage(s) failed: {}",
            failed.len(),
            failed.join(", ")
        )))
    }
}
