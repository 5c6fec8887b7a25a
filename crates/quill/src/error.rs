//! CLI error types.

use quill_config::ConfigError;
use quill_feeds::FeedError;
use quill_manifest::ManifestError;
use quill_search::SearchIndexError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Manifest(#[from] ManifestError),

    #[error("{0}")]
    SearchIndex(#[from] SearchIndexError),

    #[error("{0}")]
    Feed(#[from] FeedError),

    #[error("{0}")]
    Stage(String),
}
