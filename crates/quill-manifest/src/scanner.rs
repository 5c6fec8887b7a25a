//! Article discovery by filesystem walking.
//!
//! Discovery is separated from parsing: the scanner only identifies entry
//! files, returning lightweight references for the builder to read. The
//! content tree is exactly two levels deep — category directories at the
//! root, article directories inside them, one `index.md` per article.

use std::fs;
use std::path::{Path, PathBuf};

/// Entry file expected in every article directory.
pub const ENTRY_FILE: &str = "index.md";

/// Reference to an article's source file.
///
/// No content is read at this stage; the builder converts these into
/// [`crate::ArticleMeta`] records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredArticle {
    /// Identifier: `<category>/<article-directory-name>`.
    pub slug: String,
    /// Category (first path segment).
    pub category: String,
    /// Absolute path to the entry file.
    pub path: PathBuf,
}

/// Scan the content root and return article references.
///
/// Category and article directories are visited in lexicographic order so
/// repeated scans of an unchanged tree produce the same sequence. Hidden
/// entries are skipped. An article directory without an entry file is
/// skipped with a warning; a missing or unreadable root yields an empty
/// list, never an error.
#[must_use]
pub fn discover(content_dir: &Path) -> Vec<DiscoveredArticle> {
    let mut articles = Vec::new();

    let categories = match sorted_subdirs(content_dir) {
        Ok(dirs) => dirs,
        Err(e) => {
            tracing::warn!(path = %content_dir.display(), error = %e, "Failed to read content root");
            return articles;
        }
    };

    for (category, category_path) in categories {
        let article_dirs = match sorted_subdirs(&category_path) {
            Ok(dirs) => dirs,
            Err(e) => {
                tracing::warn!(category, error = %e, "Failed to read category directory");
                continue;
            }
        };

        for (dir_name, dir_path) in article_dirs {
            let entry_path = dir_path.join(ENTRY_FILE);
            if !entry_path.is_file() {
                tracing::warn!(
                    article = format!("{category}/{dir_name}"),
                    "No {ENTRY_FILE} found, skipping"
                );
                continue;
            }

            articles.push(DiscoveredArticle {
                slug: format!("{category}/{dir_name}"),
                category: category.clone(),
                path: entry_path,
            });
        }
    }

    articles
}

/// List non-hidden subdirectories of `dir`, sorted by name.
fn sorted_subdirs(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut dirs: Vec<(String, PathBuf)> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_owned();
            if name.starts_with('.') {
                None
            } else {
                Some((name, entry.path()))
            }
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}
