//! Manifest-backed lookup API with process-local caches.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use quill_manifest::{ArticleMeta, ENTRY_FILE, Manifest};

use crate::article::Article;

/// Neighbouring manifest entries of an article, by catalogue position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Adjacent {
    /// The entry before this one in catalogue order (newer), if any.
    pub prev: Option<ArticleMeta>,
    /// The entry after this one in catalogue order (older), if any.
    pub next: Option<ArticleMeta>,
}

/// Retrieval layer over the manifest snapshot and the article tree.
///
/// # Thread Safety
///
/// Designed for concurrent access without external locking:
/// - The manifest snapshot lives behind `RwLock<Arc<Manifest>>` with an
///   `AtomicBool` validity flag; loading uses double-checked locking so
///   concurrent first loads collapse into one disk read.
/// - Rendered articles are cached per slug; an in-flight map of per-slug
///   locks guarantees at most one render per slug at a time.
pub struct Store {
    /// Root of the article tree (`contents/`).
    content_dir: PathBuf,
    /// Location of the persisted manifest snapshot.
    manifest_path: PathBuf,
    /// Media root segment passed to the renderer.
    media_root: String,
    /// Mutex serializing manifest loads.
    manifest_lock: Mutex<()>,
    /// Current manifest snapshot (atomically swappable).
    manifest: RwLock<Arc<Manifest>>,
    /// Whether the snapshot reflects the manifest file.
    manifest_valid: AtomicBool,
    /// Rendered article cache, keyed by slug.
    articles: RwLock<HashMap<String, Arc<Article>>>,
    /// Per-slug render guards (single-flight).
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Store {
    /// Create a store over a content tree and a manifest snapshot file.
    #[must_use]
    pub fn new(
        content_dir: impl Into<PathBuf>,
        manifest_path: impl Into<PathBuf>,
        media_root: impl Into<String>,
    ) -> Self {
        Self {
            content_dir: content_dir.into(),
            manifest_path: manifest_path.into(),
            media_root: media_root.into(),
            manifest_lock: Mutex::new(()),
            manifest: RwLock::new(Arc::new(Manifest::default())),
            manifest_valid: AtomicBool::new(false),
            articles: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Get the manifest snapshot, loading it on first access.
    ///
    /// Uses double-checked locking: the fast path is a flag check plus an
    /// `Arc` clone. A missing or unreadable manifest file degrades to an
    /// empty snapshot with a logged warning — never an error.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    #[must_use]
    pub fn manifest(&self) -> Arc<Manifest> {
        if self.manifest_valid.load(Ordering::Acquire) {
            return self.manifest.read().unwrap().clone();
        }

        let _guard = self.manifest_lock.lock().unwrap();

        // Double-check after acquiring the lock
        if self.manifest_valid.load(Ordering::Acquire) {
            return self.manifest.read().unwrap().clone();
        }

        let manifest = match quill_manifest::load_manifest(&self.manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(
                    path = %self.manifest_path.display(),
                    error = %e,
                    "Failed to load manifest, serving empty catalogue"
                );
                Manifest::default()
            }
        };

        let manifest = Arc::new(manifest);
        *self.manifest.write().unwrap() = manifest.clone();
        self.manifest_valid.store(true, Ordering::Release);
        manifest
    }

    /// Drop the cached manifest and all cached article renders.
    ///
    /// The next lookup reloads from disk; the next article access
    /// re-renders.
    pub fn invalidate(&self) {
        self.manifest_valid.store(false, Ordering::Release);
        self.articles.write().unwrap().clear();
    }

    /// All articles, in catalogue order (date descending).
    #[must_use]
    pub fn articles(&self) -> Vec<ArticleMeta> {
        self.manifest().articles.clone()
    }

    /// Articles in a category, catalogue order preserved.
    #[must_use]
    pub fn articles_by_category(&self, category: &str) -> Vec<ArticleMeta> {
        self.manifest()
            .articles
            .iter()
            .filter(|a| a.category == category)
            .cloned()
            .collect()
    }

    /// Articles carrying a tag, catalogue order preserved.
    #[must_use]
    pub fn articles_by_tag(&self, tag: &str) -> Vec<ArticleMeta> {
        self.manifest()
            .articles
            .iter()
            .filter(|a| a.tags.iter().any(|t| t == tag))
            .cloned()
            .collect()
    }

    /// Articles in a series, sorted ascending by series order.
    ///
    /// The one lookup whose order deviates from date-descending. Articles
    /// without a series never appear, and missing orders sort as 0.
    #[must_use]
    pub fn articles_by_series(&self, series: &str) -> Vec<ArticleMeta> {
        let mut result: Vec<ArticleMeta> = self
            .manifest()
            .articles
            .iter()
            .filter(|a| a.series.as_deref() == Some(series))
            .cloned()
            .collect();
        result.sort_by_key(ArticleMeta::series_position);
        result
    }

    /// Distinct categories, ascending.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.manifest().categories.clone()
    }

    /// Distinct tags, ascending.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.manifest().tags.clone()
    }

    /// Distinct series names, ascending.
    #[must_use]
    pub fn series(&self) -> Vec<String> {
        self.manifest().series.clone()
    }

    /// Articles related to `slug`: same category or overlapping tags.
    ///
    /// The source article is excluded; catalogue order is preserved; the
    /// result is truncated to `limit`. Unknown slugs yield an empty list.
    #[must_use]
    pub fn related(&self, slug: &str, limit: usize) -> Vec<ArticleMeta> {
        let manifest = self.manifest();
        let Some(current) = manifest.articles.iter().find(|a| a.slug == slug) else {
            return Vec::new();
        };

        manifest
            .articles
            .iter()
            .filter(|a| {
                a.slug != slug
                    && (a.category == current.category
                        || a.tags.iter().any(|t| current.tags.contains(t)))
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Neighbouring entries of `slug` by catalogue position.
    ///
    /// Position-based, not date-based, so equal-dated neighbours resolve
    /// by scan order. Boundaries yield `None` on that side; an unknown
    /// slug yields `None` on both.
    #[must_use]
    pub fn adjacent(&self, slug: &str) -> Adjacent {
        let manifest = self.manifest();
        let Some(index) = manifest.articles.iter().position(|a| a.slug == slug) else {
            return Adjacent::default();
        };

        Adjacent {
            prev: index
                .checked_sub(1)
                .and_then(|i| manifest.articles.get(i).cloned()),
            next: manifest.articles.get(index + 1).cloned(),
        }
    }

    /// Get the full rendered record for an article.
    ///
    /// Rendered on first access from the source file and cached by slug;
    /// concurrent first requests for the same slug collapse into a single
    /// render. Returns `None` when the source file is absent — a normal
    /// outcome the caller should treat as "not found", not a fault.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    #[must_use]
    pub fn article(&self, slug: &str) -> Option<Arc<Article>> {
        if let Some(article) = self.articles.read().unwrap().get(slug) {
            return Some(article.clone());
        }

        // Single-flight: take (or create) the per-slug render guard.
        let flight = {
            let mut in_flight = self.in_flight.lock().unwrap();
            in_flight
                .entry(slug.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = flight.lock().unwrap();

        // A concurrent render may have populated the cache while we waited.
        if let Some(article) = self.articles.read().unwrap().get(slug) {
            return Some(article.clone());
        }

        let result = self.render_article(slug);

        if let Some(ref article) = result {
            self.articles
                .write()
                .unwrap()
                .insert(slug.to_owned(), article.clone());
        }

        self.in_flight.lock().unwrap().remove(slug);
        result
    }

    /// Read and render an article from its source file.
    fn render_article(&self, slug: &str) -> Option<Arc<Article>> {
        let path = self.content_dir.join(slug).join(ENTRY_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(slug, "Article source not found");
                return None;
            }
            Err(e) => {
                tracing::warn!(slug, error = %e, "Failed to read article source");
                return None;
            }
        };

        Some(Arc::new(Article::from_source(
            slug,
            &self.media_root,
            &text,
        )))
    }
}
