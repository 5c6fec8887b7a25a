//! Cached article retrieval for Quill.
//!
//! [`Store`] serves the presentation layer from the persisted manifest
//! snapshot plus on-demand article rendering:
//!
//! - The manifest is loaded once and cached until [`Store::invalidate`];
//!   concurrent first loads collapse into a single disk read.
//! - Full article records are rendered on first access and cached by slug;
//!   concurrent first requests for the same slug collapse into a single
//!   render.
//!
//! Both caches are owned by the `Store` instance — there is no
//! module-level global state, so tests and embedders can hold independent
//! stores.
//!
//! Missing inputs (unknown slug, absent manifest file) are normal
//! outcomes: lookups return `None` or an empty list, never an error.

mod article;
mod store;

pub use article::Article;
pub use store::{Adjacent, Store};
