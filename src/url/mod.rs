//! URL handling module for the crawl worker
//!
//! This module provides URL normalization, the visited-set key, link resolution
//! and the same-origin test applied to discovered links.

mod normalize;
mod origin;

pub use normalize::{normalize_url, visit_key};
pub use origin::{is_same_origin, resolve_link};
