//! URL handling module
//!
//! This module provides URL normalization, domain extraction, pattern
//! matching, and the scope filter that decides which links get crawled.

mod domain;
mod matcher;
mod normalize;
mod scope;

pub use domain::{extract_domain, registered_domain, same_site, strip_www};
pub use matcher::PatternSet;
pub use normalize::{normalize_url, resolve_link};
pub use scope::ScopeFilter;
