//! Per-page markdown files

use crate::output::types::{OutputError, OutputResult};
use crate::storage::PageResult;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use url::Url;

/// Longest slug kept before the hash suffix, in characters
const MAX_SLUG_CHARS: usize = 200;

/// Converts a URL to a file name that is unique per URL
///
/// The slug comes from the URL path (`index` for the site root); the suffix
/// is the first 8 hex digits of the SHA-256 of the full URL, which keeps URLs
/// that differ only in their query string apart.
///
/// # Example
///
/// ```
/// use url::Url;
/// use web_context_builder::output::url_to_filename;
///
/// let name = url_to_filename(&Url::parse("https://example.com/docs/getting-started").unwrap());
/// assert!(name.starts_with("docs_getting-started_"));
/// assert!(name.ends_with(".md"));
/// ```
pub fn url_to_filename(url: &Url) -> String {
    let path = url.path().trim_matches('/');
    let path = if path.is_empty() { "index" } else { path };

    let slug: String = path
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_SLUG_CHARS)
        .collect();

    let digest = Sha256::digest(url.as_str().as_bytes());
    let hash = hex::encode(digest);

    format!("{}_{}.md", slug, &hash[..8])
}

/// Creates `dir` and any missing parents
pub(crate) fn ensure_dir(dir: &Path) -> OutputResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes `contents` to `path`
pub(crate) fn write_file(path: &Path, contents: &str) -> OutputResult<()> {
    std::fs::write(path, contents).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes one page under `pages_dir`, prefixed with its source URL
pub fn write_page(pages_dir: &Path, page: &PageResult) -> OutputResult<PathBuf> {
    let path = pages_dir.join(url_to_filename(&page.url));
    let contents = format!("<!-- Source: {} -->\n\n{}\n", page.url, page.markdown);

    write_file(&path, &contents)?;
    tracing::debug!("Wrote {}", path.display());

    Ok(path)
}

/// Writes every successful page, creating `pages_dir` first
///
/// Failed pages have no content and are skipped.
pub fn write_pages(pages_dir: &Path, pages: &[PageResult]) -> OutputResult<Vec<PathBuf>> {
    ensure_dir(pages_dir)?;

    pages
        .iter()
        .filter(|p| p.is_success())
        .map(|p| write_page(pages_dir, p))
        .collect()
}
