//! Output module for writing crawl results to disk
//!
//! This module handles:
//! - One markdown file per successful page under `<output>/pages/`
//! - The merged document with a table of contents
//! - The end-of-crawl statistics report

mod markdown;
pub mod stats;
mod types;
mod writer;

pub use markdown::{anchor_for, format_merged, write_merged};
pub use stats::{format_statistics, print_statistics, StatisticsReport};
pub use types::{OutputError, OutputResult, WrittenOutput};
pub use writer::{url_to_filename, write_page, write_pages};

use crate::config::CrawlConfig;
use crate::storage::PageResult;

/// Writes per-page files and, if enabled, the merged document
///
/// Nothing is written for a crawl without a single successful page.
pub fn write_output(config: &CrawlConfig, pages: &[PageResult]) -> OutputResult<WrittenOutput> {
    if !pages.iter().any(PageResult::is_success) {
        tracing::warn!("No successful pages, skipping output");
        return Ok(WrittenOutput::default());
    }

    writer::ensure_dir(&config.output_dir)?;
    let written_pages = write_pages(&config.pages_dir(), pages)?;
    tracing::info!(
        "Wrote {} pages to {}",
        written_pages.len(),
        config.pages_dir().display()
    );

    let merged = if config.merge {
        let path = config.merged_path();
        write_merged(&path, pages)?;
        Some(path)
    } else {
        None
    };

    Ok(WrittenOutput {
        pages: written_pages,
        merged,
    })
}
