//! Merged markdown document generation
//!
//! All successful pages are concatenated in result order behind a generated
//! table of contents, producing one file that can be handed to a language
//! model as context.

use crate::output::types::OutputResult;
use crate::output::writer::write_file;
use crate::storage::PageResult;
use std::path::Path;
use url::Url;

const SEPARATOR: &str = "\n\n---\n\n";

/// Builds the HTML anchor id used to link a page from the table of contents
pub fn anchor_for(url: &Url) -> String {
    url.as_str()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Formats the merged document for the successful pages in `pages`
pub fn format_merged(pages: &[PageResult]) -> String {
    let pages: Vec<&PageResult> = pages.iter().filter(|p| p.is_success()).collect();

    let mut md = String::new();

    md.push_str("# Merged Documentation\n\n");
    md.push_str(&format!("**Total Pages:** {}\n\n", pages.len()));

    md.push_str("## Table of Contents\n\n");
    for (i, page) in pages.iter().enumerate() {
        md.push_str(&format!(
            "{}. [{}](#{})\n",
            i + 1,
            page.display_title(),
            anchor_for(&page.url)
        ));
    }

    for page in &pages {
        md.push_str(SEPARATOR);
        md.push_str(&format!("<a id=\"{}\"></a>\n\n", anchor_for(&page.url)));
        md.push_str(&format!("## {}\n\n", page.display_title()));
        md.push_str(&format!("Source: {}\n\n", page.url));
        md.push_str(page.markdown.trim());
    }

    md.push('\n');
    md
}

/// Writes the merged document to `path`
pub fn write_merged(path: &Path, pages: &[PageResult]) -> OutputResult<()> {
    write_file(path, &format_merged(pages))?;
    tracing::info!("Merged document written to {}", path.display());
    Ok(())
}
