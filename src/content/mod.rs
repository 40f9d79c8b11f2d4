//! HTML to markdown content pipeline
//!
//! The crawler treats conversion as a pure function of the page HTML and its
//! URL: it gets back a title, a markdown body and the page's outgoing links.
//! [`MarkdownPipeline`] is the production implementation built on `scraper`
//! and `html2md`.

mod convert;
mod extract;

use crate::state::FailureReason;
use thiserror::Error;
use url::Url;

pub use convert::clean_markdown;
pub use extract::{extract_links, extract_title};

/// Output of converting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub title: String,
    pub markdown: String,

    /// Absolute, normalized links in document order, without duplicates
    pub links: Vec<Url>,
}

/// Errors raised while converting a page
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("no content could be extracted")]
    Empty,
}

impl From<ContentError> for FailureReason {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Empty => FailureReason::EmptyContent,
        }
    }
}

/// Turns raw HTML into a title, markdown and outgoing links
///
/// Implementations must be cheap enough to run inline on a worker task.
pub trait ContentPipeline: Send + Sync {
    fn convert(&self, html: &str, url: &Url) -> Result<Converted, ContentError>;
}

/// Main-content extraction followed by markdown conversion
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownPipeline;

impl MarkdownPipeline {
    pub fn new() -> Self {
        Self
    }
}

impl ContentPipeline for MarkdownPipeline {
    fn convert(&self, html: &str, url: &Url) -> Result<Converted, ContentError> {
        if html.trim().is_empty() {
            return Err(ContentError::Empty);
        }

        let mut document = scraper::Html::parse_document(html);

        // Title and links come from the untouched document so navigation
        // links are still discovered.
        let title = extract_title(&document);
        let links = extract_links(&document, url);

        extract::strip_boilerplate(&mut document);
        let content_html = extract::main_content_html(&document);

        let body = clean_markdown(&html2md::parse_html(&content_html));
        if body.is_empty() {
            return Err(ContentError::Empty);
        }

        let markdown = if body.starts_with('#') {
            body
        } else {
            format!("# {}\n\n{}", title, body)
        };

        Ok(Converted {
            title,
            markdown,
            links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://docs.example.com/guide/intro").unwrap()
    }

    #[test]
    fn test_convert_main_content() {
        let html = r#"<html>
            <head><title>Intro | Docs</title></head>
            <body>
                <nav><a href="/guide/setup">Setup</a><a href="/api">API</a></nav>
                <main>
                    <h1>Introduction</h1>
                    <p>Welcome to the <strong>guide</strong>.</p>
                    <p>See <a href="../reference">the reference</a>.</p>
                </main>
                <footer>Copyright footer text</footer>
            </body>
        </html>"#;

        let converted = MarkdownPipeline::new().convert(html, &page_url()).unwrap();

        assert_eq!(converted.title, "Introduction");
        assert!(converted.markdown.starts_with('#'));
        assert!(converted.markdown.contains("Introduction"));
        assert!(converted.markdown.contains("Welcome to the"));
        assert!(!converted.markdown.contains("Copyright footer text"));
        assert!(!converted.markdown.contains("Setup"));

        let links: Vec<&str> = converted.links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/guide/setup",
                "https://docs.example.com/api",
                "https://docs.example.com/reference",
            ]
        );
    }

    #[test]
    fn test_title_prepended_when_body_has_no_heading() {
        let html = r#"<html><head><title>Plain Page</title></head>
            <body><p>Just a paragraph.</p></body></html>"#;

        let converted = MarkdownPipeline::new().convert(html, &page_url()).unwrap();

        assert_eq!(converted.title, "Plain Page");
        assert!(converted.markdown.starts_with("# Plain Page\n\n"));
        assert!(converted.markdown.contains("Just a paragraph."));
    }

    #[test]
    fn test_scripts_and_styles_removed() {
        let html = r#"<html><body>
            <script>var secret = 1;</script>
            <style>.x { color: red }</style>
            <article><p>Visible text</p></article>
        </body></html>"#;

        let converted = MarkdownPipeline::new().convert(html, &page_url()).unwrap();
        assert!(converted.markdown.contains("Visible text"));
        assert!(!converted.markdown.contains("secret"));
        assert!(!converted.markdown.contains("color"));
    }

    #[test]
    fn test_empty_body_is_content_failure() {
        let html = "<html><head><title>Nothing</title></head><body><nav>menu</nav></body></html>";
        let result = MarkdownPipeline::new().convert(html, &page_url());
        assert_eq!(result, Err(ContentError::Empty));
    }

    #[test]
    fn test_blank_input_is_content_failure() {
        let result = MarkdownPipeline::new().convert("   \n", &page_url());
        assert_eq!(result, Err(ContentError::Empty));
        assert_eq!(
            FailureReason::from(ContentError::Empty),
            FailureReason::EmptyContent
        );
    }
}
