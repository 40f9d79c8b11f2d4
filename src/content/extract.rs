//! Title, link and main-content extraction over a parsed document

use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

/// Elements dropped before conversion: page chrome, ads, scripts and forms
const REMOVE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    ".sidebar",
    ".navigation",
    ".nav",
    ".menu",
    ".header",
    ".footer",
    ".breadcrumb",
    ".breadcrumbs",
    ".toc",
    ".table-of-contents",
    ".advertisement",
    ".ads",
    ".ad",
    ".social-share",
    ".social-links",
    ".share-buttons",
    ".cookie-banner",
    ".cookie-notice",
    ".popup",
    ".modal",
    "#sidebar",
    "#nav",
    "#navigation",
    "#header",
    "#footer",
    "[role='navigation']",
    "[role='banner']",
    "[role='contentinfo']",
    "[aria-label='breadcrumb']",
    "script",
    "style",
    "noscript",
    "iframe",
    "form",
    "button",
    "input",
    "select",
    "textarea",
];

/// Candidate main-content containers, highest priority first
const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    ".main-content",
    ".content",
    ".post-content",
    ".article-content",
    ".entry-content",
    "#main",
    "#content",
    "#main-content",
    ".markdown-body",
    ".documentation",
    ".docs-content",
];

const UNTITLED: &str = "Untitled";

fn compile(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

fn remove_selectors() -> &'static [Selector] {
    static SELECTORS: OnceLock<Vec<Selector>> = OnceLock::new();
    SELECTORS.get_or_init(|| compile(REMOVE_SELECTORS))
}

fn main_content_selectors() -> &'static [Selector] {
    static SELECTORS: OnceLock<Vec<Selector>> = OnceLock::new();
    SELECTORS.get_or_init(|| compile(MAIN_CONTENT_SELECTORS))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Extracts the page title: first `<h1>`, then `<title>`, then "Untitled"
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use web_context_builder::content::extract_title;
///
/// let doc = Html::parse_document("<title>Fallback</title><h1>  Getting   Started </h1>");
/// assert_eq!(extract_title(&doc), "Getting Started");
/// ```
pub fn extract_title(document: &Html) -> String {
    first_text(document, "h1")
        .or_else(|| first_text(document, "title"))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Extracts every crawlable `<a href>` link in document order
///
/// Links are resolved against `base_url` and normalized. Anchors with a
/// `download` attribute are skipped, as are duplicates after the first.
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = resolve_link(href, base_url) {
            if seen.insert(url.as_str().to_string()) {
                links.push(url);
            }
        }
    }

    links
}

/// Detaches navigation, ads, scripts and other non-content nodes
pub(crate) fn strip_boilerplate(document: &mut Html) {
    let ids: Vec<_> = remove_selectors()
        .iter()
        .flat_map(|selector| document.select(selector).map(|el| el.id()))
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Returns the HTML of the main content region, falling back to `<body>`
pub(crate) fn main_content_html(document: &Html) -> String {
    for selector in main_content_selectors() {
        if let Some(element) = document.select(selector).next() {
            return element.html();
        }
    }

    match Selector::parse("body") {
        Ok(body) => document
            .select(&body)
            .next()
            .map(|el| el.inner_html())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}
