use crate::state::{FailureReason, PageStatus};
use chrono::{DateTime, Utc};
use url::Url;

/// Recorded outcome of fetching and converting one URL
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Normalized URL the result is keyed by (the final URL after redirects)
    pub url: Url,

    /// Depth at which the URL was first admitted
    pub depth: u32,

    /// Discovery position of the requested URL; results are merged in this order
    pub seq: u64,

    /// Page title; empty for failed pages
    pub title: String,

    /// Extracted markdown; empty for failed pages
    pub markdown: String,

    /// Links found on the page, in document order
    pub discovered_links: Vec<Url>,

    pub status: PageStatus,

    pub fetched_at: DateTime<Utc>,
}

impl PageResult {
    /// Creates a successful result
    pub fn success(
        url: Url,
        depth: u32,
        title: String,
        markdown: String,
        discovered_links: Vec<Url>,
    ) -> Self {
        Self {
            url,
            depth,
            seq: 0,
            title,
            markdown,
            discovered_links,
            status: PageStatus::Success,
            fetched_at: Utc::now(),
        }
    }

    /// Creates a failed result; failures carry no content and no links
    pub fn failed(url: Url, depth: u32, reason: FailureReason) -> Self {
        Self {
            url,
            depth,
            seq: 0,
            title: String::new(),
            markdown: String::new(),
            discovered_links: Vec::new(),
            status: PageStatus::Failed(reason),
            fetched_at: Utc::now(),
        }
    }

    /// Sets the discovery position
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Title to show in headings and tables of contents
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            self.url.as_str()
        } else {
            self.title.trim()
        }
    }
}
