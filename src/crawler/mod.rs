//! Crawler module for concurrent page fetching and link following
//!
//! This module contains the crawl engine:
//! - The frontier with its visited set and exhaustion detection
//! - The fetcher abstraction and its HTTP implementation
//! - Progress events for observers
//! - The coordinator running the worker pool

mod coordinator;
mod events;
mod fetcher;
mod frontier;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use events::{event_channel, CrawlEvent, EventSink};
pub use fetcher::{
    build_http_client, is_html_content_type, FetchError, FetchedPage, Fetcher, HttpFetcher,
};
pub use frontier::{CrawlTarget, Frontier, InFlightGuard};
