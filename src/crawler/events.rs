//! Progress events emitted by crawl workers

use crate::state::FailureReason;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::Url;

/// Something an observer may want to know about while a crawl runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A URL was admitted to the frontier
    Discovered { url: Url, depth: u32 },

    /// A page was fetched and converted
    Crawled { url: Url, depth: u32 },

    /// A page ended in a failure
    Failed { url: Url, reason: FailureReason },
}

/// Non-blocking event emitter
///
/// Backed by an unbounded channel so emitting never waits on the observer.
/// With no receiver attached, or after it is dropped, events are discarded.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<CrawlEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<CrawlEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops every event
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: CrawlEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

/// Creates a connected sink and receiver
pub fn event_channel() -> (EventSink, UnboundedReceiver<CrawlEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink::new(tx), rx)
}
