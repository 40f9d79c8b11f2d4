//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageStatus`: final outcome of one page (success or a typed failure)
//! - `FailureReason`: why a page failed, grouped into a `FailureKind`
//! - `CrawlStats`: lock-free counters shared by all workers

mod crawl_stats;
mod page_state;

// Re-export main types
pub use crawl_stats::{CrawlStats, StatsSnapshot};
pub use page_state::{FailureKind, FailureReason, PageStatus};
