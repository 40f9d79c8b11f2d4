//! Result storage for crawled pages
//!
//! Results live in memory for the lifetime of one crawl and are handed to
//! the output writers once the crawl ends.

mod memory;
mod record;

pub use memory::ResultStore;
pub use record::PageResult;
