//! Configuration for a crawl
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! command-line flags. The merged result is validated once and frozen into a
//! [`CrawlConfig`].
//!
//! # Example
//!
//! ```no_run
//! use web_context_builder::config::builder_from_file;
//! use std::path::Path;
//!
//! let config = builder_from_file(Path::new("wcb.toml"))
//!     .unwrap()
//!     .max_concurrent(8)
//!     .build()
//!     .unwrap();
//! println!("Crawling {} with depth limit {:?}", config.root_url, config.max_depth);
//! ```

mod builder;
mod parser;
mod types;
mod validation;

pub use builder::{url_to_clean_filename, CrawlConfigBuilder};
pub use types::{
    CrawlConfig, CrawlerSection, FileConfig, OutputSection, ScopeSection, DEFAULT_DELAY,
    DEFAULT_MAX_CONCURRENT, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

pub use parser::{builder_from_file, compute_config_hash, load_config, load_config_with_hash};
