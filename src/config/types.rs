use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default number of concurrent fetches
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default pause each worker takes before a fetch
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_USER_AGENT: &str = "WebContextBuilder/1.0 (LLM Context Scraper)";

pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Resolved crawl configuration
///
/// Built once through [`crate::config::CrawlConfigBuilder`] and never mutated
/// afterwards; the crawl shares it read-only between all workers.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Normalized root URL the crawl starts from
    pub root_url: Url,

    /// Directory receiving per-page files and the merged document
    pub output_dir: PathBuf,

    /// Number of worker tasks, and so the maximum number of in-flight fetches
    pub max_concurrent: usize,

    /// Maximum link depth from the root; `None` means unlimited
    pub max_depth: Option<u32>,

    /// Pause each worker takes before every fetch
    pub delay: Duration,

    /// Upper bound for a single fetch attempt
    pub timeout: Duration,

    /// Extra attempts for transient failures (0 = at most one fetch per URL)
    pub retries: u32,

    /// Admit any subdomain of the root's registrable domain
    pub cross_subdomain: bool,

    /// Regexes a URL must match (bypasses the domain policy when non-empty)
    pub include_patterns: Vec<String>,

    /// Regexes that always reject a URL
    pub exclude_patterns: Vec<String>,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Whether to write the merged document
    pub merge: bool,

    /// File name of the merged document inside `output_dir`
    pub merged_filename: String,
}

impl CrawlConfig {
    /// Directory holding one markdown file per page
    pub fn pages_dir(&self) -> PathBuf {
        self.output_dir.join("pages")
    }

    /// Full path of the merged document
    pub fn merged_path(&self) -> PathBuf {
        self.output_dir.join(&self.merged_filename)
    }
}

/// Configuration file layout
///
/// Every key is optional; values present here override the defaults and are
/// in turn overridden by command-line flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Root URL, used when none is given on the command line
    #[serde(rename = "root-url")]
    pub root_url: Option<String>,

    #[serde(default)]
    pub crawler: CrawlerSection,

    #[serde(default)]
    pub scope: ScopeSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Crawler behavior settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlerSection {
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: Option<usize>,

    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Seconds, fractional allowed
    pub delay: Option<f64>,

    /// Seconds, fractional allowed
    pub timeout: Option<f64>,

    pub retries: Option<u32>,

    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// Link admission settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeSection {
    #[serde(rename = "cross-subdomain")]
    pub cross_subdomain: Option<bool>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Output settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub directory: Option<PathBuf>,

    pub merge: Option<bool>,

    #[serde(rename = "merged-filename")]
    pub merged_filename: Option<String>,
}
