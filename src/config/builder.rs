use crate::config::types::{
    CrawlConfig, FileConfig, DEFAULT_DELAY, DEFAULT_MAX_CONCURRENT, DEFAULT_OUTPUT_DIR,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::config::validation::{validate, validate_seconds};
use crate::url::normalize_url;
use crate::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Layers defaults, an optional config file and explicit settings into a
/// validated [`CrawlConfig`]
///
/// Later calls win, so apply the file first and command-line flags after.
///
/// # Example
///
/// ```
/// use web_context_builder::config::CrawlConfigBuilder;
///
/// let config = CrawlConfigBuilder::new()
///     .root_url("docs.example.com/")
///     .max_depth(Some(2))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.root_url.as_str(), "https://docs.example.com/");
/// assert_eq!(config.merged_filename, "docs.example.com.md");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrawlConfigBuilder {
    root_url: Option<String>,
    output_dir: Option<PathBuf>,
    max_concurrent: Option<usize>,
    max_depth: Option<u32>,
    delay_secs: Option<f64>,
    timeout_secs: Option<f64>,
    retries: Option<u32>,
    cross_subdomain: Option<bool>,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    user_agent: Option<String>,
    merge: Option<bool>,
    merged_filename: Option<String>,
}

impl CrawlConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every value present in a configuration file
    pub fn apply_file(mut self, file: FileConfig) -> Self {
        if file.root_url.is_some() {
            self.root_url = file.root_url;
        }

        let crawler = file.crawler;
        self.max_concurrent = crawler.max_concurrent.or(self.max_concurrent);
        self.max_depth = crawler.max_depth.or(self.max_depth);
        self.delay_secs = crawler.delay.or(self.delay_secs);
        self.timeout_secs = crawler.timeout.or(self.timeout_secs);
        self.retries = crawler.retries.or(self.retries);
        self.user_agent = crawler.user_agent.or(self.user_agent);

        let scope = file.scope;
        self.cross_subdomain = scope.cross_subdomain.or(self.cross_subdomain);
        self.include_patterns.extend(scope.include);
        self.exclude_patterns.extend(scope.exclude);

        let output = file.output;
        self.output_dir = output.directory.or(self.output_dir);
        self.merge = output.merge.or(self.merge);
        self.merged_filename = output.merged_filename.or(self.merged_filename);

        self
    }

    pub fn root_url(mut self, url: impl Into<String>) -> Self {
        self.root_url = Some(url.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = Some(n);
        self
    }

    /// Sets the depth limit; `None` leaves any earlier setting in place
    pub fn max_depth(mut self, depth: Option<u32>) -> Self {
        self.max_depth = depth.or(self.max_depth);
        self
    }

    pub fn delay_secs(mut self, secs: f64) -> Self {
        self.delay_secs = Some(secs);
        self
    }

    pub fn delay(self, delay: Duration) -> Self {
        self.delay_secs(delay.as_secs_f64())
    }

    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        self.timeout_secs(timeout.as_secs_f64())
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn cross_subdomain(mut self, enabled: bool) -> Self {
        self.cross_subdomain = Some(enabled);
        self
    }

    /// Adds include patterns to those already configured
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds exclude patterns to those already configured
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    pub fn merge(mut self, merge: bool) -> Self {
        self.merge = Some(merge);
        self
    }

    pub fn merged_filename(mut self, name: impl Into<String>) -> Self {
        self.merged_filename = Some(name.into());
        self
    }

    /// Resolves and validates the final configuration
    pub fn build(self) -> Result<CrawlConfig, ConfigError> {
        let raw_root = self
            .root_url
            .ok_or_else(|| ConfigError::Validation("a root URL is required".to_string()))?;

        let root_url = resolve_root_url(&raw_root)?;

        let delay = match self.delay_secs {
            Some(secs) => validate_seconds("delay", secs, true)?,
            None => DEFAULT_DELAY,
        };

        let timeout = match self.timeout_secs {
            Some(secs) => validate_seconds("timeout", secs, false)?,
            None => DEFAULT_TIMEOUT,
        };

        let merged_filename = self
            .merged_filename
            .unwrap_or_else(|| url_to_clean_filename(&root_url));

        let config = CrawlConfig {
            root_url,
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            max_concurrent: self.max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT),
            max_depth: self.max_depth,
            delay,
            timeout,
            retries: self.retries.unwrap_or(0),
            cross_subdomain: self.cross_subdomain.unwrap_or(false),
            include_patterns: self.include_patterns,
            exclude_patterns: self.exclude_patterns,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            merge: self.merge.unwrap_or(true),
            merged_filename,
        };

        validate(&config)?;

        Ok(config)
    }
}

/// Parses the root URL, assuming https when no scheme is given
fn resolve_root_url(raw: &str) -> Result<url::Url, ConfigError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    normalize_url(&with_scheme)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", raw, e)))
}

/// Derives the merged document name from the root host
///
/// `https://docs.example.com:8443/api` becomes `docs.example.com.md`.
pub fn url_to_clean_filename(url: &url::Url) -> String {
    let host = url.host_str().unwrap_or("merged");
    let cleaned: String = host
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();

    format!("{}.md", cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{CrawlerSection, OutputSection, ScopeSection};

    #[test]
    fn test_defaults() {
        let config = CrawlConfigBuilder::new()
            .root_url("https://docs.example.com")
            .build()
            .unwrap();

        assert_eq!(config.root_url.as_str(), "https://docs.example.com/");
        assert_eq!(config.max_concurrent, 5);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.delay, Duration::from_millis(100));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retries, 0);
        assert!(!config.cross_subdomain);
        assert!(config.merge);
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.merged_filename, "docs.example.com.md");
    }

    #[test]
    fn test_scheme_added_and_trailing_slash_removed() {
        let config = CrawlConfigBuilder::new()
            .root_url("example.com/docs/")
            .build()
            .unwrap();
        assert_eq!(config.root_url.as_str(), "https://example.com/docs");
    }

    #[test]
    fn test_missing_root_url() {
        let result = CrawlConfigBuilder::new().build();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unparseable_root_url() {
        let result = CrawlConfigBuilder::new().root_url("https://").build();
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_non_http_root_rejected() {
        let result = CrawlConfigBuilder::new()
            .root_url("ftp://example.com/")
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = CrawlConfigBuilder::new()
            .root_url("https://example.com")
            .max_concurrent(0)
            .build();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let result = CrawlConfigBuilder::new()
            .root_url("https://example.com")
            .exclude(["(unclosed"])
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_negative_delay_rejected() {
        let result = CrawlConfigBuilder::new()
            .root_url("https://example.com")
            .delay_secs(-1.0)
            .build();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = CrawlConfigBuilder::new()
            .root_url("https://example.com")
            .timeout_secs(0.0)
            .build();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_delay_allowed() {
        let config = CrawlConfigBuilder::new()
            .root_url("https://example.com")
            .delay_secs(0.0)
            .build()
            .unwrap();
        assert_eq!(config.delay, Duration::ZERO);
    }

    #[test]
    fn test_cli_values_override_file() {
        let file = FileConfig {
            root_url: Some("https://file.example.com".to_string()),
            crawler: CrawlerSection {
                max_concurrent: Some(8),
                max_depth: Some(4),
                delay: Some(1.5),
                ..Default::default()
            },
            scope: ScopeSection {
                cross_subdomain: Some(true),
                include: vec!["/docs/".to_string()],
                exclude: vec![],
            },
            output: OutputSection {
                directory: Some(PathBuf::from("/tmp/from-file")),
                merge: Some(false),
                merged_filename: None,
            },
        };

        let config = CrawlConfigBuilder::new()
            .apply_file(file)
            .max_concurrent(2)
            .max_depth(None)
            .include(["/api/"])
            .build()
            .unwrap();

        assert_eq!(config.root_url.as_str(), "https://file.example.com/");
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.max_depth, Some(4));
        assert_eq!(config.delay, Duration::from_millis(1500));
        assert!(config.cross_subdomain);
        assert_eq!(config.include_patterns, vec!["/docs/", "/api/"]);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/from-file"));
        assert!(!config.merge);
    }

    #[test]
    fn test_clean_filename_strips_port() {
        let url = url::Url::parse("http://127.0.0.1:8080/x").unwrap();
        assert_eq!(url_to_clean_filename(&url), "127.0.0.1.md");
    }

    #[test]
    fn test_merged_filename_with_separator_rejected() {
        let result = CrawlConfigBuilder::new()
            .root_url("https://example.com")
            .merged_filename("../escape.md")
            .build();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
