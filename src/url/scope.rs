//! Admission policy for discovered links

use crate::config::CrawlConfig;
use crate::url::domain::{extract_domain, same_site, strip_www};
use crate::url::matcher::PatternSet;
use crate::url::normalize::resolve_link;
use crate::ConfigError;
use url::Url;

/// File extensions that never point at an HTML document
const NON_DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "exe", "dmg", "pkg", "deb",
    "rpm", "msi", "iso", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "bmp", "tif",
    "tiff", "avif", "css", "js", "mjs", "map", "woff", "woff2", "ttf", "eot", "otf", "mp3",
    "mp4", "wav", "avi", "mov", "webm", "ogg", "flac", "mkv", "json", "xml", "csv",
];

/// Decides which discovered links are eligible to be crawled
///
/// The filter is a pure predicate over its configuration: it holds no crawl
/// state and knows nothing about depth.
///
/// With include patterns configured the domain restriction is bypassed and a
/// URL is admitted iff it matches an include pattern and no exclude pattern.
/// Without include patterns the URL must pass the domain policy (same host by
/// default, same registrable domain with `cross_subdomain`) and match no
/// exclude pattern. The domain policy also requires the same explicit port as
/// the root, so `127.0.0.1:9000` is a different site from `127.0.0.1:8000`.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    root_host: String,
    root_port: Option<u16>,
    cross_subdomain: bool,
    include: PatternSet,
    exclude: PatternSet,
}

impl ScopeFilter {
    /// Builds a filter rooted at `root`
    pub fn new(
        root: &Url,
        cross_subdomain: bool,
        include: &[String],
        exclude: &[String],
    ) -> Result<Self, ConfigError> {
        let root_host = extract_domain(root)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("Root URL has no host: {}", root)))?;

        Ok(Self {
            root_host,
            root_port: root.port(),
            cross_subdomain,
            include: PatternSet::new(include)?,
            exclude: PatternSet::new(exclude)?,
        })
    }

    /// Builds the filter described by a crawl configuration
    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        Self::new(
            &config.root_url,
            config.cross_subdomain,
            &config.include_patterns,
            &config.exclude_patterns,
        )
    }

    /// Resolves `candidate` against `source` and decides if it may be crawled
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use web_context_builder::ScopeFilter;
    ///
    /// let root = Url::parse("https://docs.example.com/").unwrap();
    /// let filter = ScopeFilter::new(&root, false, &[], &[]).unwrap();
    ///
    /// assert!(filter.admit("/guide", &root));
    /// assert!(!filter.admit("https://blog.example.com/", &root));
    /// assert!(!filter.admit("/logo.png", &root));
    /// ```
    pub fn admit(&self, candidate: &str, source: &Url) -> bool {
        self.resolve(candidate, source).is_some()
    }

    /// Like [`ScopeFilter::admit`] but returns the normalized URL on success
    pub fn resolve(&self, candidate: &str, source: &Url) -> Option<Url> {
        let url = resolve_link(candidate, source)?;
        self.admit_url(&url).then_some(url)
    }

    /// Decides eligibility of an already normalized absolute URL
    pub fn admit_url(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        if is_non_document(url) {
            return false;
        }

        let candidate = url.as_str();

        if self.exclude.matches(candidate) {
            return false;
        }

        if !self.include.is_empty() {
            return self.include.matches(candidate);
        }

        self.in_domain(url)
    }

    /// Applies the domain/subdomain policy alone
    pub fn in_domain(&self, url: &Url) -> bool {
        let Some(host) = extract_domain(url) else {
            return false;
        };

        // Default ports are normalized away, so http and https links to the
        // same host both compare as `None`
        if url.port() != self.root_port {
            return false;
        }

        if self.cross_subdomain {
            same_site(&host, &self.root_host)
        } else {
            strip_www(&host) == strip_www(&self.root_host)
        }
    }
}

/// Best-effort check for links to images, stylesheets, archives and the like
fn is_non_document(url: &Url) -> bool {
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            NON_DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}
