use crate::ConfigError;
use regex::Regex;

/// A compiled list of URL patterns
///
/// Patterns are unanchored: a pattern matches when it is found anywhere in
/// the normalized URL string. An empty set matches nothing, so callers decide
/// what "no patterns configured" means.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compiles every pattern, failing on the first invalid one
    ///
    /// # Examples
    ///
    /// ```
    /// use web_context_builder::url::PatternSet;
    ///
    /// let set = PatternSet::new(&["/docs/".to_string(), r"\.html$".to_string()]).unwrap();
    /// assert!(set.matches("https://example.com/docs/intro"));
    /// assert!(set.matches("https://example.com/about.html"));
    /// assert!(!set.matches("https://example.com/blog"));
    /// ```
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns true if no patterns were configured
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if at least one pattern is found in `candidate`
    pub fn matches(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(candidate))
    }
}
