use crate::config::types::CrawlConfig;
use crate::url::PatternSet;
use crate::ConfigError;
use std::time::Duration;

/// Validates a resolved configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_root_url(&config.root_url)?;
    validate_crawler_settings(config)?;
    validate_patterns(config)?;
    validate_output_settings(config)?;
    Ok(())
}

/// Converts a seconds value to a duration
///
/// Negative, NaN and infinite values are rejected; zero only when `allow_zero`.
pub fn validate_seconds(name: &str, secs: f64, allow_zero: bool) -> Result<Duration, ConfigError> {
    let duration = Duration::try_from_secs_f64(secs).map_err(|_| {
        ConfigError::Validation(format!(
            "{} must be a finite, non-negative number of seconds, got {}",
            name, secs
        ))
    })?;

    if !allow_zero && duration.is_zero() {
        return Err(ConfigError::Validation(format!(
            "{} must be greater than zero",
            name
        )));
    }

    Ok(duration)
}

fn validate_root_url(url: &url::Url) -> Result<(), ConfigError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' must use http or https",
            url
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' has no host",
            url
        )));
    }

    Ok(())
}

fn validate_crawler_settings(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and 100, got {}",
            config.max_concurrent
        )));
    }

    if config.timeout.is_zero() {
        return Err(ConfigError::Validation(
            "timeout must be greater than zero".to_string(),
        ));
    }

    if config.retries > 10 {
        return Err(ConfigError::Validation(format!(
            "retries must be at most 10, got {}",
            config.retries
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Compiles every pattern once so a bad regex fails before the crawl starts
fn validate_patterns(config: &CrawlConfig) -> Result<(), ConfigError> {
    PatternSet::new(&config.include_patterns)?;
    PatternSet::new(&config.exclude_patterns)?;
    Ok(())
}

fn validate_output_settings(config: &CrawlConfig) -> Result<(), ConfigError> {
    let name = config.merged_filename.trim();

    if name.is_empty() {
        return Err(ConfigError::Validation(
            "merged_filename cannot be empty".to_string(),
        ));
    }

    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(ConfigError::Validation(format!(
            "merged_filename must be a plain file name, got '{}'",
            name
        )));
    }

    Ok(())
}
