use crate::config::builder::CrawlConfigBuilder;
use crate::config::types::FileConfig;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Only syntax is checked here; values are validated once every layer has
/// been applied, in [`CrawlConfigBuilder::build`].
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use web_context_builder::config::load_config;
///
/// let file = load_config(Path::new("wcb.toml")).unwrap();
/// println!("Max depth: {:?}", file.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Loads a configuration file into a fresh builder
pub fn builder_from_file(path: &Path) -> Result<CrawlConfigBuilder, ConfigError> {
    Ok(CrawlConfigBuilder::new().apply_file(load_config(path)?))
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be matched to the exact settings used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the parsed file and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(FileConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
