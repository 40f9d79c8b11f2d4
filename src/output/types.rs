//! Output error and result types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Files produced for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenOutput {
    /// Per-page markdown files, in result order
    pub pages: Vec<PathBuf>,

    /// The merged document, when one was written
    pub merged: Option<PathBuf>,
}
