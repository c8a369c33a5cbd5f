//! Error type shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Exclusion pattern failed to compile. Aborts before any remote call.
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Manifest file does not exist.
    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    /// Manifest file is not a valid label list.
    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_yaml::Error),

    /// Manifest file could not be read.
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    /// API response body was not the expected shape.
    #[error("unexpected API response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A sync task panicked.
    #[error("sync task panicked: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
