//! Error types for favorites-dl
//!
//! This module provides the error taxonomy for the library:
//! - Transport errors (a network fetch failed or returned a non-success status)
//! - Parse errors (a feed page or detail page was malformed beyond recovery)
//! - Filesystem errors (creating a directory or writing a file failed)
//! - Randomness errors (download identifier generation failed)
//!
//! Most of these are item-local: the pipeline logs them and moves on. Only setup-level
//! failures (invalid configuration, an output root that cannot be created, the final
//! report write) reach the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for favorites-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for favorites-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download.worker_count")
        key: Option<String>,
    },

    /// Network fetch failed
    #[error("transport error fetching {url}: {message}")]
    Transport {
        /// The URL that was being fetched
        url: String,
        /// What went wrong
        message: String,
    },

    /// Feed or HTML content was malformed
    #[error("parse error for {url}: {message}")]
    Parse {
        /// The URL the content came from
        url: String,
        /// What went wrong
        message: String,
    },

    /// Creating a directory or writing a file failed
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// The path that was being created or written
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Random identifier generation failed
    #[error("randomness error: {0}")]
    Randomness(String),

    /// Feed item carries no media URL to download
    #[error("feed item {link} has no media URL")]
    MissingMediaUrl {
        /// Link of the feed item
        link: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create a transport error for a URL
    pub fn transport(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Error::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error for a URL
    pub fn parse(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Error::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a filesystem error for a path
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only affects a single feed item or page.
    ///
    /// Item-local errors are logged and skipped by the pipeline; everything else is a
    /// setup-level failure that is returned to the caller.
    pub fn is_item_local(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. }
                | Error::Parse { .. }
                | Error::Filesystem { .. }
                | Error::Randomness(_)
                | Error::MissingMediaUrl { .. }
        )
    }
}
