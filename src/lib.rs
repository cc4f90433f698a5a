//! # favorites-dl
//!
//! Downloads every favorited work of a DeviantArt user into a local directory.
//!
//! ## How it works
//!
//! - The user's favorites feed is walked page by page, following each page's `next` link
//! - A pool of workers downloads each item's media into its own random subdirectory
//! - Optionally, each item's detail page is scanned for a larger "download" variant
//! - Everything saved is returned as one [`FetchReport`]
//!
//! Failures of single items are logged and skipped; only setup failures fail the call.
//! Logging goes through [`tracing`], so the caller decides where log output ends up.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use favorites_dl::{Config, FavoritesFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.download.worker_count = 8;
//!     config.large_variant.enabled = true;
//!
//!     let fetcher = FavoritesFetcher::new(config)?;
//!     let report = fetcher.fetch_favorites("denarced", Path::new("favorites")).await?;
//!
//!     for saved in &report.saved_items {
//!         println!("{} -> {}", saved.feed_item.title, saved.stored_path);
//!     }
//!     report.save_json(Path::new("favorites/favorites.json")).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Fetch pipeline: feed producer, download workers and collector
pub mod downloader;
/// Error types
pub mod error;
/// Feed page fetching, parsing and pagination
pub mod feed;
/// Filesystem abstraction used by the workers
pub mod filesystem;
/// Download link extraction from detail pages
pub mod html;
/// HTTP client abstraction
pub mod http;
/// Image dimension probing
pub mod probe;
/// Core data model
pub mod types;
/// Utility functions
pub mod utils;

use std::path::Path;

// Re-export commonly used types
pub use config::{Config, LargeVariantGate};
pub use downloader::FavoritesFetcher;
pub use error::{Error, Result};
pub use filesystem::{Filesystem, OsFilesystem};
pub use http::{HttpClient, HttpClientFactory, ReqwestClientFactory};
pub use types::{Dimensions, FeedItem, FeedPage, FetchReport, SavedItem};

/// Fetch every favorite of `username` into `output_root` with default settings and
/// `worker_count` concurrent downloads.
///
/// # Errors
/// Returns [`Error::Config`] if `worker_count` is zero, or a setup error if the output
/// root can't be created. Failures of single items never fail the call.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> favorites_dl::Result<()> {
/// let report = favorites_dl::fetch_favorites("denarced", std::path::Path::new("out"), 4).await?;
/// println!("saved {} items", report.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_favorites(
    username: &str,
    output_root: &Path,
    worker_count: usize,
) -> Result<FetchReport> {
    let mut config = Config::default();
    config.download.worker_count = worker_count;
    FavoritesFetcher::new(config)?
        .fetch_favorites(username, output_root)
        .await
}
