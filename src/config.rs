//! Configuration types for favorites-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the (percent-encoded) username in the feed URL template
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Download behavior configuration (worker pool sizing)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Number of concurrent download workers (default: 4, minimum: 1)
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Capacity of the item queue between the feed producer and the workers (default: 500)
    ///
    /// Large enough that the producer never blocks for long on a single page's items.
    #[serde(default = "default_item_queue_capacity")]
    pub item_queue_capacity: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            item_queue_capacity: default_item_queue_capacity(),
        }
    }
}

/// When a downloaded large variant is worth keeping
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LargeVariantGate {
    /// Keep only if strictly larger than the regular variant already saved (default)
    #[default]
    LargerThanRegular,
    /// Keep if strictly larger than a fixed number of bytes
    MinimumBytes(u64),
}

impl LargeVariantGate {
    /// Byte count the large variant must strictly exceed, given the regular variant's size
    pub fn threshold(&self, regular_size: u64) -> u64 {
        match self {
            LargeVariantGate::LargerThanRegular => regular_size,
            LargeVariantGate::MinimumBytes(bytes) => *bytes,
        }
    }
}

/// Large-variant upgrade configuration
///
/// When enabled, each worker fetches the item's detail page after saving the regular
/// variant, looks for the download link and saves the linked file as a second variant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LargeVariantConfig {
    /// Whether to attempt the upgrade at all (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Class marking the download anchor on detail pages (default: "dev-page-download")
    #[serde(default = "default_download_class")]
    pub download_class: String,

    /// Size gate for keeping the large variant
    #[serde(default)]
    pub gate: LargeVariantGate,
}

impl Default for LargeVariantConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            download_class: default_download_class(),
            gate: LargeVariantGate::default(),
        }
    }
}

/// HTTP client configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for [`FavoritesFetcher`](crate::FavoritesFetcher)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Feed URL template; `{username}` is replaced with the percent-encoded username
    #[serde(default = "default_feed_url_template")]
    pub feed_url_template: String,

    /// Worker pool settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Large-variant upgrade settings
    #[serde(default)]
    pub large_variant: LargeVariantConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url_template: default_feed_url_template(),
            download: DownloadConfig::default(),
            large_variant: LargeVariantConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Check that every setting is usable, naming the offending key otherwise
    pub fn validate(&self) -> Result<()> {
        if self.download.worker_count == 0 {
            return Err(Error::config(
                "download.worker_count",
                "worker count must be at least 1",
            ));
        }
        if self.download.item_queue_capacity == 0 {
            return Err(Error::config(
                "download.item_queue_capacity",
                "item queue capacity must be at least 1",
            ));
        }
        if !self.feed_url_template.contains(USERNAME_PLACEHOLDER) {
            return Err(Error::config(
                "feed_url_template",
                format!("template must contain {USERNAME_PLACEHOLDER}"),
            ));
        }
        if self.large_variant.enabled && self.large_variant.download_class.trim().is_empty() {
            return Err(Error::config(
                "large_variant.download_class",
                "download class must not be empty when large variants are enabled",
            ));
        }
        Ok(())
    }

    /// Build the first feed page URL for a user
    pub fn seed_url(&self, username: &str) -> String {
        self.feed_url_template
            .replacen(USERNAME_PLACEHOLDER, &urlencoding::encode(username), 1)
    }
}

fn default_feed_url_template() -> String {
    "https://backend.deviantart.com/rss.xml?q=favby%3A{username}&type=deviation".to_string()
}

fn default_worker_count() -> usize {
    4
}

fn default_item_queue_capacity() -> usize {
    500
}

fn default_download_class() -> String {
    "dev-page-download".to_string()
}

fn default_user_agent() -> String {
    format!("favorites-dl/{}", env!("CARGO_PKG_VERSION"))
}
