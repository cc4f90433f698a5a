//! Core data model: feed items, saved items and the final fetch report.
//!
//! Field names serialize exactly as the report consumers expect:
//! `{"savedItems": [{"feedItem": {...}, "storedPath": "..."}], "generatedAt": "..."}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Pixel dimensions of a media item. All zeros means "unknown".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// One favorited work from the feed
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    /// Name of the work
    pub title: String,
    /// URL of the work's detail page, usually identical to `guid`
    pub link: String,
    /// Unique identifier from the feed
    pub guid: String,
    /// Publication date, verbatim from the feed
    pub publication_date: String,
    /// First author credit that isn't a URL; empty when undeterminable
    pub author: String,
    /// Media URL; absent when the feed entry had no content element
    #[serde(rename = "mediaURL", default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// Media dimensions
    pub dimensions: Dimensions,
}

/// One page of the feed (transient, never persisted)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedPage {
    /// URL of the next page, if any
    pub next_page_url: Option<String>,
    /// Items in page order
    pub items: Vec<FeedItem>,
}

/// A downloaded variant of a feed item
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    /// The feed item, possibly with upgraded media URL and dimensions
    pub feed_item: FeedItem,
    /// Path relative to the output root, unique per saved variant
    pub stored_path: String,
}

/// Everything fetched in one pipeline run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchReport {
    /// Saved items in the order workers delivered them
    pub saved_items: Vec<SavedItem>,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

impl FetchReport {
    /// Number of saved items
    pub fn len(&self) -> usize {
        self.saved_items.len()
    }

    /// Whether nothing was saved
    pub fn is_empty(&self) -> bool {
        self.saved_items.is_empty()
    }

    /// Serialize the report as JSON and write it to `path`
    pub async fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).inspect_err(|e| {
            tracing::error!(error = %e, "Conversion to JSON failed");
        })?;
        tokio::fs::write(path, json).await.inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Error writing JSON report");
        })?;
        tracing::info!(path = %path.display(), items = self.len(), "Report written");
        Ok(())
    }
}
