//! Pagination producer: walks every feed page for one user and streams the items out.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::fetch_feed_page;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::FeedItem;

/// What the producer accomplished, delivered through its completion signal
#[derive(Debug, Default)]
pub struct PaginationSummary {
    /// Number of pages fetched and parsed
    pub pages: usize,
    /// Number of items pushed into the item sink
    pub items: usize,
    /// Error that stopped pagination early, if any
    pub error: Option<Error>,
}

impl PaginationSummary {
    /// Whether every page up to the last one was walked
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Walk all feed pages starting at `seed_url`, pushing each item into `item_sink` in page
/// order.
///
/// Stops at the first page without a next link, or immediately on any fetch or parse
/// failure (items already pushed stay valid). `done` is signalled exactly once on every
/// exit path. Closing `item_sink` is left to the caller.
pub async fn paginate(
    client: &dyn HttpClient,
    seed_url: &str,
    item_sink: &mpsc::Sender<FeedItem>,
    done: oneshot::Sender<PaginationSummary>,
) {
    let mut summary = PaginationSummary::default();
    if let Err(e) = walk_pages(client, seed_url, item_sink, &mut summary).await {
        warn!(error = %e, pages = summary.pages, items = summary.items, "Pagination stopped early");
        summary.error = Some(e);
    }

    info!(pages = summary.pages, items = summary.items, "Feed pagination finished");
    if done.send(summary).is_err() {
        debug!("Pagination completion signal had no receiver");
    }
}

async fn walk_pages(
    client: &dyn HttpClient,
    seed_url: &str,
    item_sink: &mpsc::Sender<FeedItem>,
    summary: &mut PaginationSummary,
) -> Result<()> {
    let mut next_url = Some(seed_url.to_string());
    while let Some(url) = next_url {
        let page = fetch_feed_page(client, &url).await?;
        summary.pages += 1;

        // Pass favorites on to be downloaded
        for item in page.items {
            item_sink.send(item).await.map_err(|_| {
                Error::Other("item channel closed before pagination finished".into())
            })?;
            summary.items += 1;
        }

        next_url = page.next_page_url;
    }
    Ok(())
}
