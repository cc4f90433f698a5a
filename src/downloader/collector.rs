//! Collector: aggregates saved items into the final report.

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::types::{FetchReport, SavedItem};

/// Read saved items until the channel is closed, then deliver one [`FetchReport`].
///
/// Items are kept in arrival order. Runs as a single task, so the accumulating list needs
/// no synchronization.
pub(crate) async fn collect(
    mut saved_items: mpsc::Receiver<SavedItem>,
    report_tx: oneshot::Sender<FetchReport>,
) {
    let mut collected = Vec::new();
    while let Some(item) = saved_items.recv().await {
        debug!(path = %item.stored_path, "Saved item has arrived to be collected");
        collected.push(item);
    }

    let report = FetchReport {
        saved_items: collected,
        generated_at: Utc::now(),
    };
    info!(items = report.len(), "All saved items collected");
    if report_tx.send(report).is_err() {
        warn!("Report receiver dropped before the report was delivered");
    }
}
