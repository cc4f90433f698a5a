//! Core fetch pipeline split into focused submodules.
//!
//! `FavoritesFetcher::fetch_favorites` wires the pipeline together:
//! - the feed producer ([`crate::feed::paginate`]) pushes items into a bounded item queue
//! - [`worker`] tasks drain the queue, download media and emit saved items
//! - the [`collector`] turns saved items into the final [`FetchReport`]
//!
//! Shutdown is strictly ordered: wait for the producer's completion signal, close the item
//! queue, join every worker, close the result channel, then receive the report.

mod collector;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed;
use crate::filesystem::{Filesystem, OsFilesystem};
use crate::http::{HttpClientFactory, ReqwestClientFactory};
use crate::types::{FetchReport, SavedItem};
use worker::WorkerContext;

/// Fetches a user's favorites: feed pagination, concurrent downloads, one report.
///
/// Cheap to clone; the configuration and collaborators are shared behind `Arc`s.
#[derive(Clone)]
pub struct FavoritesFetcher {
    config: Arc<Config>,
    clients: Arc<dyn HttpClientFactory>,
    filesystem: Arc<dyn Filesystem>,
}

impl FavoritesFetcher {
    /// Create a fetcher using `reqwest` for HTTP and the local filesystem
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration is invalid
    pub fn new(config: Config) -> Result<Self> {
        let clients = Arc::new(ReqwestClientFactory::new(config.http.clone()));
        Self::with_collaborators(config, clients, Arc::new(OsFilesystem))
    }

    /// Create a fetcher with custom HTTP and filesystem collaborators
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration is invalid
    pub fn with_collaborators(
        config: Config,
        clients: Arc<dyn HttpClientFactory>,
        filesystem: Arc<dyn Filesystem>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            clients,
            filesystem,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch every favorite of `username` into `output_root` and report what was saved.
    ///
    /// Each saved variant lands in its own random subdirectory of `output_root`. Items
    /// whose download fails are left out of the report; a feed page that fails to load
    /// ends pagination early without failing the call.
    ///
    /// # Errors
    /// Only setup failures are returned: the output root can't be created, or an HTTP
    /// client can't be built.
    pub async fn fetch_favorites(&self, username: &str, output_root: &Path) -> Result<FetchReport> {
        // Start: everything fallible happens before any task is spawned
        self.filesystem.create_dir_all(output_root).await?;
        let producer_client = self.clients.create_client()?;
        let worker_count = self.config.download.worker_count;
        let mut worker_contexts = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            worker_contexts.push(WorkerContext {
                worker_id,
                output_root: output_root.to_path_buf(),
                client: self.clients.create_client()?,
                filesystem: Arc::clone(&self.filesystem),
                large_variant: self.config.large_variant.clone(),
            });
        }

        // Bounded so a burst of pages doesn't outrun the workers by much
        let (item_tx, item_rx) = mpsc::channel(self.config.download.item_queue_capacity);
        // Consumer-paced: workers hand over results one at a time
        let (result_tx, result_rx) = mpsc::channel::<SavedItem>(1);
        let (report_tx, report_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();

        // ProducerRunning
        let seed_url = self.config.seed_url(username);
        info!(username, url = %seed_url, worker_count, "Starting favorites fetch");
        let producer = tokio::spawn(
            async move {
                feed::paginate(producer_client.as_ref(), &seed_url, &item_tx, done_tx).await;
                // Hand the sender back so the orchestrator performs the one close
                item_tx
            }
            .instrument(info_span!("feed_producer")),
        );

        let items: worker::SharedItems = Arc::new(Mutex::new(item_rx));
        let workers: Vec<_> = worker_contexts
            .into_iter()
            .map(|ctx| {
                let span = info_span!("download_worker", worker_id = ctx.worker_id);
                tokio::spawn(
                    worker::run_worker(ctx, Arc::clone(&items), result_tx.clone()).instrument(span),
                )
            })
            .collect();
        drop(items);

        let collector = tokio::spawn(
            collector::collect(result_rx, report_tx).instrument(info_span!("collector")),
        );

        // Draining: wait for the producer, then close the item queue
        match done_rx.await {
            Ok(summary) if summary.is_complete() => {
                info!(pages = summary.pages, items = summary.items, "Feed producer has finished");
            }
            Ok(summary) => {
                warn!(
                    pages = summary.pages,
                    items = summary.items,
                    error = ?summary.error,
                    "Feed producer finished early; continuing with the items queued so far"
                );
            }
            Err(_) => error!("Feed producer exited without signalling completion"),
        }
        match producer.await {
            Ok(item_tx) => drop(item_tx),
            Err(e) => error!(error = %e, "Feed producer task failed"),
        }

        // WorkersJoined
        let mut saved = 0;
        let outcomes = futures::future::join_all(workers).await;
        for (worker_id, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(count) => saved += count,
                Err(e) => error!(worker_id, error = %e, "Download worker task failed"),
            }
        }
        info!(saved, "All download workers have finished");

        // Collected: workers are gone, so closing the result channel is safe
        drop(result_tx);

        // Done
        let report = report_rx
            .await
            .map_err(|_| Error::Other("collector exited without producing a report".into()))?;
        if let Err(e) = collector.await {
            warn!(error = %e, "Collector task failed after delivering the report");
        }
        info!(items = report.len(), "Favorites fetched");
        Ok(report)
    }
}
