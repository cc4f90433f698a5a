//! Download workers: pull items off the shared queue and save their media.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::LargeVariantConfig;
use crate::error::{Error, Result};
use crate::filesystem::Filesystem;
use crate::html::extract_download_url;
use crate::http::HttpClient;
use crate::probe::probe;
use crate::types::{FeedItem, SavedItem};
use crate::utils::{derive_filename, new_download_id};

/// Filename prefix for the regular variant when large variants are also saved
const REGULAR_PREFIX: &str = "regular";
/// Filename prefix for the large variant
const LARGE_PREFIX: &str = "large";

/// Item source shared by every worker; each worker pulls one item at a time
pub(crate) type SharedItems = Arc<Mutex<mpsc::Receiver<FeedItem>>>;

/// Everything one worker needs; the HTTP client is owned by this worker alone
pub(crate) struct WorkerContext {
    pub(crate) worker_id: usize,
    pub(crate) output_root: PathBuf,
    pub(crate) client: Arc<dyn HttpClient>,
    pub(crate) filesystem: Arc<dyn Filesystem>,
    pub(crate) large_variant: LargeVariantConfig,
}

/// One variant written to disk
struct SavedVariant {
    stored_path: String,
    size: u64,
}

/// Run one worker until the item source is closed and drained.
///
/// Per-item failures are logged and the item skipped; they never stop the worker.
/// Returns the number of saved items this worker emitted.
pub(crate) async fn run_worker(
    ctx: WorkerContext,
    items: SharedItems,
    results: mpsc::Sender<SavedItem>,
) -> usize {
    debug!(worker_id = ctx.worker_id, "Starting download worker");
    let mut saved = 0;

    loop {
        let next = {
            let mut receiver = items.lock().await;
            receiver.recv().await
        };
        let Some(item) = next else {
            break;
        };

        match process_item(&ctx, item, &results).await {
            Ok(count) => saved += count,
            Err(e) if e.is_item_local() => {
                warn!(worker_id = ctx.worker_id, error = %e, "Skipping item");
            }
            Err(e) => {
                // Result channel gone: nothing left to report to
                error!(worker_id = ctx.worker_id, error = %e, "Stopping download worker");
                break;
            }
        }
    }

    info!(worker_id = ctx.worker_id, saved, "Quitting download worker");
    saved
}

/// Download one item (and its large variant, if enabled). Returns how many saved items
/// were emitted.
async fn process_item(
    ctx: &WorkerContext,
    item: FeedItem,
    results: &mpsc::Sender<SavedItem>,
) -> Result<usize> {
    let media_url = item
        .media_url
        .clone()
        .ok_or_else(|| Error::MissingMediaUrl {
            link: item.link.clone(),
        })?;
    debug!(worker_id = ctx.worker_id, url = %media_url, "Worker about to start downloading");

    let id = new_download_id()?;
    let regular_prefix = if ctx.large_variant.enabled {
        REGULAR_PREFIX
    } else {
        ""
    };
    let regular = download_variant(ctx, &id, &media_url, regular_prefix).await?;
    emit(results, item.clone(), regular.stored_path).await?;

    if !ctx.large_variant.enabled {
        return Ok(1);
    }

    // A failed upgrade never invalidates the regular variant already emitted
    match upgrade_to_large(ctx, &id, &item, &media_url, regular.size).await {
        Ok(Some((upgraded, large))) => {
            emit(results, upgraded, large.stored_path).await?;
            Ok(2)
        }
        Ok(None) => Ok(1),
        Err(e) => {
            warn!(
                worker_id = ctx.worker_id,
                link = %item.link,
                error = %e,
                "Large variant upgrade failed"
            );
            Ok(1)
        }
    }
}

async fn emit(
    results: &mpsc::Sender<SavedItem>,
    feed_item: FeedItem,
    stored_path: String,
) -> Result<()> {
    results
        .send(SavedItem {
            feed_item,
            stored_path,
        })
        .await
        .map_err(|_| Error::Other("result channel closed while workers were running".into()))
}

/// Fetch `url` and write it to `<output_root>/<id>/<prefix_filename>`.
async fn download_variant(
    ctx: &WorkerContext,
    id: &Uuid,
    url: &str,
    prefix: &str,
) -> Result<SavedVariant> {
    let bytes = ctx.client.fetch(url).await?;
    if bytes.is_empty() {
        return Err(Error::transport(url, "empty response body"));
    }
    write_variant(ctx, id, url, prefix, &bytes).await
}

async fn write_variant(
    ctx: &WorkerContext,
    id: &Uuid,
    url: &str,
    prefix: &str,
    bytes: &[u8],
) -> Result<SavedVariant> {
    let dir_name = id.to_string();
    let filename = derive_filename(prefix, url);
    let dir_path = ctx.output_root.join(&dir_name);
    let file_path = dir_path.join(&filename);

    ctx.filesystem.create_dir_all(&dir_path).await?;
    ctx.filesystem.write_file(&file_path, bytes).await?;

    debug!(
        worker_id = ctx.worker_id,
        path = %file_path.display(),
        size = bytes.len(),
        "Media downloaded"
    );
    Ok(SavedVariant {
        stored_path: relative_path(&dir_name, &filename),
        size: bytes.len() as u64,
    })
}

fn relative_path(dir_name: &str, filename: &str) -> String {
    Path::new(dir_name).join(filename).to_string_lossy().into_owned()
}

/// Look for a larger variant on the item's detail page and save it next to the regular one.
///
/// Returns `Ok(None)` when there's nothing to upgrade to: no detail link, no download
/// anchor, the same URL as the regular variant, or a variant that isn't large enough.
async fn upgrade_to_large(
    ctx: &WorkerContext,
    id: &Uuid,
    item: &FeedItem,
    regular_url: &str,
    regular_size: u64,
) -> Result<Option<(FeedItem, SavedVariant)>> {
    if item.link.is_empty() {
        debug!(worker_id = ctx.worker_id, "Item has no detail link, skipping large variant");
        return Ok(None);
    }

    let page = ctx.client.fetch(&item.link).await?;
    let large_url = extract_download_url(page.as_slice(), &ctx.large_variant.download_class);
    if large_url.is_empty() || large_url == regular_url {
        debug!(worker_id = ctx.worker_id, link = %item.link, "No distinct large variant");
        return Ok(None);
    }

    let bytes = ctx.client.fetch(&large_url).await?;
    let size = bytes.len() as u64;
    let threshold = ctx.large_variant.gate.threshold(regular_size);
    if size == 0 || size <= threshold {
        info!(
            worker_id = ctx.worker_id,
            url = %large_url,
            size,
            threshold,
            "Large variant not larger than threshold, keeping regular only"
        );
        return Ok(None);
    }

    let saved = write_variant(ctx, id, &large_url, LARGE_PREFIX, &bytes).await?;
    let upgraded = FeedItem {
        media_url: Some(large_url),
        dimensions: probe(&bytes),
        ..item.clone()
    };
    Ok(Some((upgraded, saved)))
}
