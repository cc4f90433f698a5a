//! Shared test helpers: in-memory HTTP and filesystem collaborators.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::downloader::FavoritesFetcher;
use crate::error::{Error, Result};
use crate::filesystem::Filesystem;
use crate::http::{HttpClient, HttpClientFactory};

#[derive(Clone)]
enum FakeResponse {
    Body(Vec<u8>),
    Fail,
}

/// Canned responses keyed by URL; also acts as its own client factory.
///
/// Unknown URLs fail with a transport error. Every fetched URL is recorded, and each
/// [`HttpClientFactory::create_client`] call is counted.
#[derive(Clone, Default)]
pub(crate) struct FakeWeb {
    routes: Arc<Mutex<HashMap<String, FakeResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
    clients_created: Arc<Mutex<usize>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
}

impl FakeWeb {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Respond to `url` with `body`
    pub(crate) fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeResponse::Body(body.into()));
    }

    /// Fail every fetch of `url` with a transport error
    pub(crate) fn fail(&self, url: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeResponse::Fail);
    }

    /// Delay the response to `url`
    pub(crate) fn delay(&self, url: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
    }

    /// Every URL fetched so far, in order
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many independent clients were handed out
    pub(crate) fn clients_created(&self) -> usize {
        *self.clients_created.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeWeb {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        let delay = self.delays.lock().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.routes.lock().unwrap().get(url).cloned();
        match response {
            Some(FakeResponse::Body(body)) => Ok(body),
            Some(FakeResponse::Fail) => Err(Error::transport(url, "connection reset by peer")),
            None => Err(Error::transport(url, "HTTP 404 Not Found")),
        }
    }
}

impl HttpClientFactory for FakeWeb {
    fn create_client(&self) -> Result<Arc<dyn HttpClient>> {
        *self.clients_created.lock().unwrap() += 1;
        Ok(Arc::new(self.clone()))
    }
}

/// In-memory filesystem with injectable failures.
#[derive(Clone, Default)]
pub(crate) struct MemoryFilesystem {
    dirs: Arc<Mutex<BTreeSet<PathBuf>>>,
    files: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
    failing_dirs: Arc<Mutex<HashSet<PathBuf>>>,
    create_dir_calls: Arc<Mutex<usize>>,
    failing_dir_calls: Arc<Mutex<HashSet<usize>>>,
    failing_filenames: Arc<Mutex<HashSet<String>>>,
}

impl MemoryFilesystem {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail creation of exactly this directory
    pub(crate) fn fail_create_dir(&self, path: &Path) {
        self.failing_dirs.lock().unwrap().insert(path.to_path_buf());
    }

    /// Fail the `n`th directory creation (1-based), whatever its path
    pub(crate) fn fail_create_dir_call(&self, n: usize) {
        self.failing_dir_calls.lock().unwrap().insert(n);
    }

    /// Directories created so far
    pub(crate) fn dirs(&self) -> BTreeSet<PathBuf> {
        self.dirs.lock().unwrap().clone()
    }

    /// Fail writes of any file with this name
    pub(crate) fn fail_writes_named(&self, filename: &str) {
        self.failing_filenames
            .lock()
            .unwrap()
            .insert(filename.to_string());
    }

    /// All written files
    pub(crate) fn files(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }

    /// Contents of a written file
    pub(crate) fn read(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

#[async_trait::async_trait]
impl Filesystem for MemoryFilesystem {
    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        let call = {
            let mut calls = self.create_dir_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.failing_dir_calls.lock().unwrap().contains(&call)
            || self.failing_dirs.lock().unwrap().contains(path)
        {
            return Err(Error::filesystem(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in path.ancestors() {
            dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_filenames.lock().unwrap().contains(&name) {
            return Err(Error::filesystem(
                path,
                std::io::Error::new(std::io::ErrorKind::StorageFull, "no space left on device"),
            ));
        }
        let parent_exists = path
            .parent()
            .is_some_and(|parent| self.dirs.lock().unwrap().contains(parent));
        if !parent_exists {
            return Err(Error::filesystem(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "parent directory missing"),
            ));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

/// Fetcher over fake collaborators with the given worker count
pub(crate) fn create_test_fetcher(
    web: &FakeWeb,
    fs: &MemoryFilesystem,
    worker_count: usize,
) -> FavoritesFetcher {
    let mut config = test_config();
    config.download.worker_count = worker_count;
    FavoritesFetcher::with_collaborators(config, Arc::new(web.clone()), Arc::new(fs.clone()))
        .unwrap()
}

/// Config whose seed URL for user "denarced" is `http://feeds.test/denarced/1`
pub(crate) fn test_config() -> Config {
    Config {
        feed_url_template: "http://feeds.test/{username}/1".to_string(),
        ..Default::default()
    }
}
