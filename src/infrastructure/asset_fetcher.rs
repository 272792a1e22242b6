//! Bounded-concurrency image downloader
//!
//! A fixed number of workers drain a shared queue of download tasks. Each
//! result is keyed by the task's source URL, never by completion order, so
//! callers can match files back to the listings that referenced them.

#![allow(clippy::uninlined_format_args)]

use reqwest::{Client, StatusCode};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::config::AssetConfig;
use super::crawl_error::DownloadError;

/// Query keys that request a scaled thumbnail
const SIZING_PARAMS: [&str; 2] = ["w", "h"];

/// Outcome of every download, keyed by source URL
pub type DownloadResults = HashMap<String, Result<PathBuf, DownloadError>>;

/// One image to fetch into a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub source_url: String,
    pub destination_dir: PathBuf,
}

impl DownloadTask {
    pub fn new(source_url: impl Into<String>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination_dir: destination_dir.into(),
        }
    }
}

/// Remove the `w` and `h` sizing parameters from an image URL
///
/// Every other query segment keeps its raw text and position. A URL without
/// sizing parameters comes back byte for byte unchanged.
pub fn normalize_image_url(raw: &str) -> Result<String, DownloadError> {
    let mut url = Url::parse(raw).map_err(|e| DownloadError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    let Some(query) = url.query() else {
        return Ok(raw.to_string());
    };

    let segments: Vec<&str> = query.split('&').collect();
    let kept: Vec<&str> = segments
        .iter()
        .copied()
        .filter(|segment| {
            let key = segment.split_once('=').map_or(*segment, |(key, _)| key);
            !SIZING_PARAMS.contains(&key)
        })
        .collect();

    if kept.len() == segments.len() {
        return Ok(raw.to_string());
    }

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let joined = kept.join("&");
        url.set_query(Some(&joined));
    }

    Ok(url.to_string())
}

/// File name for a normalized image URL: its last path segment
pub fn file_name_for(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Downloads images with a fixed-size worker pool
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    client: Client,
    max_workers: usize,
}

impl AssetFetcher {
    pub fn new(config: &AssetConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.download_timeout())
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            max_workers: config.max_concurrent_downloads.max(1),
        })
    }

    /// Download every URL into `destination_dir`
    pub async fn fetch_all<I>(&self, urls: I, destination_dir: &Path, cancel: &CancellationToken) -> DownloadResults
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let tasks = urls
            .into_iter()
            .map(|url| DownloadTask::new(url, destination_dir))
            .collect();
        self.fetch_tasks(tasks, cancel).await
    }

    pub async fn fetch_tasks(&self, tasks: Vec<DownloadTask>, cancel: &CancellationToken) -> DownloadResults {
        self.fetch_tasks_observed(tasks, cancel, &|_| {}).await
    }

    /// Run `tasks` through the worker pool, calling `on_complete` with the
    /// number of finished downloads after each one
    ///
    /// A URL listed more than once is downloaded once, into the directory of
    /// its first task. Waits for every worker before returning.
    pub async fn fetch_tasks_observed(
        &self,
        tasks: Vec<DownloadTask>,
        cancel: &CancellationToken,
        on_complete: &(dyn Fn(usize) + Sync),
    ) -> DownloadResults {
        let mut seen = HashSet::new();
        let queue: VecDeque<DownloadTask> = tasks
            .into_iter()
            .filter(|task| seen.insert(task.source_url.clone()))
            .collect();

        if queue.is_empty() {
            return DownloadResults::new();
        }

        let total = queue.len();
        let worker_count = self.max_workers.min(total);
        info!("🚀 Downloading {} image(s) with {} worker(s)", total, worker_count);

        let queue = Mutex::new(queue);
        let completed = AtomicUsize::new(0);

        let workers = (0..worker_count).map(|worker_id| self.run_worker(worker_id, &queue, &completed, cancel, on_complete));
        let results: DownloadResults = futures::future::join_all(workers)
            .await
            .into_iter()
            .flatten()
            .collect();

        let failed = results.values().filter(|result| result.is_err()).count();
        info!("✅ Image downloads finished: {} succeeded, {} failed", total - failed, failed);

        results
    }

    async fn run_worker(
        &self,
        worker_id: usize,
        queue: &Mutex<VecDeque<DownloadTask>>,
        completed: &AtomicUsize,
        cancel: &CancellationToken,
        on_complete: &(dyn Fn(usize) + Sync),
    ) -> Vec<(String, Result<PathBuf, DownloadError>)> {
        let mut results = Vec::new();

        loop {
            let Some(task) = queue.lock().await.pop_front() else {
                break;
            };

            let result = if cancel.is_cancelled() {
                Err(DownloadError::Cancelled {
                    url: task.source_url.clone(),
                })
            } else {
                self.download(&task, cancel).await
            };

            match &result {
                Ok(path) => debug!("👷 Worker {} saved {:?}", worker_id, path),
                Err(e) => warn!("Image download failed for {}: {}", task.source_url, e),
            }

            on_complete(completed.fetch_add(1, Ordering::SeqCst) + 1);
            results.push((task.source_url, result));
        }

        debug!("👷 Worker {} finished", worker_id);
        results
    }

    async fn download(&self, task: &DownloadTask, cancel: &CancellationToken) -> Result<PathBuf, DownloadError> {
        let normalized = normalize_image_url(&task.source_url)?;
        let url = Url::parse(&normalized).map_err(|e| DownloadError::InvalidUrl {
            url: normalized.clone(),
            reason: e.to_string(),
        })?;
        let file_name = file_name_for(&url).ok_or_else(|| DownloadError::InvalidUrl {
            url: normalized.clone(),
            reason: "no file name in URL path".to_string(),
        })?;

        tokio::fs::create_dir_all(&task.destination_dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: task.destination_dir.clone(),
                source,
            })?;

        let response = tokio::select! {
            result = self.client.get(url).send() => result.map_err(|e| DownloadError::from_reqwest(&normalized, e))?,
            () = cancel.cancelled() => return Err(DownloadError::Cancelled { url: normalized }),
        };

        if response.status() != StatusCode::OK {
            return Err(DownloadError::Status {
                status: response.status().as_u16(),
                url: normalized,
            });
        }

        let bytes = tokio::select! {
            result = response.bytes() => result.map_err(|e| DownloadError::from_reqwest(&normalized, e))?,
            () = cancel.cancelled() => return Err(DownloadError::Cancelled { url: normalized }),
        };

        let path = task.destination_dir.join(file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}
