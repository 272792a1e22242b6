//! Progress events observed by crawl front-ends
//!
//! The orchestrator reports progress synchronously through a `ProgressSink`.
//! Sinks only observe; nothing they do feeds back into the crawl.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// Represents the current stage of a crawl run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CrawlStage {
    /// Signing in to the auction site
    Authenticating,
    /// Determining how many results pages a brand has
    Discovering,
    /// Fetching and extracting results pages
    Crawling,
    /// Downloading listing images
    DownloadingAssets,
    /// All work finished, result assembled
    Completed,
}

impl std::fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authenticating => write!(f, "Signing in"),
            Self::Discovering => write!(f, "Discovering pages"),
            Self::Crawling => write!(f, "Crawling"),
            Self::DownloadingAssets => write!(f, "Downloading images"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Snapshot of crawl progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlProgress {
    pub stage: CrawlStage,
    /// Brand being crawled, if the stage is brand-scoped
    pub brand: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    /// Pages completed across all brands
    pub pages_completed: u32,
    /// Listings accepted so far across all brands
    pub listings_found: usize,
    pub images_resolved: usize,
    pub images_total: usize,
    pub timestamp: DateTime<Utc>,
}

impl CrawlProgress {
    pub fn new(stage: CrawlStage) -> Self {
        Self {
            stage,
            brand: None,
            current_page: 0,
            total_pages: 0,
            pages_completed: 0,
            listings_found: 0,
            images_resolved: 0,
            images_total: 0,
            timestamp: Utc::now(),
        }
    }

    /// Page progress within the current brand, 0.0 to 100.0
    pub fn page_percentage(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        f64::from(self.current_page) / f64::from(self.total_pages) * 100.0
    }
}

/// Receiver of progress snapshots
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: &CrawlProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(&CrawlProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &CrawlProgress) {
        self(progress);
    }
}

impl ProgressSink for UnboundedSender<CrawlProgress> {
    fn on_progress(&self, progress: &CrawlProgress) {
        // A dropped receiver only means nobody is watching any more
        let _ = self.send(progress.clone());
    }
}

/// Sink that discards every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_progress(&self, _progress: &CrawlProgress) {}
}
