//! Crawl orchestration across brands, pages and image downloads
//!
//! Pages are fetched strictly one after another through a single session,
//! with a fixed pause between successive page requests. Images are fetched
//! once, after every brand is exhausted, in one bounded concurrent batch.

#![allow(clippy::uninlined_format_args)]

use chrono::Utc;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::domain::{CategoryId, CrawlProgress, CrawlResult, CrawlStage, CrawlStats, Listing, ProgressSink, Query};
use crate::infrastructure::asset_fetcher::{AssetFetcher, DownloadResults, DownloadTask};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::crawl_error::{CrawlError, SessionError};
use crate::infrastructure::http_session::HttpSession;
use crate::infrastructure::pagination::PaginationDiscoverer;
use crate::infrastructure::parsing::{ListingExtractor, PaginationParser, ParseContext};
use crate::infrastructure::translation::TranslationPort;

/// Tunables of the page loop
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Pause between successive results page requests
    pub page_delay: Duration,
    pub page_size: u32,
    pub max_pages_per_brand: Option<u32>,
    /// Directory created under each brand directory for its images
    pub images_dir_name: String,
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_delay: config.crawling.page_delay(),
            page_size: config.crawling.page_size,
            max_pages_per_brand: config.crawling.max_pages_per_brand,
            images_dir_name: config.assets.images_dir_name.clone(),
        }
    }
}

/// Mutable bookkeeping of one run
struct RunState<'a> {
    stats: CrawlStats,
    progress: CrawlProgress,
    sink: &'a dyn ProgressSink,
    /// Set once the first results page request of the run went out
    page_requested: bool,
}

impl RunState<'_> {
    fn report(&mut self, stage: CrawlStage) {
        self.progress.stage = stage;
        self.progress.timestamp = Utc::now();
        self.sink.on_progress(&self.progress);
    }
}

/// Drives discovery, page extraction and the image batch for a set of brands
pub struct CrawlOrchestrator {
    discoverer: PaginationDiscoverer,
    extractor: ListingExtractor,
    fetcher: AssetFetcher,
    settings: OrchestratorSettings,
}

impl CrawlOrchestrator {
    pub fn new(
        discoverer: PaginationDiscoverer,
        extractor: ListingExtractor,
        fetcher: AssetFetcher,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            discoverer,
            extractor,
            fetcher,
            settings,
        }
    }

    /// Build every collaborator from configuration
    ///
    /// `translator`, when given, is applied to titles and time labels.
    pub fn from_config(config: &AppConfig, translator: Option<Arc<dyn TranslationPort>>) -> Result<Self, CrawlError> {
        let discoverer = PaginationDiscoverer::new(
            PaginationParser::new()?,
            config.site.results_path.clone(),
            config.crawling.clone(),
        );

        let mut extractor = ListingExtractor::new()?;
        if let Some(port) = translator {
            extractor = extractor.with_translator(
                port,
                config.translation.source_lang.clone(),
                config.translation.target_lang.clone(),
            );
        }

        let fetcher = AssetFetcher::new(&config.assets, &config.site.user_agent).map_err(CrawlError::Client)?;

        Ok(Self::new(discoverer, extractor, fetcher, OrchestratorSettings::from_config(config)))
    }

    /// Crawl every brand over `categories` and download the listings' images
    /// into `<output_root>/<brand>/<images_dir_name>/`
    ///
    /// `output_root` is created before any page is requested. A brand whose
    /// discovery fails is skipped. A rejected session or a cancellation during
    /// the page phase ends the run with an error.
    pub async fn run(
        &self,
        mut session: HttpSession,
        brands: &[String],
        categories: &BTreeSet<CategoryId>,
        output_root: &Path,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult, CrawlError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("crawl", %run_id);

        async move {
            let started_at = Utc::now();
            info!(
                "🚀 Starting crawl of {} brand(s) over {} categorie(s)",
                brands.len(),
                categories.len()
            );

            tokio::fs::create_dir_all(output_root)
                .await
                .map_err(|source| CrawlError::Io {
                    path: output_root.to_path_buf(),
                    source,
                })?;

            let mut state = RunState {
                stats: CrawlStats::default(),
                progress: CrawlProgress::new(CrawlStage::Discovering),
                sink,
                page_requested: false,
            };
            let mut listings = Vec::new();
            let mut tasks = Vec::new();

            for brand in brands {
                let query = Query::new(brand.clone(), categories.iter().copied(), self.settings.page_size);
                let brand_listings = self.crawl_brand(&mut session, &query, &mut state, cancel).await?;

                let images_dir = output_root
                    .join(brand_dir_name(brand))
                    .join(&self.settings.images_dir_name);
                tasks.extend(
                    brand_listings
                        .iter()
                        .filter_map(|listing| listing.image_url.as_ref())
                        .map(|url| DownloadTask::new(url.clone(), images_dir.clone())),
                );
                listings.extend(brand_listings);
            }

            info!(
                "📋 Page phase done: {} listing(s) from {} page(s), {} request(s) on the session",
                listings.len(),
                state.stats.pages_fetched,
                session.requests_issued()
            );

            // Single image batch over every distinct URL
            let distinct: BTreeSet<&str> = tasks.iter().map(|task| task.source_url.as_str()).collect();
            state.progress.brand = None;
            state.progress.images_total = distinct.len();
            state.progress.images_resolved = 0;
            state.report(CrawlStage::DownloadingAssets);

            let results = {
                let progress = &state.progress;
                let on_complete = |done: usize| {
                    let mut snapshot = progress.clone();
                    snapshot.images_resolved = done;
                    snapshot.timestamp = Utc::now();
                    sink.on_progress(&snapshot);
                };
                self.fetcher.fetch_tasks_observed(tasks, cancel, &on_complete).await
            };

            state.stats.images_downloaded = results.values().filter(|result| result.is_ok()).count();
            state.stats.images_failed = results.len() - state.stats.images_downloaded;
            assign_image_paths(&mut listings, &results);

            state.progress.images_resolved = state.stats.images_downloaded;
            state.report(CrawlStage::Completed);

            let result = CrawlResult::new(run_id, listings, state.stats, started_at, Utc::now());
            info!("✅ Crawl complete: {}", result.summary());
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Discover and walk every results page of one brand
    async fn crawl_brand(
        &self,
        session: &mut HttpSession,
        query: &Query,
        state: &mut RunState<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Listing>, CrawlError> {
        let brand = query.brand().to_string();
        state.progress.brand = Some(brand.clone());
        state.progress.current_page = 0;
        state.progress.total_pages = 0;
        state.report(CrawlStage::Discovering);

        self.pace(state, cancel).await?;
        let discovery = match self.discoverer.discover(session, query, cancel).await {
            Ok(discovery) => discovery,
            Err(e) => {
                if matches!(e.session_error(), SessionError::Cancelled { .. }) {
                    return Err(CrawlError::Cancelled);
                }
                if e.session_error().invalidates_session() {
                    error!("❌ Session rejected while discovering '{}': {}", brand, e);
                    return Err(CrawlError::Discovery { brand, source: e });
                }
                error!("❌ Skipping '{}': {}", brand, e);
                state.stats.failed_brands.push(brand);
                return Ok(Vec::new());
            }
        };
        state.stats.pages_fetched += 1;

        let total_pages = self
            .settings
            .max_pages_per_brand
            .map_or(discovery.page_count, |max| discovery.page_count.min(max));
        if total_pages == 0 {
            info!("'{}' has no results", brand);
            return Ok(Vec::new());
        }

        let context = ParseContext::new(brand.clone(), 1, session.base_url().clone());
        let mut brand_listings = Vec::new();
        let mut first_page = Some(discovery.first_page_html);
        state.progress.total_pages = total_pages;

        for page in 1..=total_pages {
            let html = match first_page.take() {
                Some(html) => html,
                None => match self.fetch_page(session, query, page, state, cancel).await? {
                    Some(html) => html,
                    None => continue,
                },
            };

            let result = self.extractor.extract(&html, &context.for_page(page)).await;
            state.stats.cards_skipped += result.cards_skipped;
            state.stats.cards_filtered += result.cards_seen - result.cards_skipped - result.listings.len();

            state.progress.current_page = page;
            state.progress.pages_completed += 1;
            state.progress.listings_found += result.listings.len();
            state.report(CrawlStage::Crawling);

            info!(
                "📄 '{}' page {}/{}: {} listing(s)",
                brand,
                page,
                total_pages,
                result.listings.len()
            );

            let has_more = result.has_more;
            brand_listings.extend(result.listings);
            if !has_more {
                info!("Page {} of '{}' has no result cards, stopping", page, brand);
                break;
            }
        }

        Ok(brand_listings)
    }

    /// Fetch one results page after the pacing delay
    ///
    /// `Ok(None)` means the page failed without invalidating the session.
    async fn fetch_page(
        &self,
        session: &mut HttpSession,
        query: &Query,
        page: u32,
        state: &mut RunState<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, CrawlError> {
        self.pace(state, cancel).await?;

        let brand = query.brand();
        let fetched = match self.discoverer.results_url(session, query, page) {
            Ok(url) => session.get_page(url, cancel).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(html) => {
                state.stats.pages_fetched += 1;
                Ok(Some(html))
            }
            Err(SessionError::Cancelled { .. }) => Err(CrawlError::Cancelled),
            Err(e) if e.invalidates_session() => {
                error!("❌ Session rejected on page {} of '{}': {}", page, brand, e);
                Err(CrawlError::Session {
                    brand: brand.to_string(),
                    source: e,
                })
            }
            Err(e) => {
                warn!("⚠️ Page {} of '{}' failed, continuing: {}", page, brand, e);
                state.stats.pages_failed += 1;
                Ok(None)
            }
        }
    }

    /// Sleep the pacing delay unless this is the run's first page request
    async fn pace(&self, state: &mut RunState<'_>, cancel: &CancellationToken) -> Result<(), CrawlError> {
        if cancel.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        if state.page_requested && !self.settings.page_delay.is_zero() {
            debug!("Waiting {:?} before next page request", self.settings.page_delay);
            tokio::select! {
                () = tokio::time::sleep(self.settings.page_delay) => {}
                () = cancel.cancelled() => return Err(CrawlError::Cancelled),
            }
        }

        state.page_requested = true;
        Ok(())
    }
}

/// Give each listing the file downloaded for its own image URL
///
/// Listings whose download failed, or that have no image, keep no path.
pub(crate) fn assign_image_paths(listings: &mut [Listing], results: &DownloadResults) {
    for listing in listings {
        listing.local_image_path = listing
            .image_url
            .as_ref()
            .and_then(|url| results.get(url))
            .and_then(|result| result.as_ref().ok())
            .cloned();
    }
}

/// File-system safe directory name for a brand
pub(crate) fn brand_dir_name(brand: &str) -> PathBuf {
    let cleaned: String = brand
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        PathBuf::from("_")
    } else {
        PathBuf::from(trimmed)
    }
}
