//! Entry points for front-ends
//!
//! `crawl` signs in and runs one crawl on the caller's runtime. `run` does the
//! same from synchronous code by driving its own tokio runtime.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::crawl_orchestrator::CrawlOrchestrator;
use crate::domain::{CategoryId, CrawlProgress, CrawlResult, CrawlStage, ProgressSink};
use crate::infrastructure::auth::Authenticator;
use crate::infrastructure::config::{AppConfig, TranslationConfig};
use crate::infrastructure::crawl_error::CrawlError;
use crate::infrastructure::translation::{GoogleTranslator, TranslationPort};

/// Translator for the configured language pair, or `None` when disabled
pub fn build_translator(config: &TranslationConfig) -> Option<Arc<dyn TranslationPort>> {
    if !config.enabled {
        return None;
    }

    match GoogleTranslator::from_config(config) {
        Ok(translator) => {
            info!("Translating titles {} -> {}", config.source_lang, config.target_lang);
            Some(Arc::new(translator))
        }
        Err(e) => {
            warn!("Translation disabled, client setup failed: {}", e);
            None
        }
    }
}

/// Sign in and crawl `brands` over `categories`
///
/// A failed sign-in is returned before any results page is requested.
pub async fn crawl(
    config: &AppConfig,
    brands: &[String],
    categories: &BTreeSet<CategoryId>,
    output_root: &Path,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<CrawlResult, CrawlError> {
    config.validate()?;

    let orchestrator = CrawlOrchestrator::from_config(config, build_translator(&config.translation))?;

    sink.on_progress(&CrawlProgress::new(CrawlStage::Authenticating));
    let authenticator = Authenticator::from_config(config);
    let session = tokio::select! {
        result = authenticator.login(&config.credentials) => result?,
        () = cancel.cancelled() => return Err(CrawlError::Cancelled),
    };

    orchestrator
        .run(session, brands, categories, output_root, sink, cancel)
        .await
}

/// Blocking crawl on a dedicated runtime
pub fn run(
    config: &AppConfig,
    brands: &[String],
    categories: &BTreeSet<CategoryId>,
    output_root: &Path,
    sink: &dyn ProgressSink,
) -> Result<CrawlResult, CrawlError> {
    run_with_cancel(config, brands, categories, output_root, sink, &CancellationToken::new())
}

/// Blocking crawl that stops early once `cancel` fires
pub fn run_with_cancel(
    config: &AppConfig,
    brands: &[String],
    categories: &BTreeSet<CategoryId>,
    output_root: &Path,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<CrawlResult, CrawlError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CrawlError::Runtime)?;

    runtime.block_on(crawl(config, brands, categories, output_root, sink, cancel))
}
