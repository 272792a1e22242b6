//! Command-line front-end for the auction crawler

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use auction_crawler_lib::domain::constants::KNOWN_BRANDS;
use auction_crawler_lib::infrastructure::ConfigManager;
use auction_crawler_lib::infrastructure::logging::{init_logging_with_config, log_run_environment};
use auction_crawler_lib::{AppConfig, CategoryId, CrawlProgress, CrawlStage, crawl};

#[derive(Parser, Debug)]
#[command(name = "auction-crawler", author, version, about)]
struct Args {
    /// Brands to crawl, exactly as the site labels them (repeatable)
    #[arg(short, long = "brand", required_unless_present = "list")]
    brands: Vec<String>,

    /// Category names or ids, e.g. "bag" or 2 (repeatable)
    #[arg(short, long = "category", required_unless_present = "list")]
    categories: Vec<CategoryId>,

    /// Root directory for per-brand image folders and crawl_results.json
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Configuration file (JSON or TOML); without it the per-user settings file
    /// is used and created on first run. Environment overrides apply on top
    #[arg(long)]
    config: Option<PathBuf>,

    /// Translate titles and time labels
    #[arg(long, default_value_t = false)]
    translate: bool,

    /// Pause between results page requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print known brands and categories, then exit
    #[arg(long, default_value_t = false)]
    list: bool,
}

fn print_catalog() {
    println!("Categories:");
    for category in CategoryId::known() {
        println!("  {:>3}  {}", category.id(), category.name().unwrap_or_default());
    }
    println!("Brands:");
    for brand in KNOWN_BRANDS {
        println!("  {brand}");
    }
}

fn log_progress(progress: &CrawlProgress) {
    match progress.stage {
        CrawlStage::Crawling => info!(
            "[{}] {} {}/{} ({:.0}%), listings so far: {}",
            progress.stage,
            progress.brand.as_deref().unwrap_or_default(),
            progress.current_page,
            progress.total_pages,
            progress.page_percentage(),
            progress.listings_found
        ),
        CrawlStage::DownloadingAssets => {
            info!("[{}] {}/{}", progress.stage, progress.images_resolved, progress.images_total);
        }
        _ => info!("[{}] {}", progress.stage, progress.brand.as_deref().unwrap_or_default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        print_catalog();
        return Ok(());
    }

    let mut config = match args.config.as_deref() {
        Some(path) => AppConfig::load(Some(path)).context("Failed to load configuration")?,
        None => ConfigManager::new()?.load_config().await?,
    };
    if args.translate {
        config.translation.enabled = true;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.crawling.page_delay_ms = delay_ms;
    }

    init_logging_with_config(&config.logging)?;
    log_run_environment(&config);

    for brand in &args.brands {
        if !KNOWN_BRANDS.contains(&brand.as_str()) {
            warn!("'{}' is not in the known brand list; only exact brand labels match", brand);
        }
    }
    let categories: BTreeSet<CategoryId> = args.categories.iter().copied().collect();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 Ctrl-C received, stopping crawl");
            ctrl_c.cancel();
        }
    });

    let result = match crawl(&config, &args.brands, &categories, &args.output, &log_progress, &cancel).await {
        Ok(result) => result,
        Err(e) => {
            error!("❌ Crawl failed: {}", e);
            return Err(anyhow!(e));
        }
    };

    let results_path = args.output.join("crawl_results.json");
    let json = serde_json::to_string_pretty(&result).context("Failed to serialize crawl result")?;
    tokio::fs::write(&results_path, json)
        .await
        .with_context(|| format!("Failed to write {}", results_path.display()))?;

    info!("Results written to {}", results_path.display());
    println!("{}", result.summary());

    let stats = result.stats();
    if !stats.failed_brands.is_empty() {
        println!("Brands skipped after discovery failure: {}", stats.failed_brands.join(", "));
    }
    if stats.images_failed > 0 {
        println!("Images that could not be downloaded: {}", stats.images_failed);
    }

    Ok(())
}
