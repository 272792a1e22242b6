//! Logging system configuration and initialization
//!
//! This module provides the crawler's logging setup with:
//! - Console and/or file output
//! - Structured JSON logging (optional)
//! - Rotation of the previous run's log file on start
//! - KST (Korea Standard Time) timestamps

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Utc};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::infrastructure::config::{AppConfig, defaults};
pub use crate::infrastructure::config::LoggingConfig;

const KST_OFFSET_SECONDS: i32 = 9 * 3600;

// Keeps the non-blocking file writer alive for the life of the process
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECONDS).expect("UTC+9 is a valid offset")
}

/// Custom time formatter for KST (Korea Standard Time, UTC+9)
struct KstTimeFormatter;

impl FormatTime for KstTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let kst_time = Utc::now().with_timezone(&kst());
        write!(w, "{}", kst_time.format("%Y-%m-%d %H:%M:%S%.3f %Z"))
    }
}

/// Per-user log directory, e.g. `~/.local/share/auction-crawler/logs`
///
/// Falls back to `./logs` when the platform has no data directory.
pub fn get_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(defaults::APP_DIR_NAME))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
        .join("logs")
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level with noisy
/// HTTP and HTML parsing dependencies capped unless the level is trace.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level).map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    if !config.level.to_lowercase().contains("trace") {
        for directive in [
            "reqwest=info",
            "hyper=warn",
            "hyper_util=warn",
            "h2=warn",
            "rustls=warn",
            "html5ever=warn",
            "selectors=warn",
            "tokio=info",
        ] {
            filter = filter.add_directive(directive.parse()?);
        }
        filter = filter.add_directive(format!("auction_crawler_lib={}", config.level).parse()?);
    }

    Ok(filter)
}

/// Rename an existing log file with its modification timestamp
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str) -> Result<()> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(());
    }

    let metadata = std::fs::metadata(&log_file_path).map_err(|e| anyhow!("Failed to get log file metadata: {}", e))?;
    let file_time = metadata.modified().unwrap_or_else(|_| std::time::SystemTime::now());

    let datetime: chrono::DateTime<Utc> = file_time.into();
    let stamp = datetime.with_timezone(&kst()).format("%Y%m%dT%H%M%S");
    let file_stem = log_file_name.trim_end_matches(".log");
    let rotated_path = log_dir.join(format!("{}.{}.log", file_stem, stamp));

    std::fs::rename(&log_file_path, &rotated_path).map_err(|e| {
        anyhow!(
            "Failed to rotate log file {} to {}: {}",
            log_file_path.display(),
            rotated_path.display(),
            e
        )
    })?;

    Ok(())
}

/// Delete the oldest log files beyond `max_files`
fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<usize> {
    let mut log_files = Vec::new();

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path.extension().is_some_and(|ext| ext == "log");
        if path.is_file() && is_log {
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(max_files as usize) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove old log file {:?}: {}", path, e);
        } else {
            removed += 1;
        }
    }

    Ok(removed)
}

/// Initialize logging with custom configuration
///
/// Set `RUST_LOG` to override the configured filter, e.g.
/// `RUST_LOG="debug,reqwest=debug"` to see HTTP client internals.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;
    let registry = Registry::default().with(env_filter);

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(KstTimeFormatter)
            .with_target(false)
    });

    let mut log_dir = None;
    let (file_plain, file_json) = if config.file_output {
        let dir = config.directory.clone().unwrap_or_else(get_log_directory);
        std::fs::create_dir_all(&dir).map_err(|e| anyhow!("Failed to create log directory {:?}: {}", dir, e))?;

        if config.rotate_on_start {
            rotate_existing_log_file(&dir, &config.file_name)?;
            cleanup_old_logs(&dir, config.max_files)?;
        }

        let file_appender = rolling::never(&dir, &config.file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);
        log_dir = Some(dir);

        if config.json_format {
            let layer = fmt::Layer::new()
                .json()
                .with_writer(file_writer)
                .with_timer(KstTimeFormatter)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);
            (None, Some(layer))
        } else {
            // Minimal formatting in files: time + level + message
            let layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(KstTimeFormatter)
                .with_target(false)
                .with_ansi(false);
            (Some(layer), None)
        }
    } else {
        (None, None)
    };

    if console_layer.is_none() && file_plain.is_none() && file_json.is_none() {
        return Err(anyhow!("No logging output configured"));
    }

    registry
        .with(console_layer)
        .with(file_plain)
        .with(file_json)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if let Some(dir) = log_dir {
        info!("Log directory: {:?}", dir);
    }

    Ok(())
}

/// Log the build and the settings a crawl run will use
///
/// Credentials are never logged; only whether an account is configured.
pub fn log_run_environment(config: &AppConfig) {
    info!("=== Auction Crawler v{} ({}/{}) ===", env!("CARGO_PKG_VERSION"), std::env::consts::OS, std::env::consts::ARCH);
    info!("Site: {}", config.site.base_url);
    info!(
        "Account configured: {}",
        if config.credentials.email.is_empty() { "no" } else { "yes" }
    );
    info!(
        "Pages: {} per page, {}ms between requests, {}s timeout",
        config.crawling.page_size, config.crawling.page_delay_ms, config.crawling.request_timeout_seconds
    );
    if let Some(cap) = config.crawling.max_pages_per_brand {
        info!("Page cap per brand: {}", cap);
    }
    info!(
        "Images: {} workers, {}s per download",
        config.assets.max_concurrent_downloads, config.assets.download_timeout_seconds
    );
    if config.translation.enabled {
        info!(
            "Translation: {} -> {}",
            config.translation.source_lang, config.translation.target_lang
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.level.is_empty());
        assert!(config.console_output);
    }

    #[test]
    fn test_log_directory_ends_in_app_logs() {
        let dir = get_log_directory();
        assert!(dir.ends_with("logs"));
        assert_eq!(dir, get_log_directory());
    }

    #[test]
    fn test_rotation_renames_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("run.log"), "previous run").unwrap();

        rotate_existing_log_file(dir.path(), "run.log").unwrap();

        assert!(!dir.path().join("run.log").exists());
        let rotated: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(rotated.len(), 1);
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..4 {
            std::fs::write(dir.path().join(format!("run.{i}.log")), "x").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        let removed = cleanup_old_logs(dir.path(), 2).unwrap();

        assert_eq!(removed, 2);
        assert!(dir.path().join("notes.txt").exists());
    }
}
