//! Configuration infrastructure
//!
//! Contains configuration loading and management for auction crawling.
//!
//! Configuration is layered:
//! 1. Built-in defaults (`defaults` module)
//! 2. Optional configuration file (JSON or TOML)
//! 3. Environment variables prefixed with `AUCTION_CRAWLER`, using `__` as
//!    the section separator (e.g. `AUCTION_CRAWLER__CREDENTIALS__PASSWORD`)

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub credentials: Credentials,
    pub crawling: CrawlingConfig,
    pub assets: AssetConfig,
    pub translation: TranslationConfig,
    pub logging: LoggingConfig,
}

/// Auction site endpoints and sign-in details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host every path below is joined onto
    pub base_url: String,
    pub sign_in_path: String,
    pub sign_in_post_path: String,
    pub account_path: String,
    pub results_path: String,
    /// Hidden input carrying the anti-forgery token on the sign-in page
    pub csrf_field: String,
    /// Text the account page contains only when signed in
    pub account_marker_text: String,
    /// Text of the sign-out link on the account page
    pub sign_out_link_text: String,
    pub user_agent: String,
}

/// Sign-in credentials
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            remember_me: true,
        }
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember_me: true,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// Results page crawling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlingConfig {
    /// Results requested per page (`limit`)
    pub page_size: u32,
    pub sort_key: String,
    pub table_type: String,
    /// Pause between successive results page requests
    pub page_delay_ms: u64,
    /// Timeout applied to every individual page request
    pub request_timeout_seconds: u64,
    /// Upper bound on pages fetched per brand; `None` follows the pagination control
    pub max_pages_per_brand: Option<u32>,
}

impl CrawlingConfig {
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Image download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Size of the download worker pool
    pub max_concurrent_downloads: usize,
    pub download_timeout_seconds: u64,
    /// Directory created under each brand's output directory
    pub images_dir_name: String,
}

impl AssetConfig {
    pub const fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_seconds)
    }
}

/// Title and time-label translation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub source_lang: String,
    pub target_lang: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub directory: Option<PathBuf>,

    /// Rename the previous run's log file with its timestamp instead of appending
    pub rotate_on_start: bool,

    /// Number of rotated log files to keep
    pub max_files: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: ecoauc::BASE_URL.to_string(),
            sign_in_path: ecoauc::SIGN_IN_PATH.to_string(),
            sign_in_post_path: ecoauc::SIGN_IN_POST_PATH.to_string(),
            account_path: ecoauc::ACCOUNT_PATH.to_string(),
            results_path: ecoauc::RESULTS_PATH.to_string(),
            csrf_field: ecoauc::CSRF_FIELD.to_string(),
            account_marker_text: ecoauc::ACCOUNT_MARKER_TEXT.to_string(),
            sign_out_link_text: ecoauc::SIGN_OUT_LINK_TEXT.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl Default for CrawlingConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::PAGE_SIZE,
            sort_key: defaults::SORT_KEY.to_string(),
            table_type: defaults::TABLE_TYPE.to_string(),
            page_delay_ms: defaults::PAGE_DELAY_MS,
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_pages_per_brand: None,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: defaults::MAX_CONCURRENT_DOWNLOADS,
            download_timeout_seconds: defaults::DOWNLOAD_TIMEOUT_SECONDS,
            images_dir_name: defaults::IMAGES_DIR_NAME.to_string(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source_lang: defaults::TRANSLATION_SOURCE_LANG.to_string(),
            target_lang: defaults::TRANSLATION_TARGET_LANG.to_string(),
            endpoint: defaults::TRANSLATION_ENDPOINT.to_string(),
            timeout_seconds: defaults::TRANSLATION_TIMEOUT_SECONDS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            directory: None,
            rotate_on_start: true,
            max_files: defaults::LOG_MAX_FILES,
        }
    }
}

/// Configuration errors surfaced before any network call
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    Validation { message: String },
}

impl AppConfig {
    /// Build configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        Ok(config)
    }

    /// Reject settings the crawl cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawling.page_size == 0 {
            return Err(ConfigError::Validation {
                message: "crawling.page_size must be greater than 0".to_string(),
            });
        }

        if self.assets.max_concurrent_downloads == 0 {
            return Err(ConfigError::Validation {
                message: "assets.max_concurrent_downloads must be greater than 0".to_string(),
            });
        }

        if self.credentials.email.trim().is_empty() || self.credentials.password.is_empty() {
            return Err(ConfigError::Validation {
                message: "credentials.email and credentials.password are required".to_string(),
            });
        }

        if url::Url::parse(&self.site.base_url).is_err() {
            return Err(ConfigError::Validation {
                message: format!("site.base_url '{}' is not a valid URL", self.site.base_url),
            });
        }

        Ok(())
    }
}

/// Configuration manager for loading and saving the settings file
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Create a configuration manager pointing at the default settings file
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        let config_path = config_dir.join(defaults::CONFIG_FILE_NAME);

        Ok(Self { config_path })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// Environment overrides are applied on top of the file.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            self.save_config(&AppConfig::default()).await?;
        }

        match AppConfig::load(Some(&self.config_path)) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration file could not be parsed: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                self.save_config(&AppConfig::default())
                    .await
                    .context("Failed to save default configuration")?;

                info!("✅ Reset to default configuration");
                AppConfig::load(Some(&self.config_path)).context("Failed to load default configuration")
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// ecoauc.com endpoints and page markers
pub mod ecoauc {
    /// Base URL for the auction site
    pub const BASE_URL: &str = "https://www.ecoauc.com";

    pub const SIGN_IN_PATH: &str = "/client/users/sign-in";

    pub const SIGN_IN_POST_PATH: &str = "/client/users/post-sign-in";

    /// Account page, fetched only to confirm the sign-in
    pub const ACCOUNT_PATH: &str = "/client/users";

    /// Inspection results listing
    pub const RESULTS_PATH: &str = "/client/auctions/inspect";

    pub const CSRF_FIELD: &str = "_csrfToken";

    pub const ACCOUNT_MARKER_TEXT: &str = "アカウント";

    pub const SIGN_OUT_LINK_TEXT: &str = "ログアウト";

    /// Sign-in form field names
    pub mod form {
        pub const METHOD: &str = "_method";
        pub const EMAIL: &str = "email_address";
        pub const PASSWORD: &str = "password";
        pub const REMEMBER: &str = "remember-me";
    }

    /// Results endpoint query parameter names
    pub mod params {
        pub const LIMIT: &str = "limit";
        pub const SORT_KEY: &str = "sortKey";
        pub const TABLE_TYPE: &str = "tableType";
        pub const QUERY: &str = "q";
        pub const PRICE_LOW: &str = "low";
        pub const PRICE_HIGH: &str = "high";
        pub const BRANDS: &str = "master_item_brands";
        pub const AUCTION_LANE: &str = "auction_lane_id";
        pub const SHAPES: &str = "master_item_shapes";
        pub const RANKS: &str = "master_item_ranks";
        pub const PAGE: &str = "page";
        /// Indexed array prefix: `master_item_categories[0]`, `[1]`, ...
        pub const CATEGORIES: &str = "master_item_categories";
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "auction-crawler";

    pub const CONFIG_FILE_NAME: &str = "auction_crawler_config.json";

    /// Environment variable prefix for overrides
    pub const ENV_PREFIX: &str = "AUCTION_CRAWLER";

    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

    /// Results per page
    pub const PAGE_SIZE: u32 = 500;

    pub const SORT_KEY: &str = "1";

    pub const TABLE_TYPE: &str = "grid";

    /// Delay between results page requests in milliseconds
    pub const PAGE_DELAY_MS: u64 = 1000;

    /// Page request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Download worker pool size
    pub const MAX_CONCURRENT_DOWNLOADS: usize = 8;

    pub const DOWNLOAD_TIMEOUT_SECONDS: u64 = 30;

    pub const IMAGES_DIR_NAME: &str = "images";

    pub const TRANSLATION_SOURCE_LANG: &str = "ja";

    pub const TRANSLATION_TARGET_LANG: &str = "ko";

    pub const TRANSLATION_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

    pub const TRANSLATION_TIMEOUT_SECONDS: u64 = 10;

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;

    pub const LOG_FILE_NAME: &str = "auction-crawler.log";

    pub const LOG_MAX_FILES: u32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            credentials: Credentials::new("buyer@example.com", "secret"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_defaults_match_site() {
        let config = AppConfig::default();
        assert_eq!(config.crawling.page_size, 500);
        assert_eq!(config.crawling.page_delay_ms, 1000);
        assert_eq!(config.site.results_path, "/client/auctions/inspect");
        assert_eq!(config.assets.images_dir_name, "images");
        assert!(!config.translation.enabled);
    }

    #[test]
    fn test_validate_requires_credentials() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("credentials"));
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = valid_config();
        config.assets.max_concurrent_downloads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("a@b.c", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawler.json");
        std::fs::write(
            &path,
            r#"{ "crawling": { "page_delay_ms": 250 }, "credentials": { "email": "x@y.z", "password": "pw" } }"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.crawling.page_delay_ms, 250);
        assert_eq!(config.crawling.page_size, 500);
        assert_eq!(config.credentials.email, "x@y.z");
    }

    #[tokio::test]
    async fn test_manager_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));

        let config = manager.load_config().await.unwrap();
        assert!(manager.config_path().exists());
        assert_eq!(config.crawling.page_size, defaults::PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_manager_resets_corrupted_file_and_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let manager = ConfigManager::with_path(&path);

        let config = manager.load_config().await.unwrap();

        assert_eq!(config.crawling.page_delay_ms, defaults::PAGE_DELAY_MS);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("config.json.corrupted")).unwrap(),
            "{ not json"
        );
    }
}
