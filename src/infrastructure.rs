//! Infrastructure layer for HTTP, HTML parsing and external integrations
//!
//! This module provides the authenticated session, sign-in flow, results
//! page parsing, image downloads, translation, configuration and logging.

pub mod asset_fetcher;
pub mod auth;
pub mod config; // Configuration constants and helpers
pub mod crawl_error;
pub mod http_session;
pub mod logging; // Logging infrastructure
pub mod pagination;
pub mod parsing; // Results page parsers
pub mod translation;

// Re-export commonly used items
pub use asset_fetcher::{AssetFetcher, DownloadResults, DownloadTask, file_name_for, normalize_image_url};
pub use auth::Authenticator;
pub use config::{AppConfig, ConfigManager, Credentials, ecoauc};
pub use crawl_error::{AuthError, CrawlError, DiscoveryError, DownloadError, SessionError, TranslationError};
pub use http_session::{HttpSession, HttpSessionConfig};
pub use logging::{get_log_directory, init_logging_with_config, log_run_environment};
pub use pagination::{Discovery, PaginationDiscoverer};
pub use parsing::{ListingExtractor, ListingSelectors, PaginationParser, ParseContext, ParsingError};
pub use translation::{GoogleTranslator, NoopTranslator, TranslationPort};
