//! Auction Crawler - authenticated auction listing crawler
//!
//! Signs in to the auction site, walks the results pages of each brand over
//! the selected categories, extracts listing records and downloads their
//! images into per-brand directories.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the types front-ends need
pub use application::{CrawlOrchestrator, crawl, run, run_with_cancel};
pub use domain::{CategoryId, CrawlProgress, CrawlResult, CrawlStage, CrawlSummary, Listing, ProgressSink, Query};
pub use infrastructure::{AppConfig, CrawlError};
