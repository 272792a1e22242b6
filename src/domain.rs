//! Domain module - Core crawl entities
//!
//! This module contains the data the crawl engine produces and consumes:
//! queries, listing records, page results, the aggregate crawl result and
//! the progress events observed by front-ends.

pub mod constants;
pub mod events;
pub mod listing;
pub mod query;

// Re-export commonly used items
pub use events::{CrawlProgress, CrawlStage, NoopProgressSink, ProgressSink};
pub use listing::{CrawlResult, CrawlStats, CrawlSummary, Listing, ListingRow, PageResult};
pub use query::{CategoryId, Query};
