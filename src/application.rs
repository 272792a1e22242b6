//! Application layer module
//!
//! This module contains the crawl orchestrator and the entry points
//! front-ends call to run a crawl.

pub mod crawl_orchestrator;
pub mod runner;

// Re-export commonly used items
pub use crawl_orchestrator::{CrawlOrchestrator, OrchestratorSettings};
pub use runner::{build_translator, crawl, run, run_with_cancel};
