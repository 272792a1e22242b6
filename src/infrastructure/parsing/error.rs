//! Parsing error types for results pages
//!
//! Selector errors surface when an extractor is built. A card whose image
//! source cannot be resolved is logged and skipped while the rest of the page
//! is processed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No valid selectors compiled for '{field}': {errors}")]
    NoValidSelectors { field: String, errors: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed { url: String, reason: String },
}

pub type ParsingResult<T> = Result<T, ParsingError>;
