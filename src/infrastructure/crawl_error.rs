//! Error types for the crawl pipeline
//!
//! Failures scoped to one item (a card, an image, a translation) are logged
//! and absorbed where they happen. Failures that invalidate the session or a
//! query travel up to the orchestrator as `CrawlError`.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single request made through an authenticated session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session rejected by the site (redirected to sign-in or 401): {url}")]
    Expired { url: String },

    #[error("HTTP error {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("HTTP request failed: {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request cancelled: {url}")]
    Cancelled { url: String },
}

impl SessionError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.to_string() }
        } else {
            Self::Request {
                url: url.to_string(),
                source,
            }
        }
    }

    /// True when the session can no longer be used for this crawl
    pub const fn invalidates_session(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

/// Sign-in failure; no session is obtainable
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Anti-forgery token field '{field}' missing from sign-in page")]
    TokenMissing { field: String },

    #[error("Sign-in rejected: invalid credentials or session ({reason})")]
    InvalidCredentialsOrSession { reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Sign-in request failed: {0}")]
    Http(#[from] SessionError),
}

/// Failure while locating a query's page count
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to fetch first results page for '{brand}': {source}")]
    Fetch {
        brand: String,
        #[source]
        source: SessionError,
    },
}

impl DiscoveryError {
    pub const fn session_error(&self) -> &SessionError {
        match self {
            Self::Fetch { source, .. } => source,
        }
    }
}

/// Failure of one image download; only that listing loses its image
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Invalid image URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Download timed out: {url}")]
    Timeout { url: String },

    #[error("Download returned HTTP {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Download failed: {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download cancelled: {url}")]
    Cancelled { url: String },
}

impl DownloadError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.to_string() }
        } else {
            Self::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Translation failure; never escapes the translation port
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Translation service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed translation response: {reason}")]
    Malformed { reason: String },
}

/// Failure that stops a crawl run
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Page discovery failed for brand '{brand}': {source}")]
    Discovery {
        brand: String,
        #[source]
        source: DiscoveryError,
    },

    #[error("Session invalidated while crawling '{brand}': {source}")]
    Session {
        brand: String,
        #[source]
        source: SessionError,
    },

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("Failed to prepare output directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::infrastructure::config::ConfigError),

    #[error("Invalid results page selectors: {0}")]
    Parsing(#[from] crate::infrastructure::parsing::ParsingError),

    #[error("Failed to build download client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_invalidates_session() {
        let expired = SessionError::Expired { url: "https://x/a".into() };
        let status = SessionError::Status {
            status: 500,
            url: "https://x/a".into(),
        };
        assert!(expired.invalidates_session());
        assert!(!status.invalidates_session());
    }

    #[test]
    fn test_messages_name_the_url() {
        let err = DownloadError::Status {
            status: 404,
            url: "https://img/x.jpg".into(),
        };
        assert_eq!(err.to_string(), "Download returned HTTP 404: https://img/x.jpg");
    }
}
