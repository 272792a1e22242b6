//! Authenticated HTTP session for crawling
//!
//! `HttpSession` owns the cookie jar and issues every request a crawl makes
//! against the auction site. Redirects are never followed automatically so
//! the session can tell a sign-in redirect (session rejected) apart from an
//! ordinary one. Request methods take `&mut self`: a session serves one
//! request at a time and is reused sequentially.

use reqwest::header::LOCATION;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::crawl_error::SessionError;

/// Redirect hops `get_page` follows before giving up
const MAX_REDIRECTS: usize = 5;

/// Configuration for session behavior
#[derive(Debug, Clone)]
pub struct HttpSessionConfig {
    pub user_agent: String,
    /// Timeout applied to each individual request
    pub request_timeout: Duration,
    /// Path of the sign-in page; a redirect there means the session was rejected
    pub sign_in_path: String,
}

/// Cookie-carrying client bound to one site
pub struct HttpSession {
    client: Client,
    base_url: Url,
    sign_in_path: String,
    requests_issued: u64,
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("base_url", &self.base_url.as_str())
            .field("requests_issued", &self.requests_issued)
            .finish_non_exhaustive()
    }
}

impl HttpSession {
    /// Create an unauthenticated session with an empty cookie jar
    pub fn new(base_url: Url, config: &HttpSessionConfig) -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url,
            sign_in_path: config.sign_in_path.clone(),
            requests_issued: 0,
        })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Requests issued through this session so far
    pub const fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Resolve a path or absolute URL against the site base
    pub fn resolve(&self, path_or_url: &str) -> Result<Url, SessionError> {
        self.base_url
            .join(path_or_url)
            .map_err(|e| SessionError::InvalidUrl {
                url: path_or_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Issue a GET and return the raw response, whatever its status
    pub async fn get(&mut self, url: Url) -> Result<Response, SessionError> {
        self.requests_issued += 1;
        debug!("🌐 HTTP GET (session): {}", url);
        let url_str = url.to_string();
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::from_reqwest(&url_str, e))
    }

    /// Issue a form-encoded POST and return the raw response, whatever its status
    pub async fn post_form(&mut self, url: Url, form: &[(&str, &str)]) -> Result<Response, SessionError> {
        self.requests_issued += 1;
        debug!("🌐 HTTP POST (session): {}", url);
        let url_str = url.to_string();
        self.client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| SessionError::from_reqwest(&url_str, e))
    }

    /// Fetch an authenticated HTML page
    ///
    /// A 401, or a redirect to the sign-in page, yields `SessionError::Expired`.
    /// Other redirects are followed up to a small hop limit.
    pub async fn get_page(&mut self, url: Url, cancel: &CancellationToken) -> Result<String, SessionError> {
        let mut current = url;

        for _ in 0..=MAX_REDIRECTS {
            if cancel.is_cancelled() {
                return Err(SessionError::Cancelled { url: current.to_string() });
            }

            let url_str = current.to_string();
            let response = tokio::select! {
                result = self.get(current.clone()) => result?,
                () = cancel.cancelled() => {
                    warn!("🛑 HTTP request cancelled for URL: {}", url_str);
                    return Err(SessionError::Cancelled { url: url_str });
                }
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                return Err(SessionError::Expired { url: url_str });
            }

            if status.is_redirection() {
                let location = redirect_target(&current, &response)?;
                if self.is_sign_in(&location) {
                    warn!("Session redirected to sign-in page from {}", url_str);
                    return Err(SessionError::Expired { url: url_str });
                }
                debug!("Following redirect {} -> {}", url_str, location);
                current = location;
                continue;
            }

            if !status.is_success() {
                return Err(SessionError::Status {
                    status: status.as_u16(),
                    url: url_str,
                });
            }

            let body = tokio::select! {
                result = response.text() => result.map_err(|e| SessionError::from_reqwest(&url_str, e))?,
                () = cancel.cancelled() => {
                    warn!("🛑 Response reading cancelled for URL: {}", url_str);
                    return Err(SessionError::Cancelled { url: url_str });
                }
            };

            debug!("Successfully fetched: {} ({} chars)", url_str, body.len());
            return Ok(body);
        }

        info!("Too many redirects starting from {}", current);
        Err(SessionError::Status {
            status: StatusCode::LOOP_DETECTED.as_u16(),
            url: current.to_string(),
        })
    }

    fn is_sign_in(&self, url: &Url) -> bool {
        url.path().trim_end_matches('/') == self.sign_in_path.trim_end_matches('/')
    }
}

/// Resolve a redirect's `Location` header against the URL that produced it
pub(crate) fn redirect_target(from: &Url, response: &Response) -> Result<Url, SessionError> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| SessionError::Status {
            status: response.status().as_u16(),
            url: from.to_string(),
        })?;

    from.join(location).map_err(|e| SessionError::InvalidUrl {
        url: location.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> HttpSession {
        let config = HttpSessionConfig {
            user_agent: "auction-crawler-test".to_string(),
            request_timeout: Duration::from_secs(5),
            sign_in_path: "/client/users/sign-in".to_string(),
        };
        HttpSession::new(Url::parse(&server.uri()).unwrap(), &config).unwrap()
    }

    #[tokio::test]
    async fn test_get_page_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let mut session = session_for(&server);
        let url = session.resolve("/list").unwrap();
        let body = session.get_page(url, &CancellationToken::new()).await.unwrap();

        assert_eq!(body, "<html>ok</html>");
        assert_eq!(session.requests_issued(), 1);
    }

    #[tokio::test]
    async fn test_redirect_to_sign_in_is_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/client/users/sign-in"))
            .mount(&server)
            .await;

        let mut session = session_for(&server);
        let url = session.resolve("/list").unwrap();
        let err = session.get_page(url, &CancellationToken::new()).await.unwrap_err();

        assert!(err.invalidates_session());
    }

    #[tokio::test]
    async fn test_unauthorized_is_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut session = session_for(&server);
        let url = session.resolve("/list").unwrap();
        let err = session.get_page(url, &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, SessionError::Expired { .. }));
    }

    #[tokio::test]
    async fn test_other_redirects_are_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let mut session = session_for(&server);
        let url = session.resolve("/old").unwrap();
        let body = session.get_page(url, &CancellationToken::new()).await.unwrap();

        assert_eq!(body, "moved");
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut session = session_for(&server);
        let url = session.resolve("/list").unwrap();
        let err = session.get_page(url, &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, SessionError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let server = MockServer::start().await;
        let mut session = session_for(&server);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let url = session.resolve("/list").unwrap();
        let err = session.get_page(url, &cancel).await.unwrap_err();

        assert!(matches!(err, SessionError::Cancelled { .. }));
        assert_eq!(session.requests_issued(), 0);
    }
}
