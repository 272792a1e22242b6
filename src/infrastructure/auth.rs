//! Sign-in flow producing an authenticated `HttpSession`
//!
//! One-shot: a failed login is returned to the caller without retrying.

#![allow(clippy::uninlined_format_args)]

use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::config::{AppConfig, Credentials, SiteConfig, ecoauc::form};
use super::crawl_error::{AuthError, SessionError};
use super::http_session::{HttpSession, HttpSessionConfig, redirect_target};
use super::parsing::element_text;

/// Logs in to the auction site
#[derive(Debug, Clone)]
pub struct Authenticator {
    site: SiteConfig,
    session_config: HttpSessionConfig,
}

impl Authenticator {
    pub fn new(site: SiteConfig, session_config: HttpSessionConfig) -> Self {
        Self { site, session_config }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let session_config = HttpSessionConfig {
            user_agent: config.site.user_agent.clone(),
            request_timeout: config.crawling.request_timeout(),
            sign_in_path: config.site.sign_in_path.clone(),
        };
        Self::new(config.site.clone(), session_config)
    }

    /// Sign in with `credentials` and return a session carrying the auth cookies
    ///
    /// Every call starts from an empty cookie jar, so calling it again yields an
    /// independent session.
    pub async fn login(&self, credentials: &Credentials) -> Result<HttpSession, AuthError> {
        let base_url = Url::parse(&self.site.base_url).map_err(|e| {
            AuthError::Http(SessionError::InvalidUrl {
                url: self.site.base_url.clone(),
                reason: e.to_string(),
            })
        })?;
        let mut session = HttpSession::new(base_url, &self.session_config).map_err(AuthError::Client)?;

        info!("🔐 Signing in to {} as {}", self.site.base_url, credentials.email);

        // 1. Anti-forgery token from the sign-in form
        let sign_in_url = session.resolve(&self.site.sign_in_path)?;
        let sign_in_html = read_success_body(&mut session, sign_in_url).await?;
        let token = extract_hidden_field(&sign_in_html, &self.site.csrf_field).ok_or_else(|| AuthError::TokenMissing {
            field: self.site.csrf_field.clone(),
        })?;
        debug!("Found {} on sign-in page", self.site.csrf_field);

        // 2. Credentials; only a redirect means the site accepted them
        let post_url = session.resolve(&self.site.sign_in_post_path)?;
        let mut fields = vec![
            (form::METHOD, "POST"),
            (self.site.csrf_field.as_str(), token.as_str()),
            (form::EMAIL, credentials.email.as_str()),
            (form::PASSWORD, credentials.password.as_str()),
        ];
        if credentials.remember_me {
            fields.push((form::REMEMBER, form::REMEMBER));
        }

        let response = session.post_form(post_url.clone(), &fields).await?;
        let status = response.status();
        if !status.is_redirection() {
            warn!("Sign-in POST answered HTTP {} instead of a redirect", status);
            return Err(AuthError::InvalidCredentialsOrSession {
                reason: format!("sign-in POST returned HTTP {}", status.as_u16()),
            });
        }

        let landing = redirect_target(&post_url, &response).map_err(|_| AuthError::InvalidCredentialsOrSession {
            reason: "sign-in redirect without Location".to_string(),
        })?;
        let landing_status = session.get(landing.clone()).await?.status();
        debug!("Followed sign-in redirect to {} (HTTP {})", landing, landing_status);

        // 3. Account page shows the signed-in marker
        let account_url = session.resolve(&self.site.account_path)?;
        let account_response = session.get(account_url.clone()).await?;
        let account_status = account_response.status();
        let account_html = account_response
            .text()
            .await
            .map_err(|e| SessionError::from_reqwest(account_url.as_str(), e))?;

        if !account_status.is_success()
            || !is_signed_in(&account_html, &self.site.account_marker_text, &self.site.sign_out_link_text)
        {
            warn!("Account page (HTTP {}) does not show a signed-in state", account_status);
            return Err(AuthError::InvalidCredentialsOrSession {
                reason: "signed-in marker absent from account page".to_string(),
            });
        }

        info!("✅ Signed in as {}", credentials.email);
        Ok(session)
    }
}

async fn read_success_body(session: &mut HttpSession, url: Url) -> Result<String, SessionError> {
    let response = session.get(url.clone()).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SessionError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    response
        .text()
        .await
        .map_err(|e| SessionError::from_reqwest(url.as_str(), e))
}

/// Value of the `<input name="{field}">` on a form page
fn extract_hidden_field(html: &str, field: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"input[name="{field}"]"#)).ok()?;
    Html::parse_document(html)
        .select(&selector)
        .find_map(|input| input.value().attr("value").map(str::to_string))
        .filter(|value| !value.is_empty())
}

/// Account page contains the marker text and a link reading exactly `sign_out_text`
fn is_signed_in(html: &str, marker_text: &str, sign_out_text: &str) -> bool {
    if !html.contains(marker_text) {
        return false;
    }
    let Ok(links) = Selector::parse("a") else {
        return false;
    };
    Html::parse_document(html)
        .select(&links)
        .filter_map(element_text)
        .any(|text| text == sign_out_text)
}
