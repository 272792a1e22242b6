//! Translation port for listing text
//!
//! Translation is an optional capability: callers always get a string back,
//! the source text whenever translation is unavailable or fails.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::config::TranslationConfig;
use super::crawl_error::TranslationError;

/// Translate text between languages, falling back to the input on any failure
#[async_trait]
pub trait TranslationPort: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> String;
}

/// Identity translation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

#[async_trait]
impl TranslationPort for NoopTranslator {
    async fn translate(&self, text: &str, _source_lang: &str, _target_lang: &str) -> String {
        text.to_string()
    }
}

/// Client for the public Google Translate `translate_a/single` endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TranslationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &TranslationConfig) -> Result<Self, TranslationError> {
        Self::new(&config.endpoint, Duration::from_secs(config.timeout_seconds))
    }

    async fn try_translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String, TranslationError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status { status: status.as_u16() });
        }

        let body: serde_json::Value = response.json().await?;
        parse_translation(&body)
    }
}

#[async_trait]
impl TranslationPort for GoogleTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        match self.try_translate(text, source_lang, target_lang).await {
            Ok(translated) => {
                debug!("Translated '{}' -> '{}'", text, translated);
                translated
            }
            Err(e) => {
                warn!("Translation failed, keeping source text '{}': {}", text, e);
                text.to_string()
            }
        }
    }
}

/// Join the translated chunk of every segment in `[[["chunk", "source", ...], ...], ...]`
fn parse_translation(body: &serde_json::Value) -> Result<String, TranslationError> {
    let segments = body
        .get(0)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| TranslationError::Malformed {
            reason: "missing segment array".to_string(),
        })?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(serde_json::Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(TranslationError::Malformed {
            reason: "no translated segments".to_string(),
        });
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_translation_joins_segments() {
        let body = json!([[["가방 ", "バッグ ", null], ["검정", "黒", null]], null, "ja"]);
        assert_eq!(parse_translation(&body).unwrap(), "가방 검정");
    }

    #[test]
    fn test_parse_translation_rejects_unexpected_shape() {
        assert!(parse_translation(&json!({"error": "quota"})).is_err());
        assert!(parse_translation(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_noop_is_identity() {
        assert_eq!(NoopTranslator.translate("バッグ", "ja", "ko").await, "バッグ");
    }

    #[tokio::test]
    async fn test_google_translator_uses_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("sl", "ja"))
            .and(query_param("tl", "ko"))
            .and(query_param("q", "バッグ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[["가방", "バッグ"]]])))
            .mount(&server)
            .await;

        let translator =
            GoogleTranslator::new(format!("{}/translate_a/single", server.uri()), Duration::from_secs(5)).unwrap();
        assert_eq!(translator.translate("バッグ", "ja", "ko").await, "가방");
    }

    #[tokio::test]
    async fn test_google_translator_falls_back_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let translator =
            GoogleTranslator::new(format!("{}/translate_a/single", server.uri()), Duration::from_secs(5)).unwrap();
        assert_eq!(translator.translate("バッグ", "ja", "ko").await, "バッグ");
    }
}
