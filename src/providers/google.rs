use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{Credentials, Provider, ensure_count, http_client};
use crate::app_config::ProviderKind;
use crate::errors::ProviderError;
use crate::language_utils::{is_auto, map_language_code};

/// Default Cloud Translation v2 endpoint
pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Cloud Translation client
#[derive(Debug)]
pub struct Google {
    /// HTTP client for API requests
    client: Client,
}

/// Translation request body
#[derive(Debug, Serialize)]
pub struct GoogleRequest<'a> {
    /// Texts to translate
    q: &'a [String],

    /// Target language
    target: String,

    /// Source language, omitted for detection
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,

    /// Plain text rather than HTML
    format: &'static str,
}

/// Translation response body
#[derive(Debug, Deserialize)]
pub struct GoogleResponse {
    pub data: GoogleData,
}

#[derive(Debug, Deserialize)]
pub struct GoogleData {
    #[serde(default)]
    pub translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTranslation {
    pub translated_text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

impl Google {
    /// Create a new Google client
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
        }
    }

    /// Request URL with the API key attached
    fn request_url(credentials: &Credentials) -> Result<Url, ProviderError> {
        let endpoint = credentials.endpoint_or(DEFAULT_ENDPOINT);
        let mut url = Url::parse(endpoint)
            .map_err(|e| ProviderError::Config(format!("invalid Google endpoint '{}': {}", endpoint, e)))?;
        url.query_pairs_mut().append_pair("key", credentials.api_key.trim());
        Ok(url)
    }

    /// Extract translations from a response body
    pub fn parse_response(body: &str) -> Result<Vec<String>, ProviderError> {
        let response: GoogleResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::Transient(format!("failed to parse Google response: {}", e)))?;
        Ok(response
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

#[async_trait]
impl Provider for Google {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn translate(
        &self,
        texts: &[String],
        target: &str,
        source: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ProviderError> {
        credentials.require(ProviderKind::Google)?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = GoogleRequest {
            q: texts,
            target: map_language_code(ProviderKind::Google, target),
            source: (!is_auto(source)).then(|| map_language_code(ProviderKind::Google, source)),
            format: "text",
        };

        debug!("Google request: {} texts -> {}", texts.len(), request.target);

        let response = self
            .client
            .post(Self::request_url(credentials)?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Google API error ({}): {}", status, body);
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        ensure_count(texts.len(), Self::parse_response(&body)?)
    }
}
