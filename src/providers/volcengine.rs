use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::signing::{canonical_query, hmac_sha256, hmac_sha256_hex, sha256_hex};
use super::{Credentials, Provider, ensure_count, http_client};
use crate::app_config::ProviderKind;
use crate::errors::ProviderError;
use crate::language_utils::{is_auto, map_language_code};

const DEFAULT_HOST: &str = "translate.volcengineapi.com";
const DEFAULT_REGION: &str = "cn-north-1";
const SERVICE: &str = "translate";
const ACTION: &str = "TranslateText";
const VERSION: &str = "2020-06-01";
const CONTENT_TYPE: &str = "application/json";

/// Volcengine machine translation client
#[derive(Debug)]
pub struct Volcengine {
    /// HTTP client for API requests
    client: Client,
}

/// TranslateText request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolcengineRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language: Option<String>,
    target_language: String,
    text_list: &'a [String],
}

/// TranslateText response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolcengineResponse {
    #[serde(default)]
    pub response_metadata: ResponseMetadata,
    #[serde(default)]
    pub translation_list: Vec<VolcengineTranslation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMetadata {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub error: Option<VolcengineError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolcengineError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolcengineTranslation {
    pub translation: String,
}

/// Headers to attach to a signed request
#[derive(Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    pub x_date: String,
    pub content_sha256: String,
    pub authorization: String,
}

impl Volcengine {
    /// Create a new Volcengine client
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
        }
    }

    /// Sign a POST request with the HMAC-SHA256 scheme
    pub fn sign(
        credentials: &Credentials,
        host: &str,
        region: &str,
        query: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<SignedHeaders, ProviderError> {
        let x_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let short_date = now.format("%Y%m%d").to_string();
        let content_sha256 = sha256_hex(body);

        let signed_headers = "content-type;host;x-content-sha256;x-date";
        let canonical_request = format!(
            "POST\n/\n{}\ncontent-type:{}\nhost:{}\nx-content-sha256:{}\nx-date:{}\n\n{}\n{}",
            query, CONTENT_TYPE, host, content_sha256, x_date, signed_headers, content_sha256
        );

        let scope = format!("{}/{}/{}/request", short_date, region, SERVICE);
        let string_to_sign = format!(
            "HMAC-SHA256\n{}\n{}\n{}",
            x_date,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let k_date = hmac_sha256(credentials.api_secret.trim().as_bytes(), short_date.as_bytes())?;
        let k_region = hmac_sha256(&k_date, region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, SERVICE.as_bytes())?;
        let k_signing = hmac_sha256(&k_service, b"request")?;
        let signature = hmac_sha256_hex(&k_signing, string_to_sign.as_bytes())?;

        Ok(SignedHeaders {
            authorization: format!(
                "HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
                credentials.api_key.trim(),
                scope,
                signed_headers,
                signature
            ),
            x_date,
            content_sha256,
        })
    }

    /// Extract translations from a response body
    pub fn parse_response(body: &str) -> Result<Vec<String>, ProviderError> {
        let response: VolcengineResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::Transient(format!("failed to parse Volcengine response: {}", e)))?;

        if let Some(err) = response.response_metadata.error.filter(|e| !e.code.is_empty()) {
            let message = format!("{}: {}", err.code, err.message);
            return Err(classify_error_code(&err.code, message));
        }

        Ok(response
            .translation_list
            .into_iter()
            .map(|t| t.translation)
            .collect())
    }
}

/// Map a Volcengine error code to a failure class
fn classify_error_code(code: &str, message: String) -> ProviderError {
    if code.contains("Throttling") || code.contains("RateLimit") || code.starts_with("InternalError")
        || code.contains("ServiceUnavailable")
    {
        ProviderError::Transient(message)
    } else if code.contains("Signature") || code.contains("AccessKey") || code.contains("Unauthorized") {
        ProviderError::Config(message)
    } else {
        ProviderError::Fatal(message)
    }
}

#[async_trait]
impl Provider for Volcengine {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Volcengine
    }

    async fn translate(
        &self,
        texts: &[String],
        target: &str,
        source: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ProviderError> {
        credentials.require(ProviderKind::Volcengine)?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = VolcengineRequest {
            source_language: (!is_auto(source)).then(|| map_language_code(ProviderKind::Volcengine, source)),
            target_language: map_language_code(ProviderKind::Volcengine, target),
            text_list: texts,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| ProviderError::Fatal(format!("failed to serialize request: {}", e)))?;

        let host = credentials.endpoint_or(DEFAULT_HOST);
        let region = credentials.region_or(DEFAULT_REGION);
        let query = canonical_query(&[("Action", ACTION), ("Version", VERSION)]);
        let headers = Self::sign(credentials, host, region, &query, &body, Utc::now())?;

        debug!("Volcengine request: {} texts -> {}", texts.len(), request.target_language);

        let response = self
            .client
            .post(format!("https://{}/?{}", host, query))
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Date", &headers.x_date)
            .header("X-Content-Sha256", &headers.content_sha256)
            .header("Authorization", &headers.authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Volcengine API error ({}): {}", status, body);
            // Error bodies still carry a structured code worth classifying
            if let Err(err) = Self::parse_response(&body) {
                if !matches!(err, ProviderError::Transient(_)) || status.is_server_error() {
                    return Err(err);
                }
            }
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        ensure_count(texts.len(), Self::parse_response(&body)?)
    }
}
