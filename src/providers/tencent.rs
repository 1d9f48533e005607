use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::signing::{hmac_sha256, hmac_sha256_hex, sha256_hex};
use super::{Credentials, Provider, ensure_count, http_client};
use crate::app_config::ProviderKind;
use crate::errors::ProviderError;
use crate::language_utils::map_language_code;

const DEFAULT_HOST: &str = "tmt.tencentcloudapi.com";
const DEFAULT_REGION: &str = "ap-beijing";
const SERVICE: &str = "tmt";
const ACTION: &str = "TextTranslate";
const VERSION: &str = "2018-03-21";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Tencent Cloud machine translation client
///
/// TextTranslate accepts a single text, so every request carries one.
#[derive(Debug)]
pub struct Tencent {
    /// HTTP client for API requests
    client: Client,
}

/// TextTranslate request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TencentRequest<'a> {
    source_text: &'a str,
    source: String,
    target: String,
    project_id: i64,
}

/// TextTranslate response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TencentResponse {
    pub response: TencentPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TencentPayload {
    #[serde(default)]
    pub target_text: Option<String>,
    #[serde(default)]
    pub error: Option<TencentError>,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TencentError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl Tencent {
    /// Create a new Tencent client
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
        }
    }

    /// TC3-HMAC-SHA256 `Authorization` header for a JSON POST
    pub fn authorization(
        credentials: &Credentials,
        host: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<String, ProviderError> {
        let timestamp = now.timestamp();
        let date = now.format("%Y-%m-%d").to_string();

        let signed_headers = "content-type;host";
        let canonical_request = format!(
            "POST\n/\n\ncontent-type:{}\nhost:{}\n\n{}\n{}",
            CONTENT_TYPE,
            host,
            signed_headers,
            sha256_hex(body)
        );

        let scope = format!("{}/{}/tc3_request", date, SERVICE);
        let string_to_sign = format!(
            "TC3-HMAC-SHA256\n{}\n{}\n{}",
            timestamp,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac_sha256(
            format!("TC3{}", credentials.api_secret.trim()).as_bytes(),
            date.as_bytes(),
        )?;
        let secret_service = hmac_sha256(&secret_date, SERVICE.as_bytes())?;
        let secret_signing = hmac_sha256(&secret_service, b"tc3_request")?;
        let signature = hmac_sha256_hex(&secret_signing, string_to_sign.as_bytes())?;

        Ok(format!(
            "TC3-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            credentials.api_key.trim(),
            scope,
            signed_headers,
            signature
        ))
    }

    /// Extract the translation from a response body
    pub fn parse_response(body: &str) -> Result<String, ProviderError> {
        let response: TencentResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::Transient(format!("failed to parse Tencent response: {}", e)))?;

        if let Some(err) = response.response.error {
            let message = format!("{}: {}", err.code, err.message);
            return Err(classify_error_code(&err.code, message));
        }

        response
            .response
            .target_text
            .ok_or_else(|| ProviderError::Transient("Tencent response carried no TargetText".into()))
    }
}

/// Map a Tencent Cloud error code to a failure class
fn classify_error_code(code: &str, message: String) -> ProviderError {
    if code.starts_with("AuthFailure") {
        ProviderError::Config(message)
    } else if code.starts_with("RequestLimitExceeded")
        || code.starts_with("InternalError")
        || code.starts_with("FailedOperation.RequestAiLabErr")
    {
        ProviderError::Transient(message)
    } else {
        ProviderError::Fatal(message)
    }
}

#[async_trait]
impl Provider for Tencent {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Tencent
    }

    fn max_texts_per_request(&self) -> usize {
        1
    }

    async fn translate(
        &self,
        texts: &[String],
        target: &str,
        source: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ProviderError> {
        credentials.require(ProviderKind::Tencent)?;
        let text = match texts {
            [] => return Ok(Vec::new()),
            [text] => text,
            _ => {
                return Err(ProviderError::Fatal(format!(
                    "TextTranslate accepts one text per request, got {}",
                    texts.len()
                )));
            }
        };

        let request = TencentRequest {
            source_text: text,
            source: map_language_code(ProviderKind::Tencent, source),
            target: map_language_code(ProviderKind::Tencent, target),
            project_id: 0,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| ProviderError::Fatal(format!("failed to serialize request: {}", e)))?;

        let host = credentials.endpoint_or(DEFAULT_HOST);
        let now = Utc::now();
        let authorization = Self::authorization(credentials, host, &body, now)?;

        debug!(
            "Tencent request: {} chars, {} -> {}",
            text.chars().count(),
            request.source,
            request.target
        );

        let response = self
            .client
            .post(format!("https://{}", host))
            .header("Authorization", authorization)
            .header("Content-Type", CONTENT_TYPE)
            .header("Host", host)
            .header("X-TC-Action", ACTION)
            .header("X-TC-Timestamp", now.timestamp().to_string())
            .header("X-TC-Version", VERSION)
            .header("X-TC-Region", credentials.region_or(DEFAULT_REGION))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Tencent API error ({}): {}", status, body);
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        let translated = Self::parse_response(&body)?;
        ensure_count(texts.len(), vec![translated])
    }
}
