use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::signing::{canonical_query, hmac_sha1_base64, percent_encode};
use super::{Credentials, Provider, ensure_count, http_client};
use crate::app_config::ProviderKind;
use crate::errors::ProviderError;
use crate::language_utils::map_language_code;

const DEFAULT_REGION: &str = "cn-hangzhou";
const ACTION: &str = "TranslateGeneral";
const VERSION: &str = "2018-10-12";

/// Aliyun machine translation client
///
/// TranslateGeneral accepts a single text, so every request carries one.
#[derive(Debug)]
pub struct Aliyun {
    /// HTTP client for API requests
    client: Client,
}

/// TranslateGeneral response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AliyunResponse {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<AliyunData>,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AliyunData {
    pub translated: String,
}

impl Aliyun {
    /// Create a new Aliyun client
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
        }
    }

    /// Signed form body for a TranslateGeneral call
    pub fn signed_form(
        credentials: &Credentials,
        text: &str,
        target: &str,
        source: &str,
        nonce: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ProviderError> {
        let timestamp = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let params = [
            ("AccessKeyId", credentials.api_key.trim()),
            ("Action", ACTION),
            ("Format", "JSON"),
            ("FormatType", "text"),
            ("Scene", "general"),
            ("SignatureMethod", "HMAC-SHA1"),
            ("SignatureNonce", nonce),
            ("SignatureVersion", "1.0"),
            ("SourceLanguage", source),
            ("SourceText", text),
            ("TargetLanguage", target),
            ("Timestamp", timestamp.as_str()),
            ("Version", VERSION),
        ];

        let query = canonical_query(&params);
        let string_to_sign = format!("POST&{}&{}", percent_encode("/"), percent_encode(&query));
        let key = format!("{}&", credentials.api_secret.trim());
        let signature = hmac_sha1_base64(key.as_bytes(), string_to_sign.as_bytes())?;

        Ok(format!("Signature={}&{}", percent_encode(&signature), query))
    }

    /// Extract the translation from a response body
    pub fn parse_response(body: &str) -> Result<String, ProviderError> {
        let response: AliyunResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::Transient(format!("failed to parse Aliyun response: {}", e)))?;

        let code = match &response.code {
            Some(serde_json::Value::String(code)) => code.clone(),
            Some(serde_json::Value::Number(code)) => code.to_string(),
            _ => String::new(),
        };

        match response.data {
            Some(data) if code.is_empty() || code == "200" => Ok(data.translated),
            _ => {
                let message = format!(
                    "{}: {}",
                    code,
                    response.message.unwrap_or_else(|| "unknown error".to_string())
                );
                Err(classify_error_code(&code, message))
            }
        }
    }
}

/// Map an Aliyun error code to a failure class
fn classify_error_code(code: &str, message: String) -> ProviderError {
    if code.starts_with("Throttling") || code.starts_with("ServiceUnavailable") || code.starts_with("InternalError") {
        ProviderError::Transient(message)
    } else if code.starts_with("InvalidAccessKeyId") || code.starts_with("SignatureDoesNotMatch") || code.starts_with("Forbidden") {
        ProviderError::Config(message)
    } else {
        ProviderError::Fatal(message)
    }
}

#[async_trait]
impl Provider for Aliyun {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Aliyun
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
        credentials.require(ProviderKind::Aliyun)?;
        let text = match texts {
            [] => return Ok(Vec::new()),
            [text] => text,
            _ => {
                return Err(ProviderError::Fatal(format!(
                    "TranslateGeneral accepts one text per request, got {}",
                    texts.len()
                )));
            }
        };

        let target = map_language_code(ProviderKind::Aliyun, target);
        let source = map_language_code(ProviderKind::Aliyun, source);
        let nonce = uuid::Uuid::new_v4().to_string();
        let form = Self::signed_form(credentials, text, &target, &source, &nonce, Utc::now())?;

        let region = credentials.region_or(DEFAULT_REGION);
        let default_host = format!("mt.{}.aliyuncs.com", region);
        let host = credentials.endpoint_or(&default_host);

        debug!("Aliyun request: {} chars, {} -> {}", text.chars().count(), source, target);

        let response = self
            .client
            .post(format!("https://{}/", host))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Aliyun API error ({}): {}", status, body);
            if status.is_client_error() {
                if let Err(err) = Self::parse_response(&body) {
                    if !matches!(err, ProviderError::Transient(_)) || status.as_u16() == 429 {
                        return Err(err);
                    }
                }
            }
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        let translated = Self::parse_response(&body)?;
        ensure_count(texts.len(), vec![translated])
    }
}
