use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::providers::Credentials;
use crate::subtitle_processor::{OutputMode, TranslationPosition};
use crate::translation::ProviderProfile;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and environment overrides.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code; empty or "auto" requests detection
    #[serde(default)]
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// Translation provider to use
    #[serde(default)]
    pub provider: ProviderKind,

    /// Per-provider settings
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    /// Output layout of translated subtitles
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Google,
    Volcengine,
    Aliyun,
    Tencent,
}

impl ProviderKind {
    /// All supported providers
    pub const ALL: [ProviderKind; 4] = [Self::Google, Self::Volcengine, Self::Aliyun, Self::Tencent];

    /// Human readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google Translate",
            Self::Volcengine => "Volcengine",
            Self::Aliyun => "Aliyun Machine Translation",
            Self::Tencent => "Tencent Machine Translation",
        }
    }

    /// Lowercase provider identifier used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Volcengine => "volcengine",
            Self::Aliyun => "aliyun",
            Self::Tencent => "tencent",
        }
    }

    /// Whether the provider needs a secret in addition to the key
    pub fn requires_secret(&self) -> bool {
        !matches!(self, Self::Google)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "volcengine" => Ok(Self::Volcengine),
            "aliyun" => Ok(Self::Aliyun),
            "tencent" => Ok(Self::Tencent),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Settings for one provider
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    /// Provider this block configures
    #[serde(rename = "type")]
    pub provider_type: ProviderKind,

    /// API key, access key id or secret id
    #[serde(default)]
    pub api_key: String,

    /// Access key secret or secret key
    #[serde(default)]
    pub api_secret: String,

    /// Service URL override
    #[serde(default)]
    pub endpoint: String,

    /// Provider region override
    #[serde(default)]
    pub region: String,

    /// Timeout for a single request in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Characters above which a segment is split
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_single_request_chars: Option<usize>,

    /// Size of the chunks an oversized segment is split into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_chunk_chars: Option<usize>,

    /// Character budget of a merged request (0 disables merging)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_budget_chars: Option<usize>,

    /// Outbound requests allowed per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,

    /// Units of work allowed in flight at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_batches: Option<usize>,

    /// Segments per batch request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

impl ProviderConfig {
    /// Provider config with defaults and no credentials
    pub fn new(provider_type: ProviderKind) -> Self {
        Self {
            provider_type,
            timeout_secs: default_timeout_secs(),
            ..Default::default()
        }
    }

    /// Built-in profile for the provider with this block's overrides applied
    pub fn profile(&self) -> ProviderProfile {
        let mut profile = ProviderProfile::for_provider(self.provider_type);
        if let Some(value) = self.max_single_request_chars {
            profile.max_single_request_chars = value;
        }
        if let Some(value) = self.split_chunk_chars {
            profile.split_chunk_chars = value;
        }
        if let Some(value) = self.merge_budget_chars {
            profile.merge_budget_chars = value;
        }
        if let Some(value) = self.requests_per_second {
            profile.requests_per_second = value;
        }
        if let Some(value) = self.max_concurrent_batches {
            profile.max_concurrent_batches = value;
        }
        if let Some(value) = self.batch_size {
            profile.batch_size = value;
        }
        profile
    }

    /// Request-scoped credentials for this provider
    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
        }
    }
}

/// How translated subtitles are laid out
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// Translation only, or original and translation together
    #[serde(default)]
    pub mode: OutputMode,

    /// Where the translation goes in bilingual mode
    #[serde(default)]
    pub position: TranslationPosition,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the log facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_providers() -> Vec<ProviderConfig> {
    ProviderKind::ALL.iter().map(|kind| ProviderConfig::new(*kind)).collect()
}

/// Environment variables consulted at load time, per provider field
const ENV_OVERRIDES: &[(&str, ProviderKind, EnvField)] = &[
    ("GOOGLE_API_KEY", ProviderKind::Google, EnvField::Key),
    ("GOOGLE_TRANSLATE_URL", ProviderKind::Google, EnvField::Endpoint),
    ("VOLCENGINE_ACCESS_KEY", ProviderKind::Volcengine, EnvField::Key),
    ("VOLCENGINE_SECRET_KEY", ProviderKind::Volcengine, EnvField::Secret),
    ("VOLCENGINE_REGION", ProviderKind::Volcengine, EnvField::Region),
    ("ALIYUN_ACCESS_KEY_ID", ProviderKind::Aliyun, EnvField::Key),
    ("ALIYUN_ACCESS_KEY_SECRET", ProviderKind::Aliyun, EnvField::Secret),
    ("ALIYUN_REGION", ProviderKind::Aliyun, EnvField::Region),
    ("TENCENT_SECRET_ID", ProviderKind::Tencent, EnvField::Key),
    ("TENCENT_SECRET_KEY", ProviderKind::Tencent, EnvField::Secret),
    ("TENCENT_REGION", ProviderKind::Tencent, EnvField::Region),
];

#[derive(Debug, Clone, Copy)]
enum EnvField {
    Key,
    Secret,
    Endpoint,
    Region,
}

impl Config {
    /// Parse a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, kind, field) in ENV_OVERRIDES {
            let Some(value) = lookup(*name).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            let provider = self.provider_config_mut(*kind);
            match field {
                EnvField::Key => provider.api_key = value,
                EnvField::Secret => provider.api_secret = value,
                EnvField::Endpoint => provider.endpoint = value,
                EnvField::Region => provider.region = value,
            }
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.target_language)?;
        crate::language_utils::validate_source_language(&self.source_language)?;

        self.active_provider_config().credentials().require(self.provider)?;

        self.profile()
            .validate()
            .map_err(|e| anyhow!("{}", e))?;

        Ok(())
    }

    /// Settings of the active provider, falling back to defaults
    pub fn active_provider_config(&self) -> ProviderConfig {
        self.provider_config(self.provider)
    }

    /// Settings of a specific provider, falling back to defaults
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        self.providers
            .iter()
            .find(|p| p.provider_type == kind)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(kind))
    }

    fn provider_config_mut(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
        if let Some(pos) = self.providers.iter().position(|p| p.provider_type == kind) {
            &mut self.providers[pos]
        } else {
            self.providers.push(ProviderConfig::new(kind));
            let last = self.providers.len() - 1;
            &mut self.providers[last]
        }
    }

    /// Request-scoped credentials of the active provider
    pub fn credentials(&self) -> Credentials {
        self.active_provider_config().credentials()
    }

    /// Profile of the active provider with overrides applied
    pub fn profile(&self) -> ProviderProfile {
        self.active_provider_config().profile()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: String::new(),
            target_language: "en".to_string(),
            provider: ProviderKind::default(),
            providers: default_providers(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
