/*!
 * Tests for application configuration functionality
 */

use std::collections::HashMap;
use subtrans::app_config::{Config, LogLevel, ProviderConfig, ProviderKind};
use subtrans::subtitle_processor::{OutputMode, TranslationPosition};

/// Test default configuration values
#[test]
fn test_default_config_should_have_all_providers_and_google_active() {
    let config = Config::default();

    assert_eq!(config.provider, ProviderKind::Google);
    assert_eq!(config.target_language, "en");
    assert!(config.source_language.is_empty());
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.output.mode, OutputMode::TranslationOnly);
    assert_eq!(config.output.position, TranslationPosition::Below);

    for kind in ProviderKind::ALL {
        let provider = config.provider_config(kind);
        assert_eq!(provider.provider_type, kind);
        assert_eq!(provider.timeout_secs, 30);
    }
}

/// Test parsing a configuration file
#[test]
fn test_from_json_should_read_provider_blocks_and_output() {
    let json = r#"{
        "source_language": "ja",
        "target_language": "zh-CN",
        "provider": "tencent",
        "providers": [
            { "type": "tencent", "api_key": "id", "api_secret": "key", "region": "ap-shanghai",
              "requests_per_second": 3 }
        ],
        "output": { "mode": "original_and_translation", "position": "above" },
        "log_level": "debug"
    }"#;

    let config = Config::from_json(json).unwrap();
    assert_eq!(config.provider, ProviderKind::Tencent);
    assert_eq!(config.output.mode, OutputMode::OriginalAndTranslation);
    assert_eq!(config.output.position, TranslationPosition::Above);
    assert_eq!(config.log_level, LogLevel::Debug);

    let credentials = config.credentials();
    assert_eq!(credentials.api_key, "id");
    assert_eq!(credentials.api_secret, "key");
    assert_eq!(credentials.region, "ap-shanghai");

    let profile = config.profile();
    assert_eq!(profile.requests_per_second, 3);
    assert_eq!(profile.merge_budget_chars, 4500);
    assert!(config.validate().is_ok());
}

/// Test that missing provider blocks fall back to defaults
#[test]
fn test_provider_config_missing_block_should_use_defaults() {
    let config = Config::from_json(r#"{ "target_language": "fr", "providers": [] }"#).unwrap();
    let aliyun = config.provider_config(ProviderKind::Aliyun);
    assert!(aliyun.api_key.is_empty());
    assert_eq!(aliyun.profile().requests_per_second, 50);
}

/// Test configuration validation
#[test]
fn test_validate_should_check_languages_and_credentials() {
    let mut config = Config::default();
    config.apply_overrides_from(|name| (name == "GOOGLE_API_KEY").then(|| "key".to_string()));
    assert!(config.validate().is_ok());

    config.target_language = "zz".to_string();
    assert!(config.validate().is_err());
    config.target_language = "fr".to_string();

    config.source_language = "auto".to_string();
    assert!(config.validate().is_ok());

    config.provider = ProviderKind::Volcengine;
    assert!(config.validate().is_err());
}

/// Test that a broken profile override is rejected
#[test]
fn test_validate_should_reject_chunk_larger_than_request_limit() {
    let mut provider = ProviderConfig::new(ProviderKind::Google);
    provider.api_key = "key".to_string();
    provider.split_chunk_chars = Some(6000);
    let config = Config {
        target_language: "fr".to_string(),
        providers: vec![provider],
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

/// Test environment overrides for regions and endpoints
#[test]
fn test_overrides_should_set_region_and_endpoint() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("VOLCENGINE_REGION", "ap-southeast-1"),
        ("GOOGLE_TRANSLATE_URL", "http://localhost:9000/translate"),
    ]);
    let mut config = Config::default();
    config.apply_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

    assert_eq!(config.provider_config(ProviderKind::Volcengine).region, "ap-southeast-1");
    assert_eq!(
        config.provider_config(ProviderKind::Google).endpoint,
        "http://localhost:9000/translate"
    );
}

/// Test that a default configuration survives a round trip through JSON
#[test]
fn test_default_config_json_should_parse_back() {
    let json = serde_json::to_string_pretty(&Config::default()).unwrap();
    let parsed = Config::from_json(&json).unwrap();
    assert_eq!(parsed.providers.len(), ProviderKind::ALL.len());
    assert_eq!(parsed.target_language, "en");
}
