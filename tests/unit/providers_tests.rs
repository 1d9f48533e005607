/*!
 * Tests for provider adapters
 */

use std::time::Duration;

use subtrans::app_config::ProviderKind;
use subtrans::errors::ProviderError;
use subtrans::providers::signing::{canonical_query, percent_encode, sha256_hex};
use subtrans::providers::{Credentials, create_provider, ensure_count};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_create_provider_should_build_each_kind() {
    for kind in ProviderKind::ALL {
        let provider = create_provider(kind, Duration::from_secs(5));
        assert_eq!(provider.kind(), kind);
    }
}

#[test]
fn test_single_text_providers_should_declare_limit() {
    let limits: Vec<(ProviderKind, usize)> = ProviderKind::ALL
        .iter()
        .map(|kind| (*kind, create_provider(*kind, Duration::from_secs(5)).max_texts_per_request()))
        .collect();
    assert_eq!(
        limits,
        vec![
            (ProviderKind::Google, usize::MAX),
            (ProviderKind::Volcengine, usize::MAX),
            (ProviderKind::Aliyun, 1),
            (ProviderKind::Tencent, 1),
        ]
    );
}

#[tokio::test]
async fn test_adapters_without_credentials_should_fail_before_any_request() {
    for kind in ProviderKind::ALL {
        let provider = create_provider(kind, Duration::from_secs(5));
        let result = provider
            .translate(&texts(&["hello"]), "fr", "auto", &Credentials::default())
            .await;
        assert!(
            matches!(result, Err(ProviderError::Config(_))),
            "{} should reject missing credentials",
            kind
        );
    }
}

#[tokio::test]
async fn test_signed_adapters_without_secret_should_fail() {
    let provider = create_provider(ProviderKind::Volcengine, Duration::from_secs(5));
    let result = provider
        .translate(&texts(&["hello"]), "fr", "en", &Credentials::with_key("only-key"))
        .await;
    assert!(matches!(result, Err(ProviderError::Config(_))));
}

#[tokio::test]
async fn test_tencent_should_reject_multiple_texts() {
    let provider = create_provider(ProviderKind::Tencent, Duration::from_secs(5));
    let result = provider
        .translate(&texts(&["a", "b"]), "fr", "en", &Credentials::with_key_and_secret("id", "key"))
        .await;
    assert!(matches!(result, Err(ProviderError::Fatal(_))));
}

#[tokio::test]
async fn test_google_unreachable_endpoint_should_be_transient() {
    let provider = create_provider(ProviderKind::Google, Duration::from_secs(5));
    let mut credentials = Credentials::with_key("key");
    credentials.endpoint = "http://127.0.0.1:9/language/translate/v2".to_string();

    let result = provider.translate(&texts(&["hello"]), "fr", "", &credentials).await;
    assert!(matches!(result, Err(ProviderError::Transient(_))));
}

#[test]
fn test_ensure_count_should_pass_matching_results_through() {
    assert_eq!(ensure_count(2, texts(&["a", "b"])).unwrap(), texts(&["a", "b"]));
    assert_eq!(
        ensure_count(3, texts(&["a"])),
        Err(ProviderError::Mismatch { expected: 3, actual: 1 })
    );
}

#[test]
fn test_canonical_query_should_sort_and_encode() {
    let query = canonical_query(&[("b", "x y"), ("a", "1/2"), ("SourceText", "你好")]);
    assert_eq!(query, "SourceText=%E4%BD%A0%E5%A5%BD&a=1%2F2&b=x%20y");
    assert_eq!(percent_encode("a-b_c.d~e*"), "a-b_c.d~e%2A");
}

#[test]
fn test_sha256_hex_of_empty_payload_should_match_known_digest() {
    assert_eq!(
        sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}
