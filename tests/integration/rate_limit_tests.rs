/*!
 * Integration tests for request pacing
 */

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use subtrans::app_config::ProviderKind;
use subtrans::errors::TranslationError;
use subtrans::providers::Credentials;
use subtrans::providers::mock::MockProvider;
use subtrans::translation::RateLimiter;

use crate::common::{profile_with, segments, service_for};

/// No window of `period` may hold more than `limit` of the sorted `times`
fn assert_window(times: &[Instant], limit: usize, period: Duration) {
    for (i, start) in times.iter().enumerate() {
        let in_window = times[i..].iter().take_while(|t| **t - *start < period).count();
        assert!(
            in_window <= limit,
            "{} calls within {:?} starting at call {}",
            in_window,
            period,
            i
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_two_rps_should_allow_at_most_two_calls_per_second() {
    let provider = MockProvider::echo();
    let profile = profile_with(ProviderKind::Google, |p| {
        p.requests_per_second = 2;
        p.batch_size = 1;
        p.max_concurrent_batches = 10;
    });
    let start = Instant::now();

    service_for(&provider, profile)
        .translate(&segments(10), "fr", "en", &Credentials::with_key("key"))
        .await
        .unwrap();

    let times = provider.call_times();
    assert_eq!(times.len(), 10);
    assert_window(&times, 2, Duration::from_secs(1));
    // two immediately, then two per second for the remaining eight
    assert!(start.elapsed() >= Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_limiter_shared_by_two_services_should_pace_them_together() {
    let limiter = Arc::new(RateLimiter::per_second(3));
    let first = MockProvider::echo();
    let second = MockProvider::echo();
    let profile = profile_with(ProviderKind::Google, |p| p.batch_size = 1);
    let credentials = Credentials::with_key("key");

    let service_a = service_for(&first, profile).with_rate_limiter(limiter.clone());
    let service_b = service_for(&second, profile).with_rate_limiter(limiter.clone());
    let input = segments(6);

    let (a, b) = tokio::join!(
        service_a.translate(&input, "fr", "en", &credentials),
        service_b.translate(&input, "de", "en", &credentials)
    );
    assert!(a.is_ok() && b.is_ok());

    let mut times = first.call_times();
    times.extend(second.call_times());
    times.sort();
    assert_eq!(times.len(), 12);
    assert_window(&times, 3, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_acquire_should_wait_for_oldest_token_to_return() {
    let limiter = RateLimiter::new(2, Duration::from_millis(500));
    let cancel = CancellationToken::new();
    let start = Instant::now();

    limiter.acquire(&cancel).await.unwrap();
    limiter.acquire(&cancel).await.unwrap();
    assert_eq!(limiter.available(), 0);

    limiter.acquire(&cancel).await.unwrap();
    let waited = start.elapsed();
    assert!(waited >= Duration::from_millis(500) && waited < Duration::from_millis(600));
    assert_eq!(limiter.capacity(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_should_release_a_waiting_acquirer() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    let cancel = CancellationToken::new();
    limiter.acquire(&cancel).await.unwrap();

    let (result, _) = tokio::join!(limiter.acquire(&cancel), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    });

    assert!(matches!(result, Err(TranslationError::Cancelled)));
}

#[test]
fn test_shared_limiter_should_be_reused_per_provider_whatever_the_rate() {
    let a = RateLimiter::shared(ProviderKind::Volcengine, 7);
    let b = RateLimiter::shared(ProviderKind::Volcengine, 3);
    let c = RateLimiter::shared(ProviderKind::Aliyun, 7);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
}
