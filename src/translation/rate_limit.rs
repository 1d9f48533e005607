/*!
 * Per-provider request rate limiting.
 *
 * The limiter holds `capacity` tokens. Acquiring spends one, and every spent
 * token comes back exactly one `period` after it was taken, so no window of
 * length `period` ever sees more than `capacity` grants. Waiters sleep until
 * the oldest outstanding token returns or until their cancellation token
 * fires.
 */

use log::trace;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::app_config::ProviderKind;
use crate::errors::TranslationError;

/// Process-wide limiters, one per provider
static SHARED_LIMITERS: Lazy<Mutex<HashMap<ProviderKind, Arc<RateLimiter>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Sliding window bounding outbound requests per period
///
/// Up to `capacity` grants happen at once, then the next ones wait for the
/// oldest grant to fall out of the window, so requests go out in bursts.
#[derive(Debug)]
pub struct RateLimiter {
    /// Tokens available per period
    capacity: usize,
    /// Time after which a spent token is returned
    period: Duration,
    /// Grant times of the tokens currently spent, oldest first
    spent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter granting `capacity` tokens per `period`
    pub fn new(capacity: u32, period: Duration) -> Self {
        let capacity = capacity.max(1) as usize;
        Self {
            capacity,
            period,
            spent: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Create a limiter granting `requests_per_second` tokens per second
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, Duration::from_secs(1))
    }

    /// The limiter shared by every caller of `kind` in this process
    ///
    /// The first caller's rate sets the capacity; later rates for the same
    /// provider are ignored.
    pub fn shared(kind: ProviderKind, requests_per_second: u32) -> Arc<Self> {
        SHARED_LIMITERS
            .lock()
            .entry(kind)
            .or_insert_with(|| Arc::new(Self::per_second(requests_per_second)))
            .clone()
    }

    /// Tokens per period
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens that could be granted right now
    pub fn available(&self) -> usize {
        let mut spent = self.spent.lock();
        self.release_expired(&mut spent, Instant::now());
        self.capacity - spent.len()
    }

    /// Wait for a token
    ///
    /// # Returns
    /// * `Err(TranslationError::Cancelled)` - if `cancel` fires first
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), TranslationError> {
        loop {
            if cancel.is_cancelled() {
                return Err(TranslationError::Cancelled);
            }

            let wake_at = {
                let mut spent = self.spent.lock();
                let now = Instant::now();
                self.release_expired(&mut spent, now);

                if spent.len() < self.capacity {
                    spent.push_back(now);
                    return Ok(());
                }
                match spent.front() {
                    Some(oldest) => *oldest + self.period,
                    None => now,
                }
            };

            trace!("Rate limit reached, waiting {:?}", wake_at - Instant::now());

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TranslationError::Cancelled),
                _ = sleep_until(wake_at) => {}
            }
        }
    }

    fn release_expired(&self, spent: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = spent.front() {
            if now.duration_since(*oldest) >= self.period {
                spent.pop_front();
            } else {
                break;
            }
        }
    }
}
