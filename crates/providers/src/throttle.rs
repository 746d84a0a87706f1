//! Per-adapter token bucket rate limiting.
//!
//! Each adapter owns one [`RateLimiter`] and calls [`RateLimiter::acquire`]
//! before every outbound request. Buckets refill continuously at the
//! configured rate and allow short bursts up to capacity. Limiters are
//! independent of each other; adapters target independent remote services,
//! so no cross-adapter coordination exists.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Default sustained rate: 60 requests per minute.
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Default burst capacity.
const DEFAULT_BURST_CAPACITY: f64 = 5.0;

/// Rate limit settings for one adapter.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Maximum sustained requests per minute.
    pub requests_per_minute: u32,
    /// Maximum burst capacity in tokens.
    pub burst_capacity: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            burst_capacity: DEFAULT_BURST_CAPACITY,
        }
    }
}

/// Token bucket state.
#[derive(Debug)]
struct Bucket {
    /// Currently available tokens.
    tokens: f64,
    /// Last refill instant.
    refilled_at: Instant,
}

/// Token bucket rate limiter for a single adapter.
///
/// Thread-safe; one instance is shared by all calls the adapter makes.
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    /// Refill rate in tokens per second.
    rate: f64,
    /// Bucket capacity.
    capacity: f64,
}

impl RateLimiter {
    /// Create a rate limiter with the given settings.
    pub fn new(config: RateLimitConfig) -> Self {
        let capacity = config.burst_capacity.max(1.0);
        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                refilled_at: Instant::now(),
            }),
            rate: f64::from(config.requests_per_minute) / 60.0,
            capacity,
        }
    }

    /// Lock the bucket, recovering from poison if necessary.
    ///
    /// The worst case of recovering is slightly inaccurate throttling,
    /// which beats panicking mid-run.
    fn lock_bucket(&self) -> MutexGuard<'_, Bucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Refill tokens for the elapsed time and return the updated guard.
    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
        bucket.refilled_at = now;
    }

    /// Acquire one token, waiting (asynchronously) until one is available.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.lock_bucket();
                self.refill(&mut bucket);

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }

                let needed = 1.0 - bucket.tokens;
                Duration::from_secs_f64(needed / self.rate)
            };

            debug!("Rate limiter: waiting {:?} for next token", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Try to acquire one token without waiting.
    ///
    /// Returns true if a token was available.
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.lock_bucket();
        self.refill(&mut bucket);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Remaining tokens right now.
    pub fn remaining_tokens(&self) -> f64 {
        let mut bucket = self.lock_bucket();
        self.refill(&mut bucket);
        bucket.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_exhaustion() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 3.0,
        });

        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_refill_over_time() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60, // 1 token/second
            burst_capacity: 1.0,
        });

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        // Simulate two seconds of elapsed time.
        {
            let mut bucket = limiter.lock_bucket();
            bucket.refilled_at = Instant::now() - Duration::from_secs(2);
        }

        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_refill_caps_at_capacity() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 6000,
            burst_capacity: 2.0,
        });

        {
            let mut bucket = limiter.lock_bucket();
            bucket.refilled_at = Instant::now() - Duration::from_secs(60);
        }

        assert!((limiter.remaining_tokens() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_limiters_are_independent() {
        let a = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 1.0,
        });
        let b = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 1.0,
        });

        assert!(a.try_acquire());
        assert!(!a.try_acquire());
        assert!(b.try_acquire());
    }

    #[tokio::test]
    async fn test_async_acquire_waits() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 6000, // 100/second for a fast test
            burst_capacity: 2.0,
        });

        limiter.acquire().await;
        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        let elapsed = start.elapsed();

        // With 100 req/sec the third token takes ~10ms.
        assert!(elapsed.as_millis() >= 5);
    }
}
