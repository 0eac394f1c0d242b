//! Per client IP token bucket.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::warn;

use crate::config::RateConfig;
use crate::error::GatewayError;
use crate::observability::metrics;

/// Buckets idle for this many refill periods are swept.
const IDLE_PERIODS: u32 = 10;

struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// `capacity` tokens per client, one restored every `every`.
pub struct RateLimiter {
    buckets: DashMap<String, TokenBucket>,
    capacity: f64,
    every: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity: f64::from(config.capacity()),
            every: config.every(),
        }
    }

    fn refill_rate(&self) -> f64 {
        let secs = self.every.as_secs_f64();
        if secs > 0.0 {
            1.0 / secs
        } else {
            f64::INFINITY
        }
    }

    /// Take one token for `client`.
    pub fn check(&self, client: &str) -> Result<(), GatewayError> {
        let now = Instant::now();
        let allowed = self
            .buckets
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::new(self.capacity, now))
            .try_acquire(self.capacity, self.refill_rate(), now);

        if allowed {
            Ok(())
        } else {
            warn!(client = %client, "rate limit exceeded");
            metrics::record_rate_limited("rate");
            Err(GatewayError::RateLimited(client.to_string()))
        }
    }

    /// How long a bucket may sit unused before `sweep` drops it.
    pub fn idle_timeout(&self) -> Duration {
        self.every.saturating_mul(IDLE_PERIODS)
    }

    /// Drop idle buckets. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let idle = self.idle_timeout();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_update) < idle);
        before.saturating_sub(self.buckets.len())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(capacity: u32, every: Duration) -> RateLimiter {
        RateLimiter::new(&RateConfig {
            capacity: Some(capacity),
            every: Some(every),
        })
    }

    #[test]
    fn test_capacity_is_per_client() {
        let limiter = limiter(2, Duration::from_secs(3600));
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert_eq!(
            limiter.check("10.0.0.1"),
            Err(GatewayError::RateLimited("10.0.0.1".into()))
        );
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_refill() {
        let limiter = limiter(1, Duration::from_millis(20));
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_err());
        std::thread::sleep(Duration::from_millis(40));
        assert!(limiter.check("a").is_ok());
    }

    #[test]
    fn test_sweep_drops_idle_buckets() {
        let limiter = limiter(1, Duration::from_millis(1));
        limiter.check("a").ok();
        assert_eq!(limiter.len(), 1);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(limiter.sweep(), 1);
        assert!(limiter.is_empty());
    }
}
