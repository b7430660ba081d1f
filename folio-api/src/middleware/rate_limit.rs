/// Global rate limiting middleware
///
/// One token bucket is shared by every request the process serves; there is
/// no per-client partitioning. The bucket is built from config at startup
/// and injected through `AppState`, guarded by a `Mutex`.
///
/// # Algorithm
///
/// Token bucket:
/// - Tokens refill at a constant rate up to the burst capacity
/// - Each request consumes 1 token
/// - Request rejected with 429 and `Retry-After` if the bucket is empty
///
/// # Example
///
/// ```
/// use folio_api::middleware::rate_limit::RateLimiter;
///
/// let limiter = RateLimiter::new(50.0, 100);
/// assert!(limiter.try_acquire().is_ok());
/// ```

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Token bucket state
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Current number of tokens
    tokens: f64,

    /// Last refill timestamp (Unix seconds)
    last_refill: u64,
}

impl TokenBucket {
    /// Creates a new full bucket
    fn new(capacity: u32) -> Self {
        TokenBucket {
            tokens: capacity as f64,
            last_refill: unix_now(),
        }
    }

    /// Refills tokens based on elapsed time
    fn refill(&mut self, rate: f64, capacity: u32) {
        let now = unix_now();
        let elapsed_secs = now.saturating_sub(self.last_refill) as f64;
        let new_tokens = elapsed_secs * rate;

        self.tokens = (self.tokens + new_tokens).min(capacity as f64);
        self.last_refill = now;
    }

    /// Attempts to consume N tokens
    fn try_consume(&mut self, count: f64) -> bool {
        if self.tokens >= count {
            self.tokens -= count;
            true
        } else {
            false
        }
    }

    /// Calculates seconds until N tokens available
    fn seconds_until_available(&self, count: f64, rate: f64) -> u64 {
        let deficit = count - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            (deficit / rate).ceil() as u64
        }
    }
}

/// Process-wide rate limiter
///
/// Thread-safe wrapper around one token bucket.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
    rate: f64,
    capacity: u32,
}

impl RateLimiter {
    pub fn new(rate: f64, capacity: u32) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(capacity)),
            rate,
            capacity,
        }
    }

    /// Takes one token, or reports how long until one is available
    ///
    /// # Errors
    ///
    /// Returns the number of seconds to wait when the bucket is empty.
    pub fn try_acquire(&self) -> Result<(), u64> {
        let mut bucket = match self.bucket.lock() {
            Ok(bucket) => bucket,
            // A poisoned lock only means another thread panicked mid-update;
            // the bucket state is still usable.
            Err(poisoned) => poisoned.into_inner(),
        };

        bucket.refill(self.rate, self.capacity);

        if bucket.try_consume(1.0) {
            Ok(())
        } else {
            Err(bucket.seconds_until_available(1.0, self.rate).max(1))
        }
    }
}

/// Rate limiting middleware layer
///
/// Checks the shared bucket before processing requests. Returns 429 with a
/// `Retry-After` header when the limit is exceeded.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(retry_after) = state.limiter.try_acquire() {
        tracing::warn!(retry_after, "Request rejected by rate limiter");
        return Err(ApiError::RateLimitExceeded {
            retry_after,
            message: format!("Too many requests. Try again in {} seconds", retry_after),
        });
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bucket_new() {
        let bucket = TokenBucket::new(100);
        assert_eq!(bucket.tokens, 100.0);
        assert!(bucket.last_refill > 0);
    }

    #[test]
    fn test_token_bucket_consume() {
        let mut bucket = TokenBucket::new(10);
        assert!(bucket.try_consume(1.0));
        assert_eq!(bucket.tokens, 9.0);
        assert!(bucket.try_consume(5.0));
        assert_eq!(bucket.tokens, 4.0);
        assert!(!bucket.try_consume(10.0));
        assert_eq!(bucket.tokens, 4.0); // Unchanged after failed attempt
    }

    #[test]
    fn test_token_bucket_refill() {
        let mut bucket = TokenBucket {
            tokens: 5.0,
            last_refill: unix_now() - 10, // 10 seconds ago
        };

        // Refill at 1 token/sec for 10 seconds = 10 tokens
        bucket.refill(1.0, 100);
        assert!((bucket.tokens - 15.0).abs() < 0.1);
    }

    #[test]
    fn test_token_bucket_refill_capped() {
        let mut bucket = TokenBucket {
            tokens: 95.0,
            last_refill: unix_now() - 10, // 10 seconds ago
        };

        // Refill at 1 token/sec for 10 seconds, but capped at capacity
        bucket.refill(1.0, 100);
        assert_eq!(bucket.tokens, 100.0); // Capped at capacity
    }

    #[test]
    fn test_token_bucket_seconds_until_available() {
        let bucket = TokenBucket {
            tokens: 2.0,
            last_refill: unix_now(),
        };

        // Need 5 tokens, have 2, rate is 1/sec -> need 3 seconds
        assert_eq!(bucket.seconds_until_available(5.0, 1.0), 3);

        // Already have enough
        assert_eq!(bucket.seconds_until_available(1.0, 1.0), 0);
    }

    #[test]
    fn test_limiter_allows_within_burst() {
        let limiter = RateLimiter::new(1.0, 5);
        for _ in 0..5 {
            assert!(limiter.try_acquire().is_ok());
        }
    }

    #[test]
    fn test_limiter_rejects_when_empty() {
        let limiter = RateLimiter::new(1.0, 1);
        assert!(limiter.try_acquire().is_ok());

        let retry_after = limiter.try_acquire().expect_err("Bucket should be empty");
        assert!(retry_after >= 1);
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let limiter = RateLimiter::new(1.0, 0);
        assert!(limiter.try_acquire().is_err());
    }
}
