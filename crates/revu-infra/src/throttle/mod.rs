//! Per-client request throttling using the governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};

use revu_core::ports::{RequestThrottle, ThrottleError, ThrottleResult};

/// Idle client states are pruned once this many are tracked.
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Throttle configuration.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Maximum requests per window and client.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
        }
    }
}

impl ThrottleConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("THROTTLE_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: std::env::var("THROTTLE_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }
}

/// Keyed GCRA throttle held in process memory.
///
/// Note: limits are per-process, not distributed across instances. The
/// durable per-device quotas live in the rate-limit ledger.
pub struct GovernorThrottle {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl GovernorThrottle {
    pub fn new(config: ThrottleConfig) -> Result<Self, ThrottleError> {
        let burst = NonZeroU32::new(config.max_requests)
            .ok_or_else(|| ThrottleError::Backend("max_requests must be non-zero".to_string()))?;
        let quota = Quota::with_period(config.window / burst.get())
            .ok_or_else(|| ThrottleError::Backend("window must be non-zero".to_string()))?
            .allow_burst(burst);

        Ok(Self {
            limiter: DefaultKeyedRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        })
    }
}

#[async_trait]
impl RequestThrottle for GovernorThrottle {
    async fn check(&self, key: &str) -> Result<ThrottleResult, ThrottleError> {
        if self.limiter.len() > MAX_TRACKED_CLIENTS {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Ok(ThrottleResult {
                allowed: true,
                retry_after: Duration::ZERO,
            }),
            Err(not_until) => Ok(ThrottleResult {
                allowed: false,
                retry_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_throttle_is_per_key() {
        let throttle = GovernorThrottle::new(ThrottleConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        })
        .unwrap();

        assert!(throttle.check("10.0.0.1").await.unwrap().allowed);
        assert!(throttle.check("10.0.0.1").await.unwrap().allowed);

        let third = throttle.check("10.0.0.1").await.unwrap();
        assert!(!third.allowed);
        assert!(third.retry_after > Duration::ZERO);

        assert!(throttle.check("10.0.0.2").await.unwrap().allowed);
    }

    #[test]
    fn test_zero_quota_is_rejected() {
        let config = ThrottleConfig {
            max_requests: 0,
            window: Duration::from_secs(60),
        };
        assert!(GovernorThrottle::new(config).is_err());
    }
}
