//! Per-client request throttling port.

use async_trait::async_trait;
use std::time::Duration;

/// Coarse request throttle applied in front of the public endpoints.
#[async_trait]
pub trait RequestThrottle: Send + Sync {
    /// Check if a request from `key` is allowed and count it.
    async fn check(&self, key: &str) -> Result<ThrottleResult, ThrottleError>;
}

/// Result of a throttle check.
#[derive(Debug, Clone)]
pub struct ThrottleResult {
    pub allowed: bool,
    pub retry_after: Duration,
}

/// Throttle errors.
#[derive(Debug, thiserror::Error)]
pub enum ThrottleError {
    #[error("Backend error: {0}")]
    Backend(String),
}
