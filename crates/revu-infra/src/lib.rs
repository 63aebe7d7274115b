//! # Revu Infrastructure
//!
//! Concrete implementations of the ports defined in `revu-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL stores via SeaORM
//! - `redis` - Redis rate-limit ledger
//! - `rate-limit` - Per-client request throttle via governor
//! - `ai` - Review drafting through an HTTP language model provider

pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "redis")]
pub mod rate_limit;

#[cfg(feature = "rate-limit")]
pub mod throttle;

#[cfg(feature = "ai")]
pub mod ai;

// Re-exports - In-Memory
pub use memory::{
    InMemoryIncentiveStore, InMemoryRateLimitStore, InMemoryReviewSessionStore, ManualClock,
};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresIncentiveStore, PostgresRateLimitStore, PostgresReviewSessionStore,
};

#[cfg(feature = "redis")]
pub use rate_limit::{RedisConfig, RedisRateLimitStore};

#[cfg(feature = "rate-limit")]
pub use throttle::{GovernorThrottle, ThrottleConfig};

#[cfg(feature = "ai")]
pub use ai::{HttpReviewGenerator, ReviewAiConfig};
