//! Redis-backed rate-limit ledger.

mod redis;

pub use self::redis::{RedisConfig, RedisRateLimitStore};
