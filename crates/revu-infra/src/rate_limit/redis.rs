//! Redis rate-limit ledger using Lua scripts for atomic conditional writes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use revu_core::RepoError;
use revu_core::domain::{RateLimitEntry, RateLimitKey};
use revu_core::ports::RateLimitStore;

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Key prefix for ledger entries
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "ratelimit".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: std::env::var("RATE_LIMIT_KEY_PREFIX")
                .unwrap_or_else(|_| "ratelimit".to_string()),
        }
    }
}

// Returns 1 if the hash was created, 0 if it already existed.
const INSERT_IF_ABSENT: &str = r#"
    if redis.call('EXISTS', KEYS[1]) == 1 then
        return 0
    end
    redis.call('HSET', KEYS[1], 'count', ARGV[1], 'at', ARGV[2])
    return 1
"#;

// Returns 1 if the stored (count, at) matched ARGV[1..2] and was replaced.
const COMPARE_AND_SET: &str = r#"
    local count = redis.call('HGET', KEYS[1], 'count')
    local at = redis.call('HGET', KEYS[1], 'at')
    if count ~= ARGV[1] or at ~= ARGV[2] then
        return 0
    end
    redis.call('HSET', KEYS[1], 'count', ARGV[3], 'at', ARGV[4])
    return 1
"#;

/// Redis-backed rate-limit ledger.
///
/// One hash per key tuple holding `count` and `at` (microseconds since the
/// epoch). Entries carry no TTL; the ledger is durable.
pub struct RedisRateLimitStore {
    conn: ConnectionManager,
    config: RedisConfig,
    insert_script: Script,
    cas_script: Script,
}

impl RedisRateLimitStore {
    pub async fn new(config: RedisConfig) -> Result<Self, RepoError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| RepoError::Connection("Connection timed out".to_string()))?
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis rate-limit ledger");

        Ok(Self {
            conn,
            config,
            insert_script: Script::new(INSERT_IF_ABSENT),
            cas_script: Script::new(COMPARE_AND_SET),
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, RepoError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn make_key(&self, key: &RateLimitKey) -> String {
        // JSON keeps identifiers containing ':' from colliding.
        let tuple = serde_json::json!([
            key.device_fingerprint,
            key.outlet_id,
            key.qr_code_id,
            key.action_type.as_str(),
        ]);
        format!("{}:{}", self.config.key_prefix, tuple)
    }
}

fn backend_err(e: redis::RedisError) -> RepoError {
    if e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
        RepoError::Connection(e.to_string())
    } else {
        RepoError::Query(e.to_string())
    }
}

fn parse_entry(key: &RateLimitKey, fields: &HashMap<String, String>) -> Result<RateLimitEntry, RepoError> {
    let count = fields
        .get("count")
        .and_then(|c| c.parse::<u32>().ok())
        .ok_or_else(|| RepoError::Query("malformed ledger entry: count".to_string()))?;
    let at = fields
        .get("at")
        .and_then(|a| a.parse::<i64>().ok())
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .ok_or_else(|| RepoError::Query("malformed ledger entry: at".to_string()))?;

    Ok(RateLimitEntry {
        key: key.clone(),
        action_count: count,
        last_action_at: at,
    })
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn get_by_key(&self, key: &RateLimitKey) -> Result<Option<RateLimitEntry>, RepoError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(self.make_key(key)).await.map_err(backend_err)?;

        if fields.is_empty() {
            return Ok(None);
        }
        parse_entry(key, &fields).map(Some)
    }

    async fn insert_if_absent(&self, entry: &RateLimitEntry) -> Result<bool, RepoError> {
        let mut conn = self.conn.clone();
        let created: i64 = self
            .insert_script
            .key(self.make_key(&entry.key))
            .arg(entry.action_count)
            .arg(entry.last_action_at.timestamp_micros())
            .invoke_async(&mut conn)
            .await
            .map_err(backend_err)?;

        Ok(created == 1)
    }

    async fn upsert_count(
        &self,
        expected: &RateLimitEntry,
        action_count: u32,
        last_action_at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let mut conn = self.conn.clone();
        let swapped: i64 = self
            .cas_script
            .key(self.make_key(&expected.key))
            .arg(expected.action_count.to_string())
            .arg(expected.last_action_at.timestamp_micros().to_string())
            .arg(action_count)
            .arg(last_action_at.timestamp_micros())
            .invoke_async(&mut conn)
            .await
            .map_err(backend_err)?;

        Ok(swapped == 1)
    }
}
