// src/storage/redis.rs

use crate::error::Result;
use crate::storage::CursorStore;
use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Connection as RedisConnection, Pool, Runtime};
use redis::{AsyncCommands, Script};
use tracing::{info, trace};

const DEFAULT_KEY_PREFIX: &str = "tron_http:";

// GET, coerce, increment and SET run as one script, which Redis never
// interleaves with other commands. Only optionally signed decimal integers
// count as cursors, matching `parse_cursor`.
const ADVANCE_SCRIPT: &str = r"
local modulus = tonumber(ARGV[1])
local raw = redis.call('GET', KEYS[1])
local cursor = -1
if raw then
    local digits = string.match(raw, '^%s*([+-]?%d+)%s*$')
    local parsed = digits and tonumber(digits)
    if parsed and parsed >= -1 and parsed < modulus then
        cursor = parsed
    end
end
local nxt = (cursor + 1) % modulus
redis.call('SET', KEYS[1], tostring(nxt))
return nxt
";

/// Redis-backed cursor storage, shared across processes.
pub struct RedisCursorStore {
    pool: Pool,
    key_prefix: String,
    advance_script: Script,
}

impl RedisCursorStore {
    pub fn new(pool: Pool, key_prefix: Option<String>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
            advance_script: Script::new(ADVANCE_SCRIPT),
        }
    }

    /// Builds a pooled store from a `redis://` URL.
    pub fn from_url(redis_url: &str, key_prefix: Option<String>) -> Result<Self> {
        let pool = PoolConfig::from_url(redis_url).create_pool(Some(Runtime::Tokio1))?;
        info!("Redis pool created for rotation cursors.");
        Ok(Self::new(pool, key_prefix))
    }

    fn prefix_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn get_connection(&self) -> Result<RedisConnection> {
        self.pool.get().await.map_err(Into::into)
    }
}

#[async_trait]
impl CursorStore for RedisCursorStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(self.prefix_key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: () = conn.set(self.prefix_key(key), value).await?;
        Ok(())
    }

    async fn advance(&self, key: &str, modulus: usize) -> Result<usize> {
        trace!("RedisCursorStore::advance: start for '{}'", key);
        let mut conn = self.get_connection().await?;
        let next: usize = self
            .advance_script
            .key(self.prefix_key(key))
            .arg(modulus)
            .invoke_async(&mut conn)
            .await?;
        trace!("RedisCursorStore::advance: new cursor is {}", next);
        Ok(next)
    }
}
