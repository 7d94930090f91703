// src/storage/traits.rs

use crate::error::Result;
use crate::storage::cursor::{next_index, parse_cursor};
use async_trait::async_trait;

/// Durable key-value storage for rotation cursors.
///
/// Values never expire and are shared by every process pointed at the same
/// backend.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Read a raw value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw value without expiry
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Advance the cursor stored under `key` within a pool of `modulus` keys
    /// and return the new slot.
    ///
    /// Implementations must make the read-increment-write atomic per key.
    /// The provided body is a plain get-then-set: two concurrent callers can
    /// read the same cursor and receive the same slot (last write wins).
    async fn advance(&self, key: &str, modulus: usize) -> Result<usize> {
        let current = parse_cursor(self.get(key).await?.as_deref(), modulus);
        let next = next_index(current, modulus);
        self.set(key, &next.to_string()).await?;
        Ok(next)
    }
}
