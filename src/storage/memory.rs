// src/storage/memory.rs

use crate::error::Result;
use crate::storage::cursor::{next_index, parse_cursor};
use crate::storage::CursorStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

/// In-memory cursor storage.
///
/// Cursors live as long as the store; `advance` holds the map lock for the
/// whole read-increment-write.
#[derive(Clone, Default)]
pub struct InMemoryCursorStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CursorStore for InMemoryCursorStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().await;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn advance(&self, key: &str, modulus: usize) -> Result<usize> {
        trace!("InMemoryCursorStore::advance: waiting for lock");
        let mut values = self.values.lock().await;
        trace!("InMemoryCursorStore::advance: got lock");
        let current = parse_cursor(values.get(key).map(String::as_str), modulus);
        let next = next_index(current, modulus);
        values.insert(key.to_string(), next.to_string());
        Ok(next)
    }
}
