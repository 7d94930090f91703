// src/rotation/key_rotation.rs

use crate::error::Result;
use crate::storage::{cursor_key, CursorStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// Candidate API keys as they appear in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiKeys {
    /// Explicit ordered list
    List(Vec<String>),
    /// Single key or comma-separated list
    Joined(String),
}

impl ApiKeys {
    /// Trimmed, non-empty keys in configured order. Duplicates are kept.
    pub fn normalized(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(keys) => keys.iter().map(String::as_str).collect(),
            Self::Joined(joined) => joined.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<Vec<String>> for ApiKeys {
    fn from(keys: Vec<String>) -> Self {
        Self::List(keys)
    }
}

impl From<&[&str]> for ApiKeys {
    fn from(keys: &[&str]) -> Self {
        Self::List(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl From<&str> for ApiKeys {
    fn from(joined: &str) -> Self {
        Self::Joined(joined.to_string())
    }
}

/// Round-robin API key selection with a durable per-connection cursor.
#[derive(Clone)]
pub struct CredentialRotator {
    store: Arc<dyn CursorStore>,
}

impl CredentialRotator {
    pub fn new(store: Arc<dyn CursorStore>) -> Self {
        Self { store }
    }

    /// Picks the key the next request on `connection_name` should carry.
    ///
    /// An override is returned as-is without touching the store. Pools of zero
    /// or one key never read or write the cursor. Larger pools advance the
    /// stored cursor and return the key in the new slot.
    pub async fn next_key(
        &self,
        connection_name: &str,
        candidates: &ApiKeys,
        override_key: Option<&str>,
    ) -> Result<Option<String>> {
        if let Some(key) = override_key {
            trace!(connection = connection_name, "Using caller-supplied API key");
            return Ok(Some(key.to_string()));
        }

        let mut keys = candidates.normalized();
        match keys.len() {
            0 => {
                trace!(connection = connection_name, "No API keys configured");
                Ok(None)
            }
            1 => Ok(keys.pop()),
            total => {
                let slot = self
                    .store
                    .advance(&cursor_key(connection_name), total)
                    .await?;
                let key = keys.swap_remove(slot);
                debug!(
                    event = "key_selected",
                    connection = connection_name,
                    api_key.preview = %preview_key(&key),
                    slot,
                    total_candidates = total,
                    "API key selected for request"
                );
                Ok(Some(key))
            }
        }
    }
}

/// Masks a key for logs.
pub fn preview_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_keys_are_trimmed_and_filtered() {
        let keys = ApiKeys::from(" k1, ,k2 ,,k1 ");
        assert_eq!(keys.normalized(), vec!["k1", "k2", "k1"]);
    }

    #[test]
    fn test_list_keys_are_trimmed_and_filtered() {
        let keys = ApiKeys::List(vec!["  a".into(), "".into(), "b".into(), "   ".into()]);
        assert_eq!(keys.normalized(), vec!["a", "b"]);
    }

    #[test]
    fn test_untagged_deserialization() {
        let joined: ApiKeys = serde_yaml::from_str("\"a,b\"").unwrap();
        assert_eq!(joined, ApiKeys::Joined("a,b".into()));

        let list: ApiKeys = serde_yaml::from_str("[a, b]").unwrap();
        assert_eq!(list, ApiKeys::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_preview_key_masks_middle() {
        assert_eq!(preview_key("abcd1234567890wxyz"), "abcd...wxyz");
        assert_eq!(preview_key("short"), "****");
    }
}
