//! Session identity provider
//!
//! A session id is minted once per storage scope and then reused for every
//! chat request, so the backend can stitch a tab's messages into one
//! conversation. Nothing here rotates or expires it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Storage key used when the configuration does not override it
pub const DEFAULT_STORAGE_KEY: &str = "chatSessionId";

/// Opaque client-generated token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fresh random alphanumeric token (32 lowercase hex digits)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Key-value persistence scoped to one browser profile (or one test)
pub trait SessionStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process store, used by tests and as a fallback when the browser
/// refuses access to `localStorage`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Return the persisted session id, minting and persisting one on first use
pub fn get_or_create_session_id<S>(store: &mut S, key: &str) -> Result<SessionId>
where
    S: SessionStore + ?Sized,
{
    get_or_create_with(store, key, SessionId::generate)
}

/// Same as [`get_or_create_session_id`] with a caller-supplied generator
pub fn get_or_create_with<S, F>(store: &mut S, key: &str, generate: F) -> Result<SessionId>
where
    S: SessionStore + ?Sized,
    F: FnOnce() -> SessionId,
{
    if let Some(existing) = store.load(key)? {
        if !existing.trim().is_empty() {
            return Ok(SessionId::new(existing));
        }
        log::warn!("Discarding blank session id stored under '{}'", key);
    }

    let id = generate();
    store.store(key, id.as_str())?;
    log::info!("Created new chat session id {}", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_alphanumeric() {
        let id = SessionId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_id_is_stable_within_one_store() {
        let mut store = MemoryStore::new();
        let first = get_or_create_session_id(&mut store, DEFAULT_STORAGE_KEY).unwrap();
        let second = get_or_create_session_id(&mut store, DEFAULT_STORAGE_KEY).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            store.load(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[test]
    fn test_existing_value_is_returned_unchanged() {
        let mut store = MemoryStore::new();
        store.store("chatSessionId", "abc123").unwrap();
        let id = get_or_create_with(&mut store, "chatSessionId", || {
            panic!("generator must not run when an id is stored")
        })
        .unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_blank_value_is_replaced() {
        let mut store = MemoryStore::new();
        store.store("chatSessionId", "   ").unwrap();
        let id = get_or_create_with(&mut store, "chatSessionId", || SessionId::new("fresh")).unwrap();
        assert_eq!(id.as_str(), "fresh");
        assert_eq!(store.load("chatSessionId").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_separate_stores_get_separate_ids() {
        let mut a = MemoryStore::new();
        let mut b = MemoryStore::new();
        let id_a = get_or_create_session_id(&mut a, DEFAULT_STORAGE_KEY).unwrap();
        let id_b = get_or_create_session_id(&mut b, DEFAULT_STORAGE_KEY).unwrap();
        assert_ne!(id_a, id_b);
    }
}
