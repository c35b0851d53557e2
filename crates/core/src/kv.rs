//! Key-value port used by the session store.
//!
//! Values are whole strings written with a store-level expiry (`SET EX`
//! semantics). There are no partial updates: every write replaces the value
//! and its deadline together.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Infrastructure failure talking to the backing store.
#[derive(Debug, thiserror::Error)]
#[error("key-value store unavailable: {0}")]
pub struct KvError(pub String);

/// Minimal TTL-aware key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Overwrite `key` with `value`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;

    /// Read `key`. A key past its deadline reads as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Remove `key`. Returns `true` iff a live key was removed.
    async fn delete(&self, key: &str) -> Result<bool, KvError>;

    /// Overwrite `key` with `value` and a fresh `ttl`, but only while it is
    /// live and still holds `expected`. Returns `true` iff the write happened.
    async fn replace_ex(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, KvError>;

    /// Remove `key` only while it still holds `expected`, live or not.
    /// Returns `true` iff an entry was removed.
    async fn delete_if(&self, key: &str, expected: &str) -> Result<bool, KvError>;

    /// Drop every expired entry. Returns the number removed.
    async fn purge_expired(&self) -> Result<u64, KvError>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

struct Entry {
    value: String,
    deadline: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.deadline
    }
}

/// Process-local store for single-instance deployments and tests.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, live or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let entry = Entry {
            value: value.to_string(),
            deadline: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        // Expired: evict under the write lock, re-checking in case of a
        // concurrent overwrite.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|e| e.is_live(Instant::now())))
    }

    async fn replace_ex(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, KvError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) && entry.value == expected => {
                entry.value = value.to_string();
                entry.deadline = now + ttl;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_if(&self, key: &str, expected: &str) -> Result<bool, KvError> {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.value == expected) {
            entries.remove(key);
            return Ok(true);
        }
        Ok(false)
    }

    async fn purge_expired(&self) -> Result<u64, KvError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get() {
        let kv = MemoryKeyValueStore::new();
        kv.set_ex("a", "1", MINUTE).await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(kv.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_value_and_deadline() {
        let kv = MemoryKeyValueStore::new();
        kv.set_ex("a", "1", Duration::ZERO).await.unwrap();
        kv.set_ex("a", "2", MINUTE).await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn expired_key_reads_as_absent_and_is_evicted() {
        let kv = MemoryKeyValueStore::new();
        kv.set_ex("a", "1", Duration::ZERO).await.unwrap();
        assert_eq!(kv.get("a").await.unwrap(), None);
        assert!(kv.is_empty().await);
    }

    #[tokio::test]
    async fn delete_reports_live_removal_only() {
        let kv = MemoryKeyValueStore::new();
        kv.set_ex("live", "1", MINUTE).await.unwrap();
        kv.set_ex("dead", "1", Duration::ZERO).await.unwrap();

        assert!(kv.delete("live").await.unwrap());
        assert!(!kv.delete("live").await.unwrap());
        assert!(!kv.delete("dead").await.unwrap());
        assert!(!kv.delete("never").await.unwrap());
    }

    #[tokio::test]
    async fn replace_requires_live_expected_value() {
        let kv = MemoryKeyValueStore::new();
        kv.set_ex("a", "1", MINUTE).await.unwrap();

        assert!(!kv.replace_ex("a", "stale", "2", MINUTE).await.unwrap());
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("1"));

        assert!(kv.replace_ex("a", "1", "2", MINUTE).await.unwrap());
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("2"));

        assert!(!kv.replace_ex("missing", "1", "2", MINUTE).await.unwrap());
        assert_eq!(kv.get("missing").await.unwrap(), None);

        kv.set_ex("dead", "1", Duration::ZERO).await.unwrap();
        assert!(!kv.replace_ex("dead", "1", "2", MINUTE).await.unwrap());
    }

    #[tokio::test]
    async fn delete_if_spares_overwritten_entries() {
        let kv = MemoryKeyValueStore::new();
        kv.set_ex("a", "new", MINUTE).await.unwrap();

        assert!(!kv.delete_if("a", "old").await.unwrap());
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("new"));

        assert!(kv.delete_if("a", "new").await.unwrap());
        assert_eq!(kv.get("a").await.unwrap(), None);
        assert!(!kv.delete_if("a", "new").await.unwrap());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_entries() {
        let kv = MemoryKeyValueStore::new();
        kv.set_ex("live", "1", MINUTE).await.unwrap();
        kv.set_ex("dead-1", "1", Duration::ZERO).await.unwrap();
        kv.set_ex("dead-2", "1", Duration::ZERO).await.unwrap();

        assert_eq!(kv.purge_expired().await.unwrap(), 2);
        assert_eq!(kv.len().await, 1);
        assert_eq!(kv.get("live").await.unwrap().as_deref(), Some("1"));
    }
}
