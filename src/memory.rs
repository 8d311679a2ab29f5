//! Memory Backend Module
//!
//! In-memory [`Backend`] implementation with TTL expiration. Backs the test
//! suite and works as a local stand-in when no external store is configured.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::{Backend, BackendError};

// == Entry ==
/// A stored byte value with an optional expiry instant.
#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(bytes: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            bytes,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    /// An entry is expired once the current time reaches its expiry instant.
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Instant::now() >= expires,
            None => false,
        }
    }
}

// == Memory Backend ==
/// Thread-safe in-memory key-value backend.
///
/// Entries expire lazily: an expired entry counts as absent for every
/// command, whether or not it has been physically removed yet.
/// `set_if_absent` performs its check and insert under one write-lock
/// acquisition, so it is atomic with respect to concurrent callers.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|entry| !entry.is_expired()).count()
    }

    /// Returns true when no live entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.bytes.clone()))
    }

    async fn set(
        &self,
        key: &str,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry::new(bytes, ttl));
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool, BackendError> {
        let mut entries = self.entries.write().await;

        // A lingering expired entry counts as absent.
        if let Some(existing) = entries.get(key) {
            if !existing.is_expired() {
                return Ok(false);
            }
        }

        entries.insert(key.to_string(), Entry::new(bytes, ttl));
        Ok(true)
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<Vec<u8>>>, BackendError> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|key| {
                entries
                    .get(*key)
                    .filter(|entry| !entry.is_expired())
                    .map(|entry| entry.bytes.clone())
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        let mut entries = self.entries.write().await;
        match entries.remove(key) {
            Some(entry) => Ok(!entry.is_expired()),
            None => Ok(false),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, BackendError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = MemoryBackend::new();

        backend.set("key1", b"value1".to_vec(), None).await.unwrap();
        let value = backend.get("key1").await.unwrap();

        assert_eq!(value, Some(b"value1".to_vec()));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_absent() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let backend = MemoryBackend::new();

        backend.set("key1", b"old".to_vec(), None).await.unwrap();
        backend.set("key1", b"new".to_vec(), None).await.unwrap();

        assert_eq!(backend.get("key1").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_set_if_absent_respects_existing() {
        let backend = MemoryBackend::new();

        backend.set("key1", b"original".to_vec(), None).await.unwrap();
        let stored = backend
            .set_if_absent("key1", b"replacement".to_vec(), None)
            .await
            .unwrap();

        assert!(!stored);
        assert_eq!(
            backend.get("key1").await.unwrap(),
            Some(b"original".to_vec())
        );
    }

    #[tokio::test]
    async fn test_set_if_absent_stores_when_absent() {
        let backend = MemoryBackend::new();

        let stored = backend
            .set_if_absent("key1", b"value".to_vec(), None)
            .await
            .unwrap();

        assert!(stored);
        assert_eq!(backend.get("key1").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let backend = MemoryBackend::new();

        backend
            .set("key1", b"value".to_vec(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(backend.exists("key1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(backend.get("key1").await.unwrap(), None);
        assert!(!backend.exists("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_if_absent_treats_expired_as_absent() {
        let backend = MemoryBackend::new();

        backend
            .set("key1", b"old".to_vec(), Some(Duration::from_millis(30)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        let stored = backend
            .set_if_absent("key1", b"new".to_vec(), None)
            .await
            .unwrap();

        assert!(stored);
        assert_eq!(backend.get("key1").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_multi_get_preserves_order() {
        let backend = MemoryBackend::new();

        backend.set("a", b"1".to_vec(), None).await.unwrap();
        backend.set("c", b"3".to_vec(), None).await.unwrap();

        let values = backend.multi_get(&["a", "b", "c"]).await.unwrap();
        assert_eq!(
            values,
            vec![Some(b"1".to_vec()), None, Some(b"3".to_vec())]
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty().await);

        backend.set("key1", b"value".to_vec(), None).await.unwrap();
        assert!(!backend.is_empty().await);

        assert!(backend.delete("key1").await.unwrap());
        assert!(!backend.delete("key1").await.unwrap());
        assert_eq!(backend.get("key1").await.unwrap(), None);
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_expire_existing_key() {
        let backend = MemoryBackend::new();

        backend.set("key1", b"value".to_vec(), None).await.unwrap();
        assert!(backend
            .expire("key1", Duration::from_millis(40))
            .await
            .unwrap());

        tokio::time::sleep(Duration::from_millis(70)).await;
        assert_eq!(backend.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expire_missing_key() {
        let backend = MemoryBackend::new();
        assert!(!backend
            .expire("missing", Duration::from_secs(1))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_binary_unsafe_keys_and_values() {
        let backend = MemoryBackend::new();
        let key = "\u{c88b}";
        let bytes = vec![0u8, 128, 255];

        backend.set(key, bytes.clone(), None).await.unwrap();
        assert_eq!(backend.get(key).await.unwrap(), Some(bytes));
    }
}
