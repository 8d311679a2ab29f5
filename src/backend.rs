//! Backend Command Interface
//!
//! The minimal set of key-value commands the store relies on, implemented
//! by an external client (or by [`MemoryBackend`](crate::memory::MemoryBackend)
//! for local use and tests). The store never looks inside the backend: bytes
//! written are the bytes read back.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// == Backend Error ==
/// Failure reported by the external key-value backend.
///
/// Connectivity and protocol problems both land here; the store surfaces
/// them unchanged and leaves retrying to the caller.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend could not be reached or the connection dropped.
    #[error("backend connection failed: {0}")]
    Connection(String),

    /// The backend rejected or failed to execute a command.
    #[error("backend command failed: {0}")]
    Command(String),
}

// == Backend Trait ==
/// Key-value command executor.
///
/// Implementations must be safe for concurrent use (`Send + Sync`); the
/// store holds no lock of its own and issues commands from any number of
/// callers at once. `set_if_absent` must be atomic with respect to
/// concurrent writers on the same key: the store depends on it being a
/// single primitive, not a check followed by a set.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Retrieves the bytes stored under a key.
    ///
    /// Returns `Ok(None)` when nothing is stored (or the entry expired).
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Stores bytes under a key, overwriting any existing value.
    ///
    /// With `Some(ttl)` the entry expires once that duration has elapsed;
    /// with `None` it is permanent.
    async fn set(&self, key: &str, bytes: Vec<u8>, ttl: Option<Duration>)
        -> Result<(), BackendError>;

    /// Stores bytes under a key only when nothing is stored there.
    ///
    /// Returns `true` when the write took effect, `false` when an existing
    /// value was left untouched. Atomic with respect to concurrent callers.
    async fn set_if_absent(
        &self,
        key: &str,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool, BackendError>;

    /// Retrieves the bytes for several keys in one command.
    ///
    /// The result has one slot per requested key, in request order, with
    /// `None` marking absent keys.
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<Vec<u8>>>, BackendError>;

    /// Removes a key. Returns `true` when a value existed.
    async fn delete(&self, key: &str) -> Result<bool, BackendError>;

    /// Sets the remaining lifetime of an existing key.
    ///
    /// Returns `false` when the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, BackendError>;

    /// Checks whether a key currently holds a value.
    async fn exists(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.get(key).await?.is_some())
    }
}
