//! Store Module
//!
//! The marshalling facade over a key-value [`Backend`]. Every operation
//! decides per call, from [`CallOptions`], whether the value passes through
//! the codec or is handled as opaque bytes, and normalizes whatever
//! expiration alias the caller used into one TTL before the backend call.
//!
//! The store holds no mutable state of its own; each call is a
//! self-contained request and the store is safe to share across tasks as
//! long as the backend is.

use rmpv::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::backend::Backend;
use crate::codec;
use crate::error::{Result, StoreError};
use crate::options::CallOptions;

// == Fetched ==
/// Outcome of a read, one per key for [`Store::mget`].
///
/// Absence is a normal outcome, not an error, and is always distinguishable
/// from a value that decoded to something empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// No value is stored under the key.
    Absent,
    /// The stored bytes, unmodified (raw mode).
    Raw(Vec<u8>),
    /// The decoded logical value (marshalled mode).
    Value(Value),
}

impl Fetched {
    /// Returns true when no value was stored.
    pub fn is_absent(&self) -> bool {
        matches!(self, Fetched::Absent)
    }

    /// Extracts the decoded value, if this was a marshalled read with a hit.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Fetched::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Extracts the stored bytes, if this was a raw read with a hit.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Fetched::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}

// == Raw Bytes ==
/// The byte representation used when a value is written with raw mode on.
///
/// Strings contribute their bytes, binary values their payload, and
/// anything else its display rendering. The codec is not involved.
fn raw_bytes_of(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        Value::Binary(bytes) => bytes.clone(),
        other => other.to_string().into_bytes(),
    }
}

// == Store ==
/// Transparent-serialization facade over a key-value backend.
///
/// # Example
/// ```
/// use marshaled_kv::{CallOptions, Fetched, MemoryBackend, Store, Value};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> marshaled_kv::Result<()> {
/// let store = Store::new(MemoryBackend::new());
/// let rabbit = Value::Map(vec![(Value::from("name"), Value::from("bunny"))]);
///
/// store.set("rabbit", &rabbit, &CallOptions::new()).await?;
/// assert_eq!(
///     store.get("rabbit", &CallOptions::new()).await?,
///     Fetched::Value(rabbit),
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Store<B> {
    /// The external command executor
    backend: B,
}

impl<B: Backend> Store<B> {
    // == Constructor ==
    /// Wraps a backend in the marshalling facade.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // == Get ==
    /// Reads the value stored under a key.
    ///
    /// Returns [`Fetched::Absent`] when nothing is stored. With raw mode on
    /// the stored bytes come back unmodified; otherwise they are decoded,
    /// and bytes that are not a product of the codec (for example a value
    /// written through the raw path) fail with a decode error rather than
    /// being coerced. An encoded empty string decodes back to `""` without
    /// error.
    pub async fn get(&self, key: &str, options: &CallOptions) -> Result<Fetched> {
        debug!(key, raw = options.is_raw(), "get");

        match self.backend.get(key).await? {
            Some(bytes) => self.read_slot(key, bytes, options),
            None => Ok(Fetched::Absent),
        }
    }

    // == Set ==
    /// Stores a value under a key, overwriting any existing value.
    ///
    /// The value is encoded unless raw mode is on; any expiration alias in
    /// the options is normalized into the TTL handed to the backend.
    pub async fn set(&self, key: &str, value: &Value, options: &CallOptions) -> Result<()> {
        let bytes = self.write_payload(key, value, options)?;
        let ttl = options.ttl();
        debug!(key, raw = options.is_raw(), ?ttl, len = bytes.len(), "set");

        self.backend.set(key, bytes, ttl).await?;
        Ok(())
    }

    // == Setnx ==
    /// Stores a value under a key only when nothing is stored there.
    ///
    /// Encoding and TTL normalization work exactly as in [`Store::set`],
    /// but the write is delegated to the backend's atomic set-if-absent
    /// primitive. When a value already exists it is left byte-for-byte
    /// untouched (never re-encoded, merged, or partially applied), no
    /// matter whether it was originally written raw or marshalled. Returns
    /// `true` when the new value was stored.
    pub async fn setnx(&self, key: &str, value: &Value, options: &CallOptions) -> Result<bool> {
        let bytes = self.write_payload(key, value, options)?;
        let ttl = options.ttl();
        debug!(key, raw = options.is_raw(), ?ttl, len = bytes.len(), "setnx");

        Ok(self.backend.set_if_absent(key, bytes, ttl).await?)
    }

    // == Mget ==
    /// Reads several keys in one backend command.
    ///
    /// The result has one [`Fetched`] per requested key in request order;
    /// absent keys yield [`Fetched::Absent`] in their position. The
    /// raw/decode rule of [`Store::get`] applies to every item uniformly.
    ///
    /// When any single item fails to decode the whole call fails, with the
    /// offending key named in the error; partial results are not returned.
    pub async fn mget(&self, keys: &[&str], options: &CallOptions) -> Result<Vec<Fetched>> {
        debug!(count = keys.len(), raw = options.is_raw(), "mget");

        let slots = self.backend.multi_get(keys).await?;
        keys.iter()
            .zip(slots)
            .map(|(key, slot)| match slot {
                Some(bytes) => self.read_slot(key, bytes, options),
                None => Ok(Fetched::Absent),
            })
            .collect()
    }

    // == Delete ==
    /// Removes a key. Returns `true` when a value existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        debug!(key, "delete");
        Ok(self.backend.delete(key).await?)
    }

    // == Exists ==
    /// Checks whether a key currently holds a value.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.backend.exists(key).await?)
    }

    // == Expire ==
    /// Sets the remaining lifetime of an existing key.
    ///
    /// Returns `false` when the key does not exist.
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        debug!(key, ?ttl, "expire");
        Ok(self.backend.expire(key, ttl).await?)
    }

    // == Typed Convenience ==
    /// Marshals any serializable value and stores it under a key.
    pub async fn set_as<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        options: &CallOptions,
    ) -> Result<()> {
        let value = codec::to_value(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &value, options).await
    }

    /// Reads a key and unmarshals it into a concrete type.
    ///
    /// Returns `Ok(None)` when nothing is stored; a stored value that does
    /// not decode or does not fit `T` is an error, never a default.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.backend.get(key).await? else {
            return Ok(None);
        };
        let value = self.decode_bytes(key, &bytes)?;
        codec::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
    }

    // == Internals ==
    /// Applies the per-call raw/decode rule to one retrieved slot.
    fn read_slot(&self, key: &str, bytes: Vec<u8>, options: &CallOptions) -> Result<Fetched> {
        if options.is_raw() {
            Ok(Fetched::Raw(bytes))
        } else {
            self.decode_bytes(key, &bytes).map(Fetched::Value)
        }
    }

    fn decode_bytes(&self, key: &str, bytes: &[u8]) -> Result<Value> {
        codec::decode(bytes).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
    }

    /// Computes the bytes a write hands to the backend.
    fn write_payload(&self, key: &str, value: &Value, options: &CallOptions) -> Result<Vec<u8>> {
        if options.is_raw() {
            Ok(raw_bytes_of(value))
        } else {
            codec::encode(value).map_err(|source| StoreError::Encode {
                key: key.to_string(),
                source,
            })
        }
    }
}
