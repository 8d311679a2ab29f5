//! Marshaled KV - a transparent-serialization facade over a key-value store
//!
//! Stores arbitrary structured values under string keys, converting them to
//! a byte representation on write and back on read, with a per-call raw mode
//! that bypasses conversion entirely and a normalizer that maps the TTL
//! option names of different calling conventions onto one concept.

pub mod backend;
pub mod codec;
pub mod error;
pub mod memory;
pub mod options;
pub mod store;


pub use backend::{Backend, BackendError};
pub use error::{Result, StoreError};
pub use memory::MemoryBackend;
pub use options::{CallOptions, TTL_ALIASES};
pub use store::{Fetched, Store};

/// The logical value type handled by the marshalled path.
pub use rmpv::Value;
