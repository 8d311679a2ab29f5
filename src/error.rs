//! Error types for the marshalling store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::backend::BackendError;
use crate::codec::{DecodeError, EncodeError};

// == Store Error Enum ==
/// Unified error type for store operations.
///
/// Absence of a value is never an error; reads report it as
/// [`Fetched::Absent`](crate::store::Fetched::Absent) so callers can tell
/// "no value" apart from "value failed to decode" and from a value that
/// decoded to something empty. No error kind is converted into another, and
/// no decode failure is papered over with a default value.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend reported a connectivity or protocol failure.
    /// Surfaced unchanged; the store never retries internally.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Bytes were stored under the key but are not a product of the codec.
    #[error("failed to decode value stored under {key:?}: {source}")]
    Decode {
        /// The key whose stored bytes failed to decode
        key: String,
        #[source]
        source: DecodeError,
    },

    /// The value for the key could not be serialized.
    #[error("failed to encode value for {key:?}: {source}")]
    Encode {
        /// The key the write was aimed at
        key: String,
        #[source]
        source: EncodeError,
    },
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
