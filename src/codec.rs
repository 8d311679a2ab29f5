//! Codec Module
//!
//! Converts logical values to their stored byte representation and back.
//!
//! The wire format is MessagePack: self-describing, binary-safe, and the
//! empty string encodes to a real one-byte payload instead of nothing, so
//! empty values survive a round-trip like any other value. A decode only
//! succeeds when the whole buffer is consumed; bytes that were written
//! through the raw path (or are otherwise not a product of [`encode`])
//! fail with [`DecodeError`] instead of being silently misread.

use rmpv::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// == Encode Error ==
/// A value could not be turned into its stored byte representation.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Writing the MessagePack representation failed.
    #[error("failed to encode value: {0}")]
    Write(#[from] rmpv::encode::Error),

    /// A typed value could not be converted into a logical value.
    #[error("failed to convert value for encoding: {0}")]
    Convert(#[from] rmpv::ext::Error),
}

// == Decode Error ==
/// Stored bytes are not a product of [`encode`].
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The bytes are not valid MessagePack (truncated or foreign framing).
    #[error("malformed encoding: {0}")]
    Malformed(#[from] rmpv::decode::Error),

    /// A complete value was read but bytes were left over, so the buffer
    /// as a whole is not a single encoded value.
    #[error("trailing garbage after encoded value: {trailing} of {total} bytes unread")]
    TrailingBytes {
        /// Bytes remaining after the decoded value.
        trailing: usize,
        /// Total buffer length.
        total: usize,
    },

    /// The decoded value could not be converted into the requested type.
    #[error("failed to convert decoded value: {0}")]
    Convert(#[from] rmpv::ext::Error),
}

// == Encode ==
/// Encodes a logical value into its stored byte representation.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, value)?;
    Ok(buf)
}

// == Decode ==
/// Decodes stored bytes back into a logical value.
///
/// The entire buffer must be consumed by the decode; anything else is a
/// [`DecodeError`].
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut rest = bytes;
    let value = rmpv::decode::read_value(&mut rest)?;
    if !rest.is_empty() {
        return Err(DecodeError::TrailingBytes {
            trailing: rest.len(),
            total: bytes.len(),
        });
    }
    Ok(value)
}

// == Serde Bridge ==
/// Converts any serializable type into a logical value.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value, EncodeError> {
    Ok(rmpv::ext::to_value(value)?)
}

/// Converts a logical value into a concrete deserializable type.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    Ok(rmpv::ext::from_value(value)?)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_string() {
        let value = Value::from("bunny");
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_empty_string() {
        let value = Value::from("");
        let bytes = encode(&value).unwrap();

        // The empty string still occupies one byte on the wire.
        assert_eq!(bytes.len(), 1);
        assert_eq!(decode(&bytes).unwrap(), Value::from(""));
    }

    #[test]
    fn test_roundtrip_map() {
        let value = Value::Map(vec![(Value::from("name"), Value::from("bunny"))]);
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_binary() {
        let value = Value::Binary(vec![0, 128, 255, 7]);
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_decode_empty_buffer_fails() {
        assert!(matches!(decode(&[]), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_trailing_bytes_fails() {
        let mut bytes = encode(&Value::from("bunny")).unwrap();
        bytes.extend_from_slice(b"extra");

        let result = decode(&bytes);
        assert!(matches!(
            result,
            Err(DecodeError::TrailingBytes { trailing: 5, .. })
        ));
    }

    #[test]
    fn test_decode_raw_text_fails() {
        // Plain text written through the raw path reads as a MessagePack
        // positive fixint followed by garbage, not as one value.
        let result = decode(b"#<Rabbit color=\"white\">");
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_bridge_roundtrip() {
        use serde::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Rabbit {
            name: String,
        }

        let rabbit = Rabbit {
            name: "bunny".to_string(),
        };
        let value = to_value(&rabbit).unwrap();
        let back: Rabbit = from_value(value).unwrap();
        assert_eq!(back, rabbit);
    }
}
