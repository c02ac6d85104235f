//! Opaque, URL-safe cursors over arbitrary ordering keys.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors raised while encoding or decoding a cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The cursor text was not valid URL-safe base64.
    #[error("cursor is not valid base64: {message}")]
    Encoding {
        /// Decoder diagnostic.
        message: String,
    },
    /// The decoded bytes did not describe the expected key.
    #[error("cursor payload is malformed: {message}")]
    Payload {
        /// Deserializer diagnostic.
        message: String,
    },
}

/// Opaque position within an ordered listing.
///
/// # Examples
/// ```
/// use pagination::Cursor;
///
/// let cursor = Cursor::new((42_i64, "b".to_owned()));
/// let encoded = cursor.encode().expect("tuple keys serialize");
/// let decoded = Cursor::<(i64, String)>::decode(&encoded).expect("round trip");
/// assert_eq!(decoded.key(), &(42, "b".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap an ordering key.
    #[must_use]
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the ordering key.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consume the cursor and return the ordering key.
    #[must_use]
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the key as URL-safe base64 JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Payload`] when the key cannot be serialized.
    pub fn encode(&self) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(&self.key).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode a cursor produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Encoding`] for text that is not base64 and
    /// [`CursorError::Payload`] when the bytes do not describe a `K`.
    pub fn decode(encoded: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|err| CursorError::Encoding {
                message: err.to_string(),
            })?;
        let key = serde_json::from_slice(&bytes).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(Self { key })
    }
}
