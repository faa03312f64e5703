//! # Canonical Content Normalization
//!
//! Defines [`CardContent`], the tagged input accepted at the card
//! constructor boundary, and the single pipeline that turns it into the
//! canonical byte sequence a digest is computed over.
//!
//! ## Security Invariant
//!
//! Every digest in the store is computed over bytes produced by
//! [`CardContent::into_canonical_bytes`]. Structured values are
//! serialized with RFC 8785 (JSON Canonicalization Scheme): sorted keys,
//! compact separators, deterministic byte sequence. Two runs handed the
//! same object therefore digest to the same hash.

use serde::Serialize;
use serde_json::Value;

use crate::error::CardError;

/// Input content for a fresh card.
///
/// The store treats content as opaque bytes; this enum only exists to
/// pin down how each input shape reaches byte form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardContent {
    /// Raw bytes, used as-is.
    Bytes(Vec<u8>),
    /// Text, UTF-8 encoded.
    Text(String),
    /// A structured value, serialized as canonical JSON.
    /// `Value::Null` and empty objects are rejected.
    Object(Value),
}

impl CardContent {
    /// Build structured content from any serializable value.
    ///
    /// # Errors
    ///
    /// `CardError::InvalidContent` if the value cannot be represented
    /// as JSON.
    pub fn from_serialize(value: &impl Serialize) -> Result<CardContent, CardError> {
        let value = serde_json::to_value(value)
            .map_err(|e| CardError::InvalidContent(format!("not JSON-representable: {e}")))?;
        Ok(CardContent::Object(value))
    }

    /// Whether this content arrived as text.
    pub fn is_text(&self) -> bool {
        matches!(self, CardContent::Text(_))
    }

    /// Normalize to the canonical byte sequence digests are computed over.
    ///
    /// # Errors
    ///
    /// `CardError::InvalidContent` for null values and empty objects,
    /// `CardError::EmptyContent` when normalization yields zero bytes.
    pub fn into_canonical_bytes(self) -> Result<Vec<u8>, CardError> {
        let bytes = match self {
            CardContent::Bytes(bytes) => bytes,
            CardContent::Text(text) => text.into_bytes(),
            CardContent::Object(Value::Null) => {
                return Err(CardError::InvalidContent("null content".to_owned()))
            }
            CardContent::Object(Value::Object(map)) if map.is_empty() => {
                return Err(CardError::InvalidContent("empty object".to_owned()))
            }
            CardContent::Object(value) => serde_jcs::to_string(&value)
                .map_err(|e| CardError::InvalidContent(format!("canonicalization failed: {e}")))?
                .into_bytes(),
        };
        if bytes.is_empty() {
            return Err(CardError::EmptyContent);
        }
        Ok(bytes)
    }
}

impl From<&str> for CardContent {
    fn from(value: &str) -> Self {
        CardContent::Text(value.to_owned())
    }
}

impl From<String> for CardContent {
    fn from(value: String) -> Self {
        CardContent::Text(value)
    }
}

impl From<Vec<u8>> for CardContent {
    fn from(value: Vec<u8>) -> Self {
        CardContent::Bytes(value)
    }
}

impl From<&[u8]> for CardContent {
    fn from(value: &[u8]) -> Self {
        CardContent::Bytes(value.to_vec())
    }
}

impl From<Value> for CardContent {
    fn from(value: Value) -> Self {
        CardContent::Object(value)
    }
}
