//! # Card Model
//!
//! A card binds three pieces: canonical content bytes, the hex digest of
//! those bytes under a named algorithm, and a [`GTime`] stamp whose
//! algorithm field equals the card's algorithm.
//!
//! ## Invariants
//!
//! - Content is non-empty.
//! - `hash == digest_hex(hash_algorithm, content)` for freshly
//!   constructed cards. Cards reconstructed from persisted rows take
//!   `hash` and `g_time` as authoritative and are not re-digested.
//! - The stamp's algorithm field equals `hash_algorithm`.
//! - Cards are never mutated after construction; every field accessor
//!   borrows.
//!
//! ## Equality
//!
//! `Card` equality is digest equality, not byte equality. Two cards
//! with the same `hash` compare equal even if their bytes differ; the
//! collection layer is responsible for resolving that rare case as a
//! collision.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::algorithm::HashAlgorithm;
use crate::content::CardContent;
use crate::content_type::detect_content_type;
use crate::digest::digest_hex;
use crate::error::CardError;
use crate::gtime::GTime;

/// An immutable content-addressed card.
#[derive(Debug, Clone)]
pub struct Card {
    content: Vec<u8>,
    hash: String,
    hash_algorithm: HashAlgorithm,
    g_time: GTime,
    content_type: Option<&'static str>,
    text_origin: bool,
}

impl Card {
    /// Construct a fresh card under the default algorithm.
    ///
    /// # Errors
    ///
    /// Propagates normalization failures from
    /// [`CardContent::into_canonical_bytes`].
    pub fn new(content: impl Into<CardContent>) -> Result<Card, CardError> {
        Card::with_algorithm(content, HashAlgorithm::DEFAULT)
    }

    /// Construct a fresh card under a specific algorithm.
    ///
    /// The digest and the stamp are produced under the same algorithm,
    /// from the same canonical bytes.
    pub fn with_algorithm(
        content: impl Into<CardContent>,
        algorithm: HashAlgorithm,
    ) -> Result<Card, CardError> {
        let content = content.into();
        let text_origin = content.is_text();
        let bytes = content.into_canonical_bytes()?;
        let hash = digest_hex(algorithm, &bytes);
        let g_time = GTime::stamp_now(algorithm);
        Ok(Card {
            content: bytes,
            hash,
            hash_algorithm: algorithm,
            g_time,
            content_type: None,
            text_origin,
        })
    }

    /// Reconstruct a card from a persisted row.
    ///
    /// The stored `hash` and `g_time` are authoritative: the content is
    /// NOT re-digested, which is what lets the store hold rows whose
    /// digest no longer matches their bytes after an explicit `update`.
    /// A coarse content type is detected and attached.
    ///
    /// # Errors
    ///
    /// `CardError::InvalidContent` for empty content,
    /// `CardError::InvalidArgument` for an empty hash or malformed
    /// `g_time`, `CardError::UnknownAlgorithm` for a stamp naming an
    /// algorithm outside the closed set.
    pub fn from_row(content: Vec<u8>, hash: String, g_time: &str) -> Result<Card, CardError> {
        if content.is_empty() {
            return Err(CardError::InvalidContent(
                "persisted row has empty content".to_owned(),
            ));
        }
        if hash.is_empty() {
            return Err(CardError::InvalidArgument(
                "persisted row has empty hash".to_owned(),
            ));
        }
        let g_time = GTime::parse(g_time)?;
        let hash_algorithm = g_time.algorithm();
        let content_type = Some(detect_content_type(&content));
        Ok(Card {
            content,
            hash,
            hash_algorithm,
            g_time,
            content_type,
            text_origin: false,
        })
    }

    /// The canonical content bytes.
    pub fn content_bytes(&self) -> &[u8] {
        &self.content
    }

    /// The content decoded as text.
    ///
    /// Available only when the card was constructed from text, or when
    /// its detected content type is `text/*`; `None` otherwise.
    pub fn content_as_text(&self) -> Option<&str> {
        let textual = self.text_origin
            || self
                .content_type
                .is_some_and(|mime| mime.starts_with("text/"));
        if textual {
            std::str::from_utf8(&self.content).ok()
        } else {
            None
        }
    }

    /// The lowercase hex digest of the content.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The algorithm the digest was computed under.
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// The global timestamp stamped at construction.
    pub fn g_time(&self) -> &GTime {
        &self.g_time
    }

    /// The coarse MIME tag. Present only on cards reconstructed from
    /// persisted rows.
    pub fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }

    /// Digest-equality comparison; alias of `==`.
    pub fn equals(&self, other: &Card) -> bool {
        self == other
    }

    /// A serializable map form of the card.
    ///
    /// Content is rendered as text when it is valid UTF-8 and as
    /// lowercase hex otherwise.
    pub fn to_dict(&self) -> serde_json::Value {
        let content = match std::str::from_utf8(&self.content) {
            Ok(text) => serde_json::Value::String(text.to_owned()),
            Err(_) => serde_json::Value::String(hex::encode(&self.content)),
        };
        serde_json::json!({
            "content": content,
            "hash": self.hash,
            "hash_algorithm": self.hash_algorithm.name(),
            "g_time": self.g_time.as_str(),
            "content_type": self.content_type,
        })
    }
}

/// Digest equality. See the module docs for why this is not byte
/// equality.
impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Card {}

impl std::hash::Hash for Card {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let content = match std::str::from_utf8(&self.content) {
            Ok(text) => text.to_owned(),
            Err(_) => hex::encode(&self.content),
        };
        let mut state = serializer.serialize_struct("Card", 5)?;
        state.serialize_field("content", &content)?;
        state.serialize_field("hash", &self.hash)?;
        state.serialize_field("hash_algorithm", self.hash_algorithm.name())?;
        state.serialize_field("g_time", self.g_time.as_str())?;
        state.serialize_field("content_type", &self.content_type)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_text_card_under_sha256() {
        let card = Card::with_algorithm("Hello, World!", HashAlgorithm::Sha256).unwrap();
        assert_eq!(card.content_bytes(), b"Hello, World!");
        assert_eq!(
            card.hash(),
            "dffd6021bb2bd95b959f82018502e81053a05c87c77d08a4fc97285e4bac3fe8"
        );
        assert_eq!(card.hash().len(), 64);
        assert_eq!(card.hash_algorithm(), HashAlgorithm::Sha256);
        assert!(card.g_time().as_str().starts_with("sha256|"));
        assert_eq!(card.content_type(), None);
    }

    #[test]
    fn fresh_object_card_uses_canonical_json() {
        let card = Card::new(CardContent::Object(json!({"key": "value"}))).unwrap();
        assert_eq!(card.content_bytes(), br#"{"key":"value"}"#);
    }

    #[test]
    fn default_algorithm_is_sha256() {
        let card = Card::new("payload").unwrap();
        assert_eq!(card.hash_algorithm(), HashAlgorithm::Sha256);
    }

    #[test]
    fn empty_object_and_null_are_rejected() {
        assert!(matches!(
            Card::new(CardContent::Object(json!({}))),
            Err(CardError::InvalidContent(_))
        ));
        assert!(matches!(
            Card::new(CardContent::Object(serde_json::Value::Null)),
            Err(CardError::InvalidContent(_))
        ));
    }

    #[test]
    fn stamp_algorithm_matches_card_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let card = Card::with_algorithm("invariant", algorithm).unwrap();
            assert_eq!(card.g_time().algorithm(), card.hash_algorithm());
        }
    }

    #[test]
    fn same_input_same_digest() {
        let a = Card::with_algorithm("deterministic", HashAlgorithm::Sha512).unwrap();
        let b = Card::with_algorithm("deterministic", HashAlgorithm::Sha512).unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash_algorithm(), b.hash_algorithm());
    }

    #[test]
    fn equality_is_digest_equality() {
        let a = Card::new("same").unwrap();
        let b = Card::new("same").unwrap();
        let c = Card::new("different").unwrap();
        assert_eq!(a, b);
        assert!(a.equals(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn from_row_detects_png() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&[0u8; 8]);
        let card =
            Card::from_row(bytes, "abc".to_owned(), "md5|2023-01-01T12:00:00.000000Z|UTC").unwrap();
        assert_eq!(card.content_type(), Some("image/png"));
        assert_eq!(card.hash_algorithm(), HashAlgorithm::Md5);
        assert_eq!(card.hash(), "abc");
    }

    #[test]
    fn from_row_takes_hash_as_authoritative() {
        // No re-digestion: the stored hash survives even though it is
        // not the digest of the bytes.
        let card = Card::from_row(
            b"anything".to_vec(),
            "not-a-real-digest".to_owned(),
            "sha256|2023-01-01T12:00:00.000000Z|UTC",
        )
        .unwrap();
        assert_eq!(card.hash(), "not-a-real-digest");
    }

    #[test]
    fn from_row_rejects_bad_arguments() {
        assert!(matches!(
            Card::from_row(Vec::new(), "h".into(), "sha256|2023-01-01T12:00:00.000000Z|UTC"),
            Err(CardError::InvalidContent(_))
        ));
        assert!(matches!(
            Card::from_row(b"x".to_vec(), String::new(), "sha256|2023-01-01T12:00:00.000000Z|UTC"),
            Err(CardError::InvalidArgument(_))
        ));
        assert!(matches!(
            Card::from_row(b"x".to_vec(), "h".into(), "garbage"),
            Err(CardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn text_card_exposes_text_accessor() {
        let card = Card::new("readable").unwrap();
        assert_eq!(card.content_as_text(), Some("readable"));
    }

    #[test]
    fn byte_card_hides_text_accessor() {
        let card = Card::new(CardContent::Bytes(b"readable".to_vec())).unwrap();
        assert_eq!(card.content_as_text(), None);
    }

    #[test]
    fn reconstructed_text_row_exposes_text_accessor() {
        let card = Card::from_row(
            b"plain words".to_vec(),
            "h".to_owned(),
            "sha256|2023-01-01T12:00:00.000000Z|UTC",
        )
        .unwrap();
        assert_eq!(card.content_type(), Some("text/plain"));
        assert_eq!(card.content_as_text(), Some("plain words"));
    }

    #[test]
    fn to_dict_carries_every_field() {
        let card = Card::new("dictionary").unwrap();
        let dict = card.to_dict();
        assert_eq!(dict["content"], "dictionary");
        assert_eq!(dict["hash"], card.hash());
        assert_eq!(dict["hash_algorithm"], "sha256");
        assert_eq!(dict["g_time"], card.g_time().as_str());
        assert!(dict["content_type"].is_null());
    }

    #[test]
    fn to_dict_hex_encodes_binary_content() {
        let card = Card::new(CardContent::Bytes(vec![0xff, 0x00, 0x7f])).unwrap();
        assert_eq!(card.to_dict()["content"], "ff007f");
    }
}
