//! # Hash Algorithm Hierarchy
//!
//! Defines the closed set of digest algorithms a card may be hashed
//! under, totally ordered by digest length. The ordering is what makes
//! collision recovery well-defined: when two distinct byte strings
//! produce the same digest under an algorithm, the store re-digests the
//! new content under `upgrade(a)`, the next stronger member of the set.
//!
//! ## Invariant
//!
//! The variant declaration order matches the digest-length order
//! (16 < 20 < 28 < 32 < 48 < 64 bytes), so the derived `Ord` agrees
//! with `digest_len()`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CardError;

/// The closed set of supported digest algorithms, weakest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5, 16-byte digest. Legacy only; first upgrade target is SHA-1.
    Md5,
    /// SHA-1, 20-byte digest.
    Sha1,
    /// SHA-224, 28-byte digest.
    Sha224,
    /// SHA-256, 32-byte digest. The default ingestion algorithm.
    #[default]
    Sha256,
    /// SHA-384, 48-byte digest.
    Sha384,
    /// SHA-512, 64-byte digest. Strongest member; has no upgrade.
    Sha512,
}

/// Requested an upgrade past the strongest algorithm in the set.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no stronger algorithm above '{0}'")]
pub struct NoStrongerAlgorithm(pub HashAlgorithm);

impl HashAlgorithm {
    /// The algorithm used when a caller does not name one, and the
    /// algorithm every event card is digested under.
    pub const DEFAULT: HashAlgorithm = HashAlgorithm::Sha256;

    /// Every member of the set, weakest first.
    pub const ALL: [HashAlgorithm; 6] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Digest length in bytes. This table is the source of truth for
    /// the strictness check applied after a collision upgrade.
    pub const fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Length of the lowercase hex rendering of a digest.
    pub const fn hex_len(self) -> usize {
        self.digest_len() * 2
    }

    /// The lowercase wire name of the algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// The next stronger algorithm in the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`NoStrongerAlgorithm`] when called on the strongest member.
    pub fn upgrade(self) -> Result<HashAlgorithm, NoStrongerAlgorithm> {
        match self {
            HashAlgorithm::Md5 => Ok(HashAlgorithm::Sha1),
            HashAlgorithm::Sha1 => Ok(HashAlgorithm::Sha224),
            HashAlgorithm::Sha224 => Ok(HashAlgorithm::Sha256),
            HashAlgorithm::Sha256 => Ok(HashAlgorithm::Sha384),
            HashAlgorithm::Sha384 => Ok(HashAlgorithm::Sha512),
            HashAlgorithm::Sha512 => Err(NoStrongerAlgorithm(self)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(CardError::UnknownAlgorithm(other.to_owned())),
        }
    }
}
