//! # Digest Service
//!
//! Computes lowercase hex digests of byte strings under any member of
//! the closed [`HashAlgorithm`] set. All six algorithms dispatch through
//! the RustCrypto `Digest` trait, so the per-algorithm arms differ only
//! in the hasher type.
//!
//! Digest computation is pure and never suspends; the asynchronous
//! boundary of the store lies entirely at the storage engine.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::algorithm::HashAlgorithm;

/// Compute the lowercase hex digest of `data` under `algorithm`.
///
/// The returned string has exactly [`HashAlgorithm::hex_len`] characters.
pub fn digest_hex(algorithm: HashAlgorithm, data: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Md5 => hex::encode(Md5::digest(data)),
        HashAlgorithm::Sha1 => hex::encode(Sha1::digest(data)),
        HashAlgorithm::Sha224 => hex::encode(Sha224::digest(data)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        HashAlgorithm::Sha384 => hex::encode(Sha384::digest(data)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
    }
}
