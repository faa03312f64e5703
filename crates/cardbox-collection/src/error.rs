//! # Collection Errors
//!
//! The ingestion protocol composes the card model and a storage engine;
//! its error type wraps both layers and adds the two failures only the
//! protocol itself can detect: an exhausted algorithm hierarchy and an
//! upgrade that did not strengthen the digest.

use cardbox_core::{CardError, HashAlgorithm, NoStrongerAlgorithm};
use cardbox_engine::EngineError;
use thiserror::Error;

/// Errors raised by collection operations.
#[derive(Error, Debug)]
pub enum CollectionError {
    /// Card construction or validation failed.
    #[error(transparent)]
    Card(#[from] CardError),

    /// The storage engine failed or refused the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A collision occurred under the strongest algorithm; there is
    /// nothing to upgrade to.
    #[error(transparent)]
    NoStrongerAlgorithm(#[from] NoStrongerAlgorithm),

    /// The upgraded algorithm did not produce a strictly longer digest.
    /// Guards an ill-ordered hierarchy.
    #[error("upgrade from '{from}' to '{to}' did not strengthen the digest")]
    UpgradeFailed {
        /// The algorithm the collision occurred under.
        from: HashAlgorithm,
        /// The algorithm the upgrade produced.
        to: HashAlgorithm,
    },

    /// A malformed caller argument: empty hash or query string, or an
    /// out-of-domain pagination parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
