//! # Error Types — Card Construction and Validation Failures
//!
//! Defines the error types raised by the card model and its supporting
//! services. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.
//!
//! ## Design
//!
//! - Validation errors are raised synchronously by the operation that
//!   detected them and are never recorded as store-level events.
//! - Content errors distinguish *unsupported* input (`InvalidContent`)
//!   from input that normalizes to nothing (`EmptyContent`).

use thiserror::Error;

/// Errors raised while constructing or validating a card.
#[derive(Error, Debug)]
pub enum CardError {
    /// The input content cannot be represented as card bytes:
    /// a null value, an empty object, or a rejected input shape.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// The input normalized to a zero-byte sequence. Cards must carry
    /// at least one byte of content.
    #[error("content normalized to zero bytes")]
    EmptyContent,

    /// An algorithm name outside the closed algorithm set.
    #[error("unknown hash algorithm '{0}'")]
    UnknownAlgorithm(String),

    /// A malformed argument: empty hash, malformed global timestamp,
    /// or an out-of-domain pagination parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
