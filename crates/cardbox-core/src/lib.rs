//! # cardbox-core — Foundational Types for the Cardbox Store
//!
//! This crate is the bedrock of the Cardbox workspace. It defines the
//! card model and every pure service the ingestion pipeline composes:
//! the closed hash-algorithm hierarchy, the digest service, the global
//! timestamp stamper, canonical content normalization, the coarse
//! content-type classifier, event payloads, and the pagination envelope.
//! The other workspace crates depend on `cardbox-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One normalization pipeline.** Every digest is computed over
//!    bytes produced by `CardContent::into_canonical_bytes()`. Structured
//!    values reach byte form through RFC 8785 canonical JSON, so equal
//!    values digest equally across runs.
//!
//! 2. **Closed algorithm set.** `HashAlgorithm` is an enum totally
//!    ordered by digest length; `upgrade()` is the only way to move
//!    through the hierarchy, and it can only strengthen.
//!
//! 3. **Timestamps carry their algorithm.** A `GTime` binds the digest
//!    algorithm, a UTC microsecond instant, and a region tag into one
//!    validated wire string; a card's stamp always names the card's own
//!    algorithm.
//!
//! 4. **Everything here is pure.** No I/O, no suspension points; the
//!    asynchronous boundary of the store lies in `cardbox-engine`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cardbox-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod algorithm;
pub mod card;
pub mod content;
pub mod content_type;
pub mod digest;
pub mod error;
pub mod event;
pub mod gtime;
pub mod page;

// Re-export primary types for ergonomic imports.
pub use algorithm::{HashAlgorithm, NoStrongerAlgorithm};
pub use card::Card;
pub use content::CardContent;
pub use content_type::detect_content_type;
pub use digest::digest_hex;
pub use error::CardError;
pub use event::{collision_event, duplicate_event, CollisionEvent, DuplicateEvent};
pub use gtime::{is_iso_format, is_valid_hash_function, region_tag, set_region_tag, GTime};
pub use page::Page;
