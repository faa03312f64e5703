//! # cardbox-collection — Ingestion Protocol for the Cardbox Store
//!
//! Binds the card model to a storage engine and enforces the store's
//! ingestion invariants: duplicate detection, collision detection with
//! automatic algorithm upgrade, and event-card emission recording both
//! occurrences. Lookup, deletion, enumeration, and search pass through
//! to the engine with argument validation and a recomputed pagination
//! envelope.
//!
//! ## Crate Policy
//!
//! - Generic over any [`cardbox_engine::CardEngine`].
//! - Pure decisions are synchronous; only engine calls suspend.
//! - No `unsafe` code; no `panic!()` or `.unwrap()` outside tests.

pub mod collection;
pub mod error;

pub use collection::{Collection, CollectionConfig};
pub use error::CollectionError;
