//! # cardbox-engine — Storage Engines for the Cardbox Store
//!
//! Defines the narrow async persistence contract the collection
//! consumes ([`CardEngine`]) and two implementations of it:
//!
//! - **[`MemoryEngine`]** (`memory.rs`): map-backed, volatile, suitable
//!   for development and tests.
//! - **[`SqliteEngine`]** (`sqlite.rs`): SQLx-backed relational
//!   persistence with the reference `card` table and the
//!   `ensure_unique_hash` trigger.
//!
//! ## Contract Highlights
//!
//! Rows are keyed by hash and unique; `add` fails with
//! [`EngineError::HashConflict`] on a duplicate key and leaves the
//! interpretation to the caller. Enumeration is stable in insertion
//! order. Both engines serialize `add` at the boundary, so racing
//! ingestions of the same content resolve to exactly one inserted row.
//!
//! ## Crate Policy
//!
//! - Depends only on `cardbox-core` internally.
//! - Engines never mutate a stored card's bytes except through the
//!   explicit `update` operation.
//! - No `unsafe` code; no `panic!()` or `.unwrap()` outside tests.

pub mod contract;
pub mod memory;
pub mod sqlite;

pub use contract::{paginate, validate_page_args, CardEngine, EngineError};
pub use memory::MemoryEngine;
pub use sqlite::SqliteEngine;
