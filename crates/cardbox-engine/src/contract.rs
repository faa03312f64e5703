//! # Storage Engine Contract
//!
//! The narrow persistence interface the collection relies on. An engine
//! stores `(hash, g_time, content)` rows keyed by hash and must uphold:
//!
//! - hash uniqueness: a second insert of an existing hash fails with
//!   [`EngineError::HashConflict`]; interpreting the conflict is the
//!   collection's job, never the engine's;
//! - durability: a successful `add` has reached the storage medium;
//! - stable enumeration: `get_page` order does not change between
//!   calls in the absence of writes;
//! - snapshot reads: concurrent readers see a point-in-time view.
//!
//! All operations are async; engines backed by I/O suspend here and
//! nowhere else in the pipeline.

use async_trait::async_trait;
use cardbox_core::{Card, CardError, Page};
use thiserror::Error;

/// Errors raised at the storage boundary.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A row with this hash already exists.
    #[error("card with this hash already exists: {0}")]
    HashConflict(String),

    /// Requested a page past the end of a non-empty result set.
    #[error("page {page_number} is out of range: only {total_pages} pages exist")]
    PageOutOfRange {
        /// The requested 1-based page number.
        page_number: u64,
        /// How many pages the result set actually has.
        total_pages: u64,
    },

    /// A pagination parameter outside its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A stored row failed card reconstruction.
    #[error("stored row could not be reconstructed: {0}")]
    Corrupt(#[from] CardError),

    /// The underlying storage medium failed.
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

/// The persistence capability set consumed by the collection.
#[async_trait]
pub trait CardEngine: Send + Sync {
    /// Insert a card's `(hash, g_time, content)` row.
    ///
    /// # Errors
    ///
    /// [`EngineError::HashConflict`] when the hash is already present.
    async fn add(&self, card: &Card) -> Result<(), EngineError>;

    /// Fetch the card stored under `hash`, reconstructed via
    /// [`Card::from_row`]. `None` when absent.
    async fn get(&self, hash: &str) -> Result<Option<Card>, EngineError>;

    /// Remove the row under `hash`. Returns whether a row was removed;
    /// deleting a missing hash is not an error.
    async fn delete(&self, hash: &str) -> Result<bool, EngineError>;

    /// Replace the bytes stored under `hash` without touching the hash
    /// or the stamp. The digest is not re-verified. Returns whether a
    /// row was updated.
    async fn update(&self, hash: &str, content: &[u8]) -> Result<bool, EngineError>;

    /// Exact number of stored rows.
    async fn count(&self) -> Result<u64, EngineError>;

    /// Remove all rows.
    async fn clear(&self) -> Result<(), EngineError>;

    /// One page of all rows in insertion order.
    ///
    /// # Errors
    ///
    /// [`EngineError::PageOutOfRange`] when `page_number > total_pages`
    /// and the store is non-empty.
    async fn get_page(&self, page_number: u64, page_size: u64) -> Result<Page<Card>, EngineError>;

    /// Alias of [`CardEngine::get_page`].
    async fn get_all(&self, page_number: u64, page_size: u64) -> Result<Page<Card>, EngineError> {
        self.get_page(page_number, page_size).await
    }

    /// Rows whose content, read as UTF-8 with lossy fallback, contains
    /// `query` as a substring; paginated like `get_page`.
    async fn search_by_content(
        &self,
        query: &str,
        page_number: u64,
        page_size: u64,
    ) -> Result<Page<Card>, EngineError>;
}

/// Reject out-of-domain pagination parameters.
pub fn validate_page_args(page_number: u64, page_size: u64) -> Result<(), EngineError> {
    if page_number < 1 {
        return Err(EngineError::InvalidArgument(
            "page_number must be >= 1".to_owned(),
        ));
    }
    if page_size < 1 {
        return Err(EngineError::InvalidArgument(
            "page_size must be >= 1".to_owned(),
        ));
    }
    Ok(())
}

/// Slice an already ordered, fully materialized result set into a page
/// envelope, enforcing the out-of-range rule.
pub fn paginate<T>(items: Vec<T>, page_number: u64, page_size: u64) -> Result<Page<T>, EngineError> {
    validate_page_args(page_number, page_size)?;
    let total_items = items.len() as u64;
    if total_items == 0 {
        return Ok(Page::empty(page_number, page_size));
    }
    let total_pages = total_items.div_ceil(page_size);
    if page_number > total_pages {
        return Err(EngineError::PageOutOfRange {
            page_number,
            total_pages,
        });
    }
    let start = ((page_number - 1) * page_size) as usize;
    let end = (start + page_size as usize).min(items.len());
    let page_items = items
        .into_iter()
        .skip(start)
        .take(end - start)
        .collect();
    Ok(Page::new(page_items, total_items, page_number, page_size))
}
