//! # Pagination Envelope
//!
//! The envelope returned by enumeration and search. All derived fields
//! are computed in one place so every engine and the collection agree
//! on the page math:
//!
//! - `total_pages = ceil(total_items / page_size)` when `total_items > 0`,
//!   else `0`;
//! - `has_next ⇔ page_number < total_pages`;
//! - `has_previous ⇔ page_number > 1`;
//! - `next_page`/`previous_page` are the adjacent page numbers when they
//!   exist, `None` otherwise.

use serde::Serialize;

/// One page of an ordered result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The items on this page, in enumeration order.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total_items: u64,
    /// 1-based page number this envelope describes.
    pub page_number: u64,
    /// Requested page size.
    pub page_size: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
    /// The next page number, when `has_next`.
    pub next_page: Option<u64>,
    /// The previous page number, when `has_previous`.
    pub previous_page: Option<u64>,
}

impl<T> Page<T> {
    /// Build the envelope, deriving every dependent field.
    ///
    /// `page_size` must be positive; callers validate before paginating.
    pub fn new(items: Vec<T>, total_items: u64, page_number: u64, page_size: u64) -> Page<T> {
        let total_pages = if total_items > 0 && page_size > 0 {
            total_items.div_ceil(page_size)
        } else {
            0
        };
        let has_next = page_number < total_pages;
        let has_previous = page_number > 1;
        Page {
            items,
            total_items,
            page_number,
            page_size,
            total_pages,
            has_next,
            has_previous,
            next_page: has_next.then_some(page_number + 1),
            previous_page: has_previous.then_some(page_number - 1),
        }
    }

    /// An empty envelope for a query with no matches.
    pub fn empty(page_number: u64, page_size: u64) -> Page<T> {
        Page::new(Vec::new(), 0, page_number, page_size)
    }
}
