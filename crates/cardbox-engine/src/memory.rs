//! # In-Memory Engine
//!
//! A map-backed engine for development and testing. Rows live in a
//! hash-keyed map with a separate insertion-order vector so enumeration
//! is stable; all writes take the write half of one `RwLock`, which
//! serializes `add` and gives readers point-in-time snapshots.

use std::collections::HashMap;

use async_trait::async_trait;
use cardbox_core::{Card, Page};
use tokio::sync::RwLock;

use crate::contract::{paginate, validate_page_args, CardEngine, EngineError};

/// One stored row, in its persisted form.
#[derive(Debug, Clone)]
struct Row {
    g_time: String,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct Rows {
    by_hash: HashMap<String, Row>,
    /// Hashes in insertion order; the enumeration order of the store.
    order: Vec<String>,
}

/// A volatile engine holding all rows in process memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    rows: RwLock<Rows>,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> MemoryEngine {
        MemoryEngine::default()
    }

    fn reconstruct(hash: &str, row: &Row) -> Result<Card, EngineError> {
        Card::from_row(row.content.clone(), hash.to_owned(), &row.g_time).map_err(EngineError::from)
    }
}

#[async_trait]
impl CardEngine for MemoryEngine {
    async fn add(&self, card: &Card) -> Result<(), EngineError> {
        let mut rows = self.rows.write().await;
        if rows.by_hash.contains_key(card.hash()) {
            return Err(EngineError::HashConflict(card.hash().to_owned()));
        }
        rows.by_hash.insert(
            card.hash().to_owned(),
            Row {
                g_time: card.g_time().as_str().to_owned(),
                content: card.content_bytes().to_vec(),
            },
        );
        rows.order.push(card.hash().to_owned());
        tracing::debug!(hash = %card.hash(), "row added");
        Ok(())
    }

    async fn get(&self, hash: &str) -> Result<Option<Card>, EngineError> {
        let rows = self.rows.read().await;
        rows.by_hash
            .get(hash)
            .map(|row| MemoryEngine::reconstruct(hash, row))
            .transpose()
    }

    async fn delete(&self, hash: &str) -> Result<bool, EngineError> {
        let mut rows = self.rows.write().await;
        let removed = rows.by_hash.remove(hash).is_some();
        if removed {
            rows.order.retain(|h| h != hash);
            tracing::debug!(hash, "row deleted");
        }
        Ok(removed)
    }

    async fn update(&self, hash: &str, content: &[u8]) -> Result<bool, EngineError> {
        let mut rows = self.rows.write().await;
        match rows.by_hash.get_mut(hash) {
            Some(row) => {
                row.content = content.to_vec();
                tracing::debug!(hash, "row content replaced");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<u64, EngineError> {
        Ok(self.rows.read().await.order.len() as u64)
    }

    async fn clear(&self) -> Result<(), EngineError> {
        let mut rows = self.rows.write().await;
        rows.by_hash.clear();
        rows.order.clear();
        Ok(())
    }

    async fn get_page(&self, page_number: u64, page_size: u64) -> Result<Page<Card>, EngineError> {
        let rows = self.rows.read().await;
        // Paginate the order vector first so only the page's rows are
        // reconstructed.
        let page = paginate(rows.order.clone(), page_number, page_size)?;
        let cards = page
            .items
            .iter()
            .filter_map(|hash| rows.by_hash.get(hash).map(|row| (hash, row)))
            .map(|(hash, row)| MemoryEngine::reconstruct(hash, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(cards, page.total_items, page_number, page_size))
    }

    async fn search_by_content(
        &self,
        query: &str,
        page_number: u64,
        page_size: u64,
    ) -> Result<Page<Card>, EngineError> {
        validate_page_args(page_number, page_size)?;
        let rows = self.rows.read().await;
        let mut matches = Vec::new();
        for hash in &rows.order {
            if let Some(row) = rows.by_hash.get(hash) {
                if String::from_utf8_lossy(&row.content).contains(query) {
                    matches.push(MemoryEngine::reconstruct(hash, row)?);
                }
            }
        }
        paginate(matches, page_number, page_size)
    }
}
