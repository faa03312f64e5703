//! # Collection — Ingestion Protocol
//!
//! The collection enforces the store's ingestion invariants above any
//! [`CardEngine`]:
//!
//! - **Insert** (unseen hash): the card is stored and its own hash
//!   returned.
//! - **Duplicate** (stored bytes equal incoming bytes): the stored card
//!   is untouched, a duplicate event card is written, and the *event
//!   card's* hash is returned.
//! - **Collision** (stored bytes differ from incoming bytes under the
//!   same hash): the incoming content is re-digested under the next
//!   stronger algorithm and stored, then a collision event card
//!   referencing both algorithms is written, and the event card's hash
//!   is returned.
//!
//! The engine's uniqueness guard and the collection's lookup are
//! redundant on purpose: a `HashConflict` from the initial insert
//! re-enters the decision instead of being swallowed.
//!
//! The collection holds no mutable state of its own; every suspension
//! point is an engine call, and within one ingestion the event card is
//! always written after the card that triggered it.

use cardbox_core::{Card, CardContent, CollisionEvent, DuplicateEvent, Page};
use cardbox_engine::{paginate, CardEngine, EngineError};

use crate::error::CollectionError;

/// Page size used when the collection scans the full enumeration.
const SCAN_PAGE_SIZE: u64 = 256;

/// Behavior switches for the ingestion protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionConfig {
    /// After a collision is recorded, delete the original
    /// weaker-algorithm row. Off by default: both versions of the
    /// content stay discoverable under their respective digests.
    pub drop_weaker_on_collision: bool,
}

/// The ingestion protocol bound to a storage engine.
#[derive(Debug)]
pub struct Collection<E> {
    engine: E,
    config: CollectionConfig,
}

impl<E: CardEngine> Collection<E> {
    /// Bind the protocol to `engine` with default configuration.
    pub fn new(engine: E) -> Collection<E> {
        Collection {
            engine,
            config: CollectionConfig::default(),
        }
    }

    /// Bind the protocol to `engine` with explicit configuration.
    pub fn with_config(engine: E, config: CollectionConfig) -> Collection<E> {
        Collection { engine, config }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Ingest a card and return the hash the caller should retain: the
    /// card's own hash on a plain insert, the event card's hash on a
    /// duplicate or collision.
    ///
    /// # Errors
    ///
    /// [`CollectionError::NoStrongerAlgorithm`] and
    /// [`CollectionError::UpgradeFailed`] from the collision branch;
    /// engine failures surface unchanged. When this returns an error,
    /// no event card has been written for the attempt.
    pub async fn add(&self, card: &Card) -> Result<String, CollectionError> {
        // Two passes: a HashConflict from the insert means a row
        // appeared after the lookup, so re-read and re-decide once.
        for _ in 0..2 {
            match self.engine.get(card.hash()).await? {
                None => match self.engine.add(card).await {
                    Ok(()) => {
                        tracing::debug!(hash = %card.hash(), "card stored");
                        return Ok(card.hash().to_owned());
                    }
                    Err(EngineError::HashConflict(_)) => {
                        tracing::debug!(hash = %card.hash(), "insert raced an existing row");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                },
                Some(existing) => {
                    return if existing.content_bytes() == card.content_bytes() {
                        self.record_duplicate(&existing).await
                    } else {
                        self.record_collision(card, &existing).await
                    };
                }
            }
        }
        Err(CollectionError::Engine(EngineError::HashConflict(
            card.hash().to_owned(),
        )))
    }

    async fn record_duplicate(&self, existing: &Card) -> Result<String, CollectionError> {
        let payload = DuplicateEvent::for_card(existing);
        let event_card = Card::new(payload.into_content()?)?;
        self.engine.add(&event_card).await?;
        tracing::info!(
            hash = %existing.hash(),
            event = %event_card.hash(),
            "duplicate ingestion recorded"
        );
        Ok(event_card.hash().to_owned())
    }

    async fn record_collision(
        &self,
        incoming: &Card,
        existing: &Card,
    ) -> Result<String, CollectionError> {
        let current = incoming.hash_algorithm();
        let upgraded_algorithm = current.upgrade()?;
        let upgraded = Card::with_algorithm(
            CardContent::Bytes(incoming.content_bytes().to_vec()),
            upgraded_algorithm,
        )?;
        if upgraded.hash_algorithm() == current
            || upgraded.hash_algorithm().digest_len() <= current.digest_len()
        {
            return Err(CollectionError::UpgradeFailed {
                from: current,
                to: upgraded.hash_algorithm(),
            });
        }

        match self.engine.add(&upgraded).await {
            Ok(()) => {}
            Err(EngineError::HashConflict(_)) => {
                // An ingestion cancelled between the card and event
                // writes can leave this row behind. Identical bytes:
                // resume with the event. Different bytes: surface.
                match self.engine.get(upgraded.hash()).await? {
                    Some(present) if present.content_bytes() == upgraded.content_bytes() => {
                        tracing::warn!(
                            hash = %upgraded.hash(),
                            "upgraded card already present; resuming event emission"
                        );
                    }
                    _ => {
                        return Err(CollectionError::Engine(EngineError::HashConflict(
                            upgraded.hash().to_owned(),
                        )))
                    }
                }
            }
            Err(e) => return Err(e.into()),
        }

        let payload = CollisionEvent::for_cards(&upgraded, existing);
        let event_card = Card::new(payload.into_content()?)?;
        self.engine.add(&event_card).await?;
        tracing::info!(
            existing = %existing.hash(),
            upgraded = %upgraded.hash(),
            algorithm = %upgraded.hash_algorithm(),
            event = %event_card.hash(),
            "collision recorded"
        );

        if self.config.drop_weaker_on_collision {
            self.engine.delete(existing.hash()).await?;
            tracing::debug!(hash = %existing.hash(), "weaker original dropped");
        }

        Ok(event_card.hash().to_owned())
    }

    /// Fetch a card by hash.
    pub async fn get(&self, hash: &str) -> Result<Option<Card>, CollectionError> {
        Ok(self.engine.get(hash).await?)
    }

    /// Delete a card by hash; false when absent.
    pub async fn delete(&self, hash: &str) -> Result<bool, CollectionError> {
        Ok(self.engine.delete(hash).await?)
    }

    /// Exact number of stored cards, events included.
    pub async fn count(&self) -> Result<u64, CollectionError> {
        Ok(self.engine.count().await?)
    }

    /// Remove every stored card.
    pub async fn clear(&self) -> Result<(), CollectionError> {
        Ok(self.engine.clear().await?)
    }

    /// One page of all cards in insertion order.
    pub async fn get_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> Result<Page<Card>, CollectionError> {
        check_page_args(page_number, page_size)?;
        let page = self.engine.get_page(page_number, page_size).await?;
        Ok(Page::new(page.items, page.total_items, page_number, page_size))
    }

    /// Alias of [`Collection::get_page`].
    pub async fn get_all(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> Result<Page<Card>, CollectionError> {
        self.get_page(page_number, page_size).await
    }

    /// Cards whose hash equals `hash`, paginated. Filtering happens on
    /// this side of the engine boundary over the full enumeration.
    pub async fn search_by_hash(
        &self,
        hash: &str,
        page_number: u64,
        page_size: u64,
    ) -> Result<Page<Card>, CollectionError> {
        if hash.is_empty() {
            return Err(CollectionError::InvalidArgument(
                "search hash must be non-empty".to_owned(),
            ));
        }
        check_page_args(page_number, page_size)?;

        let mut matches = Vec::new();
        let mut scan = 1;
        loop {
            let page = self.engine.get_all(scan, SCAN_PAGE_SIZE).await?;
            let has_next = page.has_next;
            matches.extend(page.items.into_iter().filter(|card| card.hash() == hash));
            if !has_next {
                break;
            }
            scan += 1;
        }
        Ok(paginate(matches, page_number, page_size)?)
    }

    /// Cards whose content contains `query`, delegated to the engine.
    pub async fn search_by_content(
        &self,
        query: &str,
        page_number: u64,
        page_size: u64,
    ) -> Result<Page<Card>, CollectionError> {
        if query.is_empty() {
            return Err(CollectionError::InvalidArgument(
                "search query must be non-empty".to_owned(),
            ));
        }
        check_page_args(page_number, page_size)?;
        Ok(self
            .engine
            .search_by_content(query, page_number, page_size)
            .await?)
    }

    /// Replace the bytes stored under `hash`; false when absent.
    ///
    /// The row keeps its hash and stamp, so after this call the stored
    /// digest no longer matches the stored bytes. Provided for host
    /// applications; use with care.
    pub async fn update(&self, hash: &str, content: &[u8]) -> Result<bool, CollectionError> {
        match self.engine.get(hash).await? {
            None => Ok(false),
            Some(_) => Ok(self.engine.update(hash, content).await?),
        }
    }
}

fn check_page_args(page_number: u64, page_size: u64) -> Result<(), CollectionError> {
    if page_number < 1 {
        return Err(CollectionError::InvalidArgument(
            "page_number must be >= 1".to_owned(),
        ));
    }
    if page_size < 1 {
        return Err(CollectionError::InvalidArgument(
            "page_size must be >= 1".to_owned(),
        ));
    }
    Ok(())
}
