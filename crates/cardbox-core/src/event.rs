//! # Event Payloads
//!
//! Structured payloads recording the two anomalies the ingestion
//! protocol can detect: a *duplicate* (byte-identical content offered
//! twice) and a *collision* (two distinct byte strings digesting to the
//! same hash under the same algorithm).
//!
//! Payloads carry enough to trace the affected hashes and algorithms
//! but never the raw content bytes. Wrapped as cards they are digested
//! under the default algorithm like any other structured content.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::content::CardContent;
use crate::error::CardError;
use crate::gtime;

/// Wire value of `event_type` for duplicate events.
pub const DUPLICATE_EVENT: &str = "duplicate";

/// Wire value of `event_type` for collision events.
pub const COLLISION_EVENT: &str = "collision";

/// Payload emitted when ingestion sees byte-identical content for an
/// already stored card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateEvent {
    /// Always [`DUPLICATE_EVENT`].
    pub event_type: String,
    /// ISO8601 UTC instant the duplicate was observed.
    pub timestamp: String,
    /// The hash of the already stored card.
    pub hashes: Vec<String>,
    /// The algorithm of the already stored card.
    pub algorithm: String,
    /// Human-readable trace context.
    pub context: String,
}

impl DuplicateEvent {
    /// Build the payload for a duplicate of `original`.
    pub fn for_card(original: &Card) -> DuplicateEvent {
        DuplicateEvent {
            event_type: DUPLICATE_EVENT.to_owned(),
            timestamp: gtime::now_iso_micros(),
            hashes: vec![original.hash().to_owned()],
            algorithm: original.hash_algorithm().name().to_owned(),
            context: "content already stored under this hash".to_owned(),
        }
    }

    /// The payload as card content, routed through the canonical
    /// serialization pipeline.
    pub fn into_content(self) -> Result<CardContent, CardError> {
        CardContent::from_serialize(&self)
    }
}

/// Payload emitted when ingestion detects a digest collision and stores
/// the new content under an upgraded algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Always [`COLLISION_EVENT`].
    pub event_type: String,
    /// ISO8601 UTC instant the collision was observed.
    pub timestamp: String,
    /// The colliding stored hash followed by the upgraded card's hash.
    pub hashes: Vec<String>,
    /// The colliding algorithm followed by the upgraded algorithm.
    pub algorithms: Vec<String>,
    /// Human-readable trace context.
    pub context: String,
}

impl CollisionEvent {
    /// Build the payload for a collision between `existing` and the
    /// freshly stored `upgraded` card.
    pub fn for_cards(upgraded: &Card, existing: &Card) -> CollisionEvent {
        CollisionEvent {
            event_type: COLLISION_EVENT.to_owned(),
            timestamp: gtime::now_iso_micros(),
            hashes: vec![existing.hash().to_owned(), upgraded.hash().to_owned()],
            algorithms: vec![
                existing.hash_algorithm().name().to_owned(),
                upgraded.hash_algorithm().name().to_owned(),
            ],
            context: "digest collision; content re-stored under a stronger algorithm".to_owned(),
        }
    }

    /// The payload as card content, routed through the canonical
    /// serialization pipeline.
    pub fn into_content(self) -> Result<CardContent, CardError> {
        CardContent::from_serialize(&self)
    }
}

/// The duplicate payload for `original` as a JSON string.
pub fn duplicate_event(original: &Card) -> Result<String, CardError> {
    serde_json::to_string(&DuplicateEvent::for_card(original))
        .map_err(|e| CardError::InvalidContent(format!("event serialization failed: {e}")))
}

/// The collision payload for `upgraded`/`existing` as a JSON string.
pub fn collision_event(upgraded: &Card, existing: &Card) -> Result<String, CardError> {
    serde_json::to_string(&CollisionEvent::for_cards(upgraded, existing))
        .map_err(|e| CardError::InvalidContent(format!("event serialization failed: {e}")))
}
