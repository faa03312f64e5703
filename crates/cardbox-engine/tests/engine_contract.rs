//! # Engine Contract Conformance Tests
//!
//! Every engine must uphold the same contract; these tests run one
//! shared body against both the in-memory and the SQLite engine, plus
//! a handful of SQLite-only durability checks.

use cardbox_core::{Card, CardContent};
use cardbox_engine::{CardEngine, EngineError, MemoryEngine, SqliteEngine};

fn card(text: &str) -> Card {
    Card::new(text).unwrap()
}

/// `RUST_LOG=debug cargo test` shows the engine traces on failure.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// ---------------------------------------------------------------------------
// Shared contract body
// ---------------------------------------------------------------------------

async fn add_then_get_round_trips(engine: &dyn CardEngine) {
    let stored = card("round trip");
    engine.add(&stored).await.unwrap();

    let fetched = engine.get(stored.hash()).await.unwrap().unwrap();
    assert_eq!(fetched.content_bytes(), stored.content_bytes());
    assert_eq!(fetched.hash(), stored.hash());
    assert_eq!(fetched.hash_algorithm(), stored.hash_algorithm());
    assert_eq!(fetched.g_time(), stored.g_time());
    // Reconstructed cards carry a detected content type.
    assert_eq!(fetched.content_type(), Some("text/plain"));
}

async fn second_add_conflicts(engine: &dyn CardEngine) {
    let stored = card("conflict me");
    engine.add(&stored).await.unwrap();
    let err = engine.add(&stored).await.unwrap_err();
    assert!(matches!(err, EngineError::HashConflict(hash) if hash == stored.hash()));
}

async fn delete_is_idempotent(engine: &dyn CardEngine) {
    let stored = card("delete me");
    engine.add(&stored).await.unwrap();
    assert!(engine.delete(stored.hash()).await.unwrap());
    assert!(!engine.delete(stored.hash()).await.unwrap());
    assert!(engine.get(stored.hash()).await.unwrap().is_none());
}

async fn update_replaces_bytes_in_place(engine: &dyn CardEngine) {
    let stored = card("original bytes");
    engine.add(&stored).await.unwrap();

    assert!(engine.update(stored.hash(), b"replaced bytes").await.unwrap());
    let fetched = engine.get(stored.hash()).await.unwrap().unwrap();
    assert_eq!(fetched.content_bytes(), b"replaced bytes");
    // The hash key does not move.
    assert_eq!(fetched.hash(), stored.hash());

    assert!(!engine.update("absent", b"x").await.unwrap());
}

async fn count_and_clear(engine: &dyn CardEngine) {
    assert_eq!(engine.count().await.unwrap(), 0);
    for i in 0..3 {
        engine.add(&card(&format!("count {i}"))).await.unwrap();
    }
    assert_eq!(engine.count().await.unwrap(), 3);
    engine.clear().await.unwrap();
    assert_eq!(engine.count().await.unwrap(), 0);
}

async fn enumeration_is_stable_insertion_order(engine: &dyn CardEngine) {
    let cards: Vec<Card> = (0..5).map(|i| card(&format!("ordered {i}"))).collect();
    for c in &cards {
        engine.add(c).await.unwrap();
    }

    let first = engine.get_page(1, 10).await.unwrap();
    let again = engine.get_page(1, 10).await.unwrap();
    let hashes: Vec<&str> = first.items.iter().map(|c| c.hash()).collect();
    let expected: Vec<&str> = cards.iter().map(|c| c.hash()).collect();
    assert_eq!(hashes, expected);
    let again_hashes: Vec<&str> = again.items.iter().map(|c| c.hash()).collect();
    assert_eq!(hashes, again_hashes);

    // Order survives a deletion in the middle.
    engine.delete(cards[2].hash()).await.unwrap();
    let after = engine.get_page(1, 10).await.unwrap();
    let after_hashes: Vec<&str> = after.items.iter().map(|c| c.hash()).collect();
    assert_eq!(
        after_hashes,
        vec![cards[0].hash(), cards[1].hash(), cards[3].hash(), cards[4].hash()]
    );
}

async fn pagination_envelope_and_range(engine: &dyn CardEngine) {
    for i in 0..7 {
        engine.add(&card(&format!("page {i}"))).await.unwrap();
    }

    let page = engine.get_page(2, 3).await.unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_items, 7);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next);
    assert!(page.has_previous);

    let last = engine.get_page(3, 3).await.unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(!last.has_next);

    assert!(matches!(
        engine.get_page(4, 3).await.unwrap_err(),
        EngineError::PageOutOfRange {
            page_number: 4,
            total_pages: 3
        }
    ));
    assert!(matches!(
        engine.get_page(0, 3).await.unwrap_err(),
        EngineError::InvalidArgument(_)
    ));
    assert!(matches!(
        engine.get_page(1, 0).await.unwrap_err(),
        EngineError::InvalidArgument(_)
    ));
}

async fn empty_store_pages_are_empty_not_errors(engine: &dyn CardEngine) {
    let page = engine.get_page(5, 10).await.unwrap();
    assert_eq!(page.total_items, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.items.is_empty());
}

async fn get_all_aliases_get_page(engine: &dyn CardEngine) {
    for i in 0..4 {
        engine.add(&card(&format!("alias {i}"))).await.unwrap();
    }
    let via_page = engine.get_page(2, 2).await.unwrap();
    let via_all = engine.get_all(2, 2).await.unwrap();
    let a: Vec<&str> = via_page.items.iter().map(|c| c.hash()).collect();
    let b: Vec<&str> = via_all.items.iter().map(|c| c.hash()).collect();
    assert_eq!(a, b);
}

async fn content_search_is_substring_over_lossy_utf8(engine: &dyn CardEngine) {
    engine.add(&card("the quick brown fox")).await.unwrap();
    engine.add(&card("quick silver")).await.unwrap();
    engine.add(&card("slow snail")).await.unwrap();
    // Invalid UTF-8 around a matching ASCII run still matches lossily.
    let mut binary = vec![0xff, 0xfe];
    binary.extend_from_slice(b"quick");
    binary.push(0xff);
    engine
        .add(&Card::new(CardContent::Bytes(binary)).unwrap())
        .await
        .unwrap();

    let page = engine.search_by_content("quick", 1, 10).await.unwrap();
    assert_eq!(page.total_items, 3);

    let none = engine.search_by_content("absent needle", 1, 10).await.unwrap();
    assert_eq!(none.total_items, 0);
    assert!(none.items.is_empty());
}

async fn exercise_full_contract(engine: &dyn CardEngine) {
    add_then_get_round_trips(engine).await;
    engine.clear().await.unwrap();
    second_add_conflicts(engine).await;
    engine.clear().await.unwrap();
    delete_is_idempotent(engine).await;
    engine.clear().await.unwrap();
    update_replaces_bytes_in_place(engine).await;
    engine.clear().await.unwrap();
    count_and_clear(engine).await;
    enumeration_is_stable_insertion_order(engine).await;
    engine.clear().await.unwrap();
    pagination_envelope_and_range(engine).await;
    engine.clear().await.unwrap();
    empty_store_pages_are_empty_not_errors(engine).await;
    get_all_aliases_get_page(engine).await;
    engine.clear().await.unwrap();
    content_search_is_substring_over_lossy_utf8(engine).await;
}

// ---------------------------------------------------------------------------
// Memory engine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn memory_engine_upholds_the_contract() {
    init_tracing();
    let engine = MemoryEngine::new();
    exercise_full_contract(&engine).await;
}

// ---------------------------------------------------------------------------
// SQLite engine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sqlite_engine_upholds_the_contract() {
    init_tracing();
    let engine = SqliteEngine::connect_in_memory().await.unwrap();
    exercise_full_contract(&engine).await;
}

#[tokio::test]
async fn sqlite_rows_survive_reconnection() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("cards.db").display());

    let stored = card("durable");
    {
        let engine = SqliteEngine::connect(&url).await.unwrap();
        engine.add(&stored).await.unwrap();
    }

    let engine = SqliteEngine::connect(&url).await.unwrap();
    assert_eq!(engine.count().await.unwrap(), 1);
    let fetched = engine.get(stored.hash()).await.unwrap().unwrap();
    assert_eq!(fetched.content_bytes(), b"durable");
}

#[tokio::test]
async fn sqlite_trigger_message_maps_to_hash_conflict() {
    let engine = SqliteEngine::connect_in_memory().await.unwrap();
    let stored = card("trigger check");
    engine.add(&stored).await.unwrap();
    match engine.add(&stored).await.unwrap_err() {
        EngineError::HashConflict(hash) => assert_eq!(hash, stored.hash()),
        other => panic!("expected HashConflict, got {other:?}"),
    }
    // The failed insert did not disturb the stored row.
    assert_eq!(engine.count().await.unwrap(), 1);
}
