//! Integration tests for the live catalog feed.
//!
//! Snapshot replacement, key-wins identifiers, subscription lifecycle.

use serde_json::json;

use stockshelf_app::CatalogFeed;
use stockshelf_core::EntryId;
use stockshelf_integration_tests::{CATALOG, seeded_backend};

#[tokio::test]
async fn test_feed_reflects_snapshot_order_and_keys() {
    let backend = seeded_backend();
    backend.put_document(CATALOG, "a", json!({"name": "Anvil", "price": "120"}));
    backend.put_document(CATALOG, "b", json!({"name": "Bolt", "price": "0.40"}));

    let feed = CatalogFeed::open(backend.as_ref(), CATALOG)
        .await
        .expect("open feed");

    let entries = feed.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, EntryId::new("a"));
    assert_eq!(entries[0].name, "Anvil");
    assert_eq!(entries[1].id, EntryId::new("b"));
    assert_eq!(entries[1].name, "Bolt");
}

#[tokio::test]
async fn test_feed_tracks_external_changes() {
    let backend = seeded_backend();
    let feed = CatalogFeed::open(backend.as_ref(), CATALOG)
        .await
        .expect("open feed");
    let mut watch = feed.watch();

    assert!(feed.entries().is_empty());

    // Another client adds an entry; the feed replaces its list.
    backend.put_document(CATALOG, "a", json!({"name": "Anvil"}));
    watch
        .wait_for(|entries| entries.len() == 1)
        .await
        .expect("entry arrives");

    // And removes it again.
    backend.remove_document(CATALOG, "a");
    watch
        .wait_for(Vec::is_empty)
        .await
        .expect("entry removed");
}

#[tokio::test]
async fn test_feed_defaults_missing_fields_to_empty() {
    let backend = seeded_backend();
    backend.put_document(CATALOG, "sparse", json!({"name": "No price yet"}));

    let feed = CatalogFeed::open(backend.as_ref(), CATALOG)
        .await
        .expect("open feed");

    let entries = feed.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "No price yet");
    assert_eq!(entries[0].price, "");
    assert_eq!(entries[0].image_url, "");
}

#[tokio::test]
async fn test_feed_skips_undecodable_documents() {
    let backend = seeded_backend();
    backend.put_document(CATALOG, "good", json!({"name": "Anvil"}));
    backend.put_document(CATALOG, "junk", json!(["not", "a", "record"]));

    let feed = CatalogFeed::open(backend.as_ref(), CATALOG)
        .await
        .expect("open feed");

    let entries = feed.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, EntryId::new("good"));
}

#[tokio::test]
async fn test_feed_release_and_reacquire() {
    let backend = seeded_backend();

    // Opening the catalog screen acquires the subscription.
    let feed = CatalogFeed::open(backend.as_ref(), CATALOG)
        .await
        .expect("open feed");
    assert_eq!(backend.watcher_count(CATALOG), 1);

    // Leaving the screen releases it.
    feed.close();
    assert_eq!(backend.watcher_count(CATALOG), 0);

    // Content written while no screen was watching shows up on re-entry.
    backend.put_document(CATALOG, "a", json!({"name": "Anvil"}));
    let feed = CatalogFeed::open(backend.as_ref(), CATALOG)
        .await
        .expect("reopen feed");
    assert_eq!(backend.watcher_count(CATALOG), 1);
    assert_eq!(feed.entries().len(), 1);
}
