//! Live catalog feed.
//!
//! [`CatalogFeed`] is the read side of the catalog screen: a scoped
//! subscription to the external collection, exposed as a fully-replaced
//! entry list. The write side lives in [`form`].

pub mod form;

pub use form::{CatalogForm, Draft, DraftMode, MutationError, SaveOutcome};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use stockshelf_core::{CatalogEntry, CatalogRecord, EntryId};

use crate::backend::{Document, Documents, Registration, StoreError};

/// A live view of the catalog collection.
///
/// Opened once per catalog-screen lifetime. Every store notification
/// replaces the whole list — no patching, no local reordering, no cache;
/// the entries are exactly what the store delivered, in delivery order,
/// each id taken from the document's stable key. Dropping the feed (or
/// calling [`CatalogFeed::close`]) releases the store subscription exactly
/// once; re-entering the screen means opening a fresh feed.
#[derive(Debug)]
pub struct CatalogFeed {
    entries: watch::Receiver<Vec<CatalogEntry>>,
    task: JoinHandle<()>,
    // Held here rather than on the task so teardown unhooks synchronously.
    _registration: Registration,
}

impl CatalogFeed {
    /// Subscribe to `collection` and wait for its initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the subscription cannot be established.
    pub async fn open<D: Documents>(store: &D, collection: &str) -> Result<Self, StoreError> {
        let mut doc_watch = store.watch(collection).await?;

        // The store delivers the current snapshot on registration, so the
        // feed is populated before this returns.
        let initial = match doc_watch.next().await {
            Some(snapshot) => decode_snapshot(collection, snapshot),
            None => Vec::new(),
        };
        let (tx, rx) = watch::channel(initial);
        let (mut snapshots, registration) = doc_watch.into_parts();

        let collection = collection.to_owned();
        let task = tokio::spawn(async move {
            while let Some(snapshot) = snapshots.recv().await {
                let entries = decode_snapshot(&collection, snapshot);
                if tx.send(entries).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            entries: rx,
            task,
            _registration: registration,
        })
    }

    /// The current entry list.
    #[must_use]
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.entries.borrow().clone()
    }

    /// A receiver the shell can await changes on.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Vec<CatalogEntry>> {
        self.entries.clone()
    }

    /// Release the subscription.
    ///
    /// Equivalent to dropping the feed; provided so screen teardown can be
    /// explicit.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for CatalogFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Map a raw snapshot to entries.
///
/// The document key wins over anything embedded in the body; bodies that
/// do not decode are skipped with a warning rather than poisoning the
/// whole snapshot.
fn decode_snapshot(collection: &str, snapshot: Vec<Document>) -> Vec<CatalogEntry> {
    snapshot
        .into_iter()
        .filter_map(|Document { key, body }| {
            match serde_json::from_value::<CatalogRecord>(body) {
                Ok(record) => Some(record.into_entry(EntryId::new(key))),
                Err(error) => {
                    warn!(collection, %key, %error, "skipping undecodable catalog document");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::backend::MemoryBackend;

    const CATALOG: &str = "products";

    #[tokio::test]
    async fn test_open_delivers_current_snapshot() {
        let backend = MemoryBackend::new();
        backend.put_document(
            CATALOG,
            "a",
            json!({"name": "Anvil", "category": "Tools", "price": "120", "image_url": "http://x/a.png"}),
        );

        let feed = CatalogFeed::open(&backend, CATALOG).await.unwrap();
        let entries = feed.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().name, "Anvil");
    }

    #[tokio::test]
    async fn test_snapshot_replaces_list_with_key_as_id() {
        let backend = MemoryBackend::new();
        let feed = CatalogFeed::open(&backend, CATALOG).await.unwrap();
        let mut watch = feed.watch();

        backend.put_document(CATALOG, "a", json!({"name": "Anvil"}));
        backend.put_document(CATALOG, "b", json!({"name": "Bolt", "id": "ignored"}));

        watch.wait_for(|entries| entries.len() == 2).await.unwrap();
        let entries = feed.entries();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str().to_owned()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_skipped() {
        let backend = MemoryBackend::new();
        backend.put_document(CATALOG, "good", json!({"name": "Anvil"}));
        backend.put_document(CATALOG, "bad", json!("not an object"));

        let feed = CatalogFeed::open(&backend, CATALOG).await.unwrap();
        let entries = feed.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().id.as_str(), "good");
    }

    #[tokio::test]
    async fn test_close_releases_subscription() {
        let backend = MemoryBackend::new();
        let feed = CatalogFeed::open(&backend, CATALOG).await.unwrap();
        assert_eq!(backend.watcher_count(CATALOG), 1);

        feed.close();
        assert_eq!(backend.watcher_count(CATALOG), 0);
    }
}
