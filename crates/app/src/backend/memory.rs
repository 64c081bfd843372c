//! In-memory backend.
//!
//! Stand-in for the managed backend, in the role an emulator plays: local
//! development and tests run against it, seeded with accounts, user
//! records, and catalog documents. It honors the notification contracts —
//! auth and snapshot watches receive the current state on registration and
//! fan-out on every change — but it is not a database: no persistence, no
//! queries, no transactions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use stockshelf_core::{Email, EntryId, UserId};

use super::{
    AuthWatch, Document, DocumentWatch, Documents, Identity, LookupError, Profiles, Registration,
    SignInError, StoreError,
};

/// In-memory implementation of all three backend contracts.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    collections: HashMap<String, BTreeMap<String, Value>>,
    current_user: Option<UserId>,
    auth_subs: HashMap<u64, mpsc::UnboundedSender<Option<UserId>>>,
    doc_subs: HashMap<String, HashMap<u64, mpsc::UnboundedSender<Vec<Document>>>>,
    next_sub_id: u64,
    fail_writes: bool,
    fail_lookups: bool,
}

struct Account {
    email: Email,
    password: String,
    user_id: UserId,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Seeding and inspection
    // =========================================================================

    /// Register an account the identity service will accept.
    ///
    /// # Panics
    ///
    /// Panics if `email` does not parse; seed data is under the caller's
    /// control.
    pub fn add_account(&self, email: &str, password: &str, user_id: &str) {
        let email = Email::parse(email).unwrap_or_else(|e| panic!("seed email {email:?}: {e}"));
        self.lock().accounts.push(Account {
            email,
            password: password.to_owned(),
            user_id: UserId::new(user_id),
        });
    }

    /// Insert or replace a document, notifying watchers.
    ///
    /// Also how tests simulate a change made by another client.
    pub fn put_document(&self, collection: &str, key: &str, body: Value) {
        let mut inner = self.lock();
        inner
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), body);
        inner.notify_collection(collection);
    }

    /// Remove a document, notifying watchers.
    pub fn remove_document(&self, collection: &str, key: &str) {
        let mut inner = self.lock();
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.remove(key);
        }
        inner.notify_collection(collection);
    }

    /// The body stored at `key`, if any.
    #[must_use]
    pub fn document(&self, collection: &str, key: &str) -> Option<Value> {
        self.lock()
            .collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned()
    }

    /// The full content of a collection, in stable key order.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .collections
            .get(collection)
            .map(Inner::snapshot_of)
            .unwrap_or_default()
    }

    /// Number of live snapshot listeners on a collection.
    #[must_use]
    pub fn watcher_count(&self, collection: &str) -> usize {
        self.lock()
            .doc_subs
            .get(collection)
            .map_or(0, HashMap::len)
    }

    /// Make subsequent create/set/delete calls fail with
    /// [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make subsequent user-record fetches fail with
    /// [`LookupError::Fetch`].
    pub fn fail_lookups(&self, fail: bool) {
        self.lock().fail_lookups = fail;
    }
}

impl Inner {
    fn snapshot_of(docs: &BTreeMap<String, Value>) -> Vec<Document> {
        docs.iter()
            .map(|(key, body)| Document {
                key: key.clone(),
                body: body.clone(),
            })
            .collect()
    }

    fn notify_collection(&mut self, collection: &str) {
        let snapshot = self
            .collections
            .get(collection)
            .map(Self::snapshot_of)
            .unwrap_or_default();

        if let Some(subs) = self.doc_subs.get_mut(collection) {
            subs.retain(|_, tx| tx.send(snapshot.clone()).is_ok());
        }
    }

    fn notify_auth(&mut self) {
        let current = self.current_user.clone();
        self.auth_subs.retain(|_, tx| tx.send(current.clone()).is_ok());
    }
}

impl Identity for MemoryBackend {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<UserId, SignInError> {
        let mut inner = self.lock();

        let account = inner
            .accounts
            .iter()
            .find(|a| a.email == *email && a.password == password)
            .ok_or(SignInError::InvalidCredentials)?;

        let user_id = account.user_id.clone();
        debug!(%user_id, "memory backend sign-in");
        inner.current_user = Some(user_id.clone());
        inner.notify_auth();

        Ok(user_id)
    }

    async fn sign_out(&self) {
        let mut inner = self.lock();
        if inner.current_user.take().is_some() {
            debug!("memory backend sign-out");
        }
        inner.notify_auth();
    }

    fn current_user(&self) -> Option<UserId> {
        self.lock().current_user.clone()
    }

    fn watch_auth(&self) -> AuthWatch {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut inner = self.lock();
        let id = inner.next_sub_id;
        inner.next_sub_id += 1;

        // Deliver the state current at registration time.
        let _ = tx.send(inner.current_user.clone());
        inner.auth_subs.insert(id, tx);
        drop(inner);

        let shared = Arc::clone(&self.inner);
        let registration = Registration::new(move || {
            shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .auth_subs
                .remove(&id);
        });

        AuthWatch::new(rx, registration)
    }
}

impl Profiles for MemoryBackend {
    async fn user_record(
        &self,
        collection: &str,
        user_id: &UserId,
    ) -> Result<Option<Value>, LookupError> {
        let inner = self.lock();

        if inner.fail_lookups {
            return Err(LookupError::Fetch("injected failure".to_owned()));
        }

        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(user_id.as_str()))
            .cloned())
    }
}

impl Documents for MemoryBackend {
    async fn watch(&self, collection: &str) -> Result<DocumentWatch, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut inner = self.lock();
        let id = inner.next_sub_id;
        inner.next_sub_id += 1;

        // Deliver the snapshot current at registration time.
        let snapshot = inner
            .collections
            .get(collection)
            .map(Inner::snapshot_of)
            .unwrap_or_default();
        let _ = tx.send(snapshot);

        inner
            .doc_subs
            .entry(collection.to_owned())
            .or_default()
            .insert(id, tx);
        drop(inner);

        let shared = Arc::clone(&self.inner);
        let collection = collection.to_owned();
        let registration = Registration::new(move || {
            if let Some(subs) = shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .doc_subs
                .get_mut(&collection)
            {
                subs.remove(&id);
            }
        });

        Ok(DocumentWatch::new(rx, registration))
    }

    async fn create(&self, collection: &str, body: Value) -> Result<EntryId, StoreError> {
        let mut inner = self.lock();

        if inner.fail_writes {
            return Err(StoreError::Unavailable("injected failure".to_owned()));
        }

        let key = Uuid::new_v4().to_string();
        inner
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(key.clone(), body);
        inner.notify_collection(collection);

        Ok(EntryId::new(key))
    }

    async fn set(&self, collection: &str, id: &EntryId, body: Value) -> Result<(), StoreError> {
        let mut inner = self.lock();

        if inner.fail_writes {
            return Err(StoreError::Unavailable("injected failure".to_owned()));
        }

        inner
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.as_str().to_owned(), body);
        inner.notify_collection(collection);

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &EntryId) -> Result<(), StoreError> {
        let mut inner = self.lock();

        if inner.fail_writes {
            return Err(StoreError::Unavailable("injected failure".to_owned()));
        }

        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.remove(id.as_str());
        }
        inner.notify_collection(collection);

        Ok(())
    }
}
