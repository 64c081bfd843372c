//! External backend contracts.
//!
//! The application core delegates identity, role storage, and catalog
//! persistence to a managed backend. These traits are the whole of what it
//! asks for: sign-in/sign-out plus an auth-change stream, a single user
//! record fetch, and collection CRUD plus a snapshot stream. The real
//! protocol behind them lives inside the backend vendor's SDK and is none
//! of this crate's business.
//!
//! # Notification model
//!
//! Both subscription surfaces deliver through `mpsc` channels rather than
//! callbacks, so all state transitions are consumed on the core's own task
//! and the state machine stays single-threaded. Each subscription delivers
//! the current state immediately on registration, then again on every
//! change; dropping the [`Registration`] inside the watch unhooks the
//! listener exactly once.

pub mod memory;

pub use memory::MemoryBackend;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use stockshelf_core::{Email, EmailError, EntryId, UserId};

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur during sign-in.
#[derive(Debug, Error)]
pub enum SignInError {
    /// Email or password was blank; nothing was sent to the backend.
    #[error("email and password are required")]
    MissingCredentials,

    /// The email does not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The identity service rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The identity service could not be reached.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur fetching a user record.
///
/// Callers on the role path never surface these: resolution recovers to
/// the viewer default. The variants exist so the recovery site can log
/// what actually went wrong.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The fetch itself failed (network, timeout).
    #[error("user record fetch failed: {0}")]
    Fetch(String),

    /// The backend denied access to the record.
    #[error("permission denied: {0}")]
    Denied(String),

    /// The record exists but is not a readable document.
    #[error("malformed user record: {0}")]
    Malformed(String),
}

/// Errors that can occur against the collection store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected the operation.
    #[error("store rejected the operation: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The document body could not be encoded.
    #[error("document encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Handle for a live listener; dropping it unhooks the listener.
///
/// The unhook runs exactly once, on drop.
pub struct Registration(Option<Box<dyn FnOnce() + Send>>);

impl Registration {
    /// Wrap an unhook closure.
    #[must_use]
    pub fn new(unhook: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(unhook)))
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(unhook) = self.0.take() {
            unhook();
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration").finish_non_exhaustive()
    }
}

/// Stream of auth-state changes.
///
/// Yields the signed-in user, or `None` for signed-out, starting with the
/// state current at registration time.
#[derive(Debug)]
pub struct AuthWatch {
    events: mpsc::UnboundedReceiver<Option<UserId>>,
    _registration: Registration,
}

impl AuthWatch {
    /// Assemble a watch from its channel and registration.
    #[must_use]
    pub fn new(events: mpsc::UnboundedReceiver<Option<UserId>>, registration: Registration) -> Self {
        Self {
            events,
            _registration: registration,
        }
    }

    /// Receive the next auth-state change.
    ///
    /// Returns `None` when the identity service has gone away for good.
    pub async fn next(&mut self) -> Option<Option<UserId>> {
        self.events.recv().await
    }
}

/// A document as delivered in a collection snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The store-assigned stable key.
    pub key: String,
    /// The document body.
    pub body: Value,
}

/// Stream of full collection snapshots.
///
/// Every notification carries the complete collection content; consumers
/// replace, never patch. Starts with the snapshot current at registration
/// time.
#[derive(Debug)]
pub struct DocumentWatch {
    snapshots: mpsc::UnboundedReceiver<Vec<Document>>,
    registration: Registration,
}

impl DocumentWatch {
    /// Assemble a watch from its channel and registration.
    #[must_use]
    pub fn new(
        snapshots: mpsc::UnboundedReceiver<Vec<Document>>,
        registration: Registration,
    ) -> Self {
        Self {
            snapshots,
            registration,
        }
    }

    /// Receive the next snapshot.
    ///
    /// Returns `None` when the subscription has been torn down on the
    /// store side.
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        self.snapshots.recv().await
    }

    /// Split the watch into its channel and registration, so a consumer
    /// can keep the registration where teardown is synchronous while the
    /// channel drains on a task.
    #[must_use]
    pub fn into_parts(self) -> (mpsc::UnboundedReceiver<Vec<Document>>, Registration) {
        (self.snapshots, self.registration)
    }
}

// =============================================================================
// Contracts
// =============================================================================

/// Identity service: session lifecycle and auth-change notification.
pub trait Identity: Send + Sync + 'static {
    /// Sign in with email and password, yielding the user's opaque id.
    fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<UserId, SignInError>> + Send;

    /// End the active session, if any.
    fn sign_out(&self) -> impl Future<Output = ()> + Send;

    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<UserId>;

    /// Register for auth-state changes.
    ///
    /// The watch delivers the current state immediately, then every
    /// sign-in and sign-out for as long as the registration is held.
    fn watch_auth(&self) -> AuthWatch;
}

/// Attribute store: per-user records holding the role attribute.
pub trait Profiles: Send + Sync + 'static {
    /// Fetch the record stored for `user_id`, or `None` if there is none.
    fn user_record(
        &self,
        collection: &str,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<Value>, LookupError>> + Send;
}

/// Collection store: catalog persistence and snapshot notification.
pub trait Documents: Send + Sync + 'static {
    /// Subscribe to a collection's snapshots.
    fn watch(&self, collection: &str)
    -> impl Future<Output = Result<DocumentWatch, StoreError>> + Send;

    /// Create a document; the store assigns and returns the key.
    fn create(
        &self,
        collection: &str,
        body: Value,
    ) -> impl Future<Output = Result<EntryId, StoreError>> + Send;

    /// Fully replace the document at `id`, creating it if absent.
    fn set(
        &self,
        collection: &str,
        id: &EntryId,
        body: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete the document at `id`. Deleting an absent document is not an
    /// error.
    fn delete(
        &self,
        collection: &str,
        id: &EntryId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
