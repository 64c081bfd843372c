//! Integration tests for Stockshelf.
//!
//! Every test runs against the in-memory backend; no external services
//! are involved.
//!
//! # Test Categories
//!
//! - `session_flow` - Sign-in/sign-out transitions and role resolution
//! - `catalog_feed` - Live catalog snapshots and subscription lifecycle
//! - `catalog_mutations` - Role-gated create/update/delete flows
//!
//! This crate's library is the shared fixture kit: a seeded backend, a
//! test configuration, and a gated attribute store for tests that need to
//! hold a role lookup open.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use stockshelf_app::backend::{LookupError, MemoryBackend, Profiles};
use stockshelf_app::{App, AppConfig, telemetry};
use stockshelf_core::UserId;

/// Catalog collection used by every test.
pub const CATALOG: &str = "products";

/// Users collection used by every test.
pub const USERS: &str = "users";

/// A backend with one account per role.
///
/// | email               | password  | user id | role    |
/// |---------------------|-----------|---------|---------|
/// | ada@example.com     | hunter2   | u-ada   | ADMIN   |
/// | mei@example.com     | hunter2   | u-mei   | MANAGER |
/// | vik@example.com     | hunter2   | u-vik   | VIEWER  |
#[must_use]
pub fn seeded_backend() -> Arc<MemoryBackend> {
    telemetry::try_init();

    let backend = MemoryBackend::new();

    backend.add_account("ada@example.com", "hunter2", "u-ada");
    backend.put_document(USERS, "u-ada", json!({"role": "ADMIN", "name": "Ada"}));

    backend.add_account("mei@example.com", "hunter2", "u-mei");
    backend.put_document(USERS, "u-mei", json!({"role": "MANAGER", "name": "Mei"}));

    backend.add_account("vik@example.com", "hunter2", "u-vik");
    backend.put_document(USERS, "u-vik", json!({"role": "VIEWER", "name": "Vik"}));

    Arc::new(backend)
}

/// Configuration pointing at the test collections.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        project_id: "stockshelf-test".to_string(),
        api_key: SecretString::from("k9q2xv8LwQ0j"),
        catalog_collection: CATALOG.to_string(),
        users_collection: USERS.to_string(),
    }
}

/// An app wired against the given backend.
#[must_use]
pub fn test_app(backend: &Arc<MemoryBackend>) -> App<MemoryBackend> {
    App::new(test_config(), Arc::clone(backend))
}

/// Attribute store that holds every lookup until released.
///
/// Lets a test observe the loading state between sign-in and role
/// resolution, which is otherwise too fast to catch.
pub struct GatedProfiles {
    inner: Arc<MemoryBackend>,
    gate: Semaphore,
}

impl GatedProfiles {
    /// Wrap a backend; lookups block until [`Self::release_one`].
    #[must_use]
    pub fn new(inner: Arc<MemoryBackend>) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
        }
    }

    /// Let exactly one pending (or future) lookup through.
    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }
}

impl Profiles for GatedProfiles {
    async fn user_record(
        &self,
        collection: &str,
        user_id: &UserId,
    ) -> Result<Option<Value>, LookupError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| LookupError::Fetch("gate closed".to_owned()))?;
        permit.forget();

        self.inner.user_record(collection, user_id).await
    }
}
