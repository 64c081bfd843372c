//! Application state wired together.
//!
//! [`App`] owns the session controller task and hands out the pieces a
//! shell renders from: the active screen, the catalog feed, and the
//! catalog form. It is generic over the backend so the in-memory stand-in
//! and a real managed-backend client plug in the same way.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use stockshelf_core::UserId;

use crate::backend::{Documents, Identity, Profiles};
use crate::catalog::{CatalogFeed, CatalogForm};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::session::{Screen, SessionController, SessionHandle, SessionState};

/// The application core, assembled.
///
/// Construction spawns the session controller; dropping the `App` stops
/// it. Must be created inside a tokio runtime.
pub struct App<B> {
    config: AppConfig,
    backend: Arc<B>,
    session: SessionHandle<B>,
    state: watch::Receiver<SessionState>,
    controller_task: JoinHandle<()>,
}

impl<B> App<B>
where
    B: Identity + Profiles + Documents,
{
    /// Wire the core against a backend and start observing auth state.
    #[must_use]
    pub fn new(config: AppConfig, backend: Arc<B>) -> Self {
        let (controller, state) = SessionController::new(
            Arc::clone(&backend),
            Arc::clone(&backend),
            config.users_collection.clone(),
        );
        let controller_task = tokio::spawn(controller.run());
        let session = SessionHandle::new(Arc::clone(&backend));

        Self {
            config,
            backend,
            session,
            state,
            controller_task,
        }
    }

    /// The configuration this core was built with.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The screen the shell should render right now.
    ///
    /// A pure function of the session state; nothing else feeds it.
    #[must_use]
    pub fn screen(&self) -> Screen {
        Screen::for_state(*self.state.borrow())
    }

    /// A receiver for session-state changes, for shells that await them.
    #[must_use]
    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the underlying `SignInError` wrapped in [`AppError`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AppError> {
        Ok(self.session.sign_in(email, password).await?)
    }

    /// End the active session.
    pub async fn sign_out(&self) {
        self.session.sign_out().await;
    }

    /// Open the catalog feed; call when the catalog screen appears and
    /// drop the feed when it goes away.
    ///
    /// # Errors
    ///
    /// Returns the underlying `StoreError` wrapped in [`AppError`].
    pub async fn open_catalog(&self) -> Result<CatalogFeed, AppError> {
        Ok(CatalogFeed::open(self.backend.as_ref(), &self.config.catalog_collection).await?)
    }

    /// A catalog form consulting this core's session state.
    #[must_use]
    pub fn catalog_form(&self) -> CatalogForm<B> {
        CatalogForm::new(
            Arc::clone(&self.backend),
            self.config.catalog_collection.clone(),
            self.state.clone(),
        )
    }
}

impl<B> Drop for App<B> {
    fn drop(&mut self) {
        self.controller_task.abort();
    }
}
