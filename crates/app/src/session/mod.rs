//! Session state machine.
//!
//! The [`SessionController`] owns the only piece of authoritative local
//! state in the application: where the current session is in the
//! signed-out → signed-in → role-resolved progression. It consumes
//! auth-change events from the identity service for its whole lifetime
//! (continuous observation, not one-shot) and publishes [`SessionState`]
//! over a `watch` channel for everything downstream — screen selection
//! reads it, and every catalog mutation consults it before touching the
//! backend.

pub mod screen;

pub use screen::Screen;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use stockshelf_core::{Email, Role, UserId};

use crate::backend::{Identity, Profiles, SignInError};
use crate::services::resolve_role;

/// Where the current session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No active session.
    Unauthorized,
    /// A session is active but its role lookup has not completed.
    Unresolved,
    /// A session is active and its role is known.
    Resolved(Role),
}

impl SessionState {
    /// The resolved role, if the session has one.
    #[must_use]
    pub const fn role(self) -> Option<Role> {
        match self {
            Self::Resolved(role) => Some(role),
            Self::Unauthorized | Self::Unresolved => None,
        }
    }
}

/// A role lookup in flight, stamped with the generation it was issued
/// under.
type PendingLookup = Pin<Box<dyn Future<Output = (u64, Role)> + Send>>;

/// Drives [`SessionState`] from identity-service events.
///
/// Construct with [`SessionController::new`], hand the receiver to
/// consumers, and run [`SessionController::run`] on a task for the life of
/// the process.
pub struct SessionController<I, P> {
    identity: Arc<I>,
    profiles: Arc<P>,
    users_collection: String,
    state_tx: watch::Sender<SessionState>,
    generation: u64,
}

impl<I: Identity, P: Profiles> SessionController<I, P> {
    /// Create a controller and the receiver its state is published on.
    ///
    /// The initial state is `Unauthorized` when no session is active at
    /// startup, `Unresolved` otherwise; either way the first auth event
    /// (delivered immediately on subscription) drives the same transition
    /// logic as every later one.
    pub fn new(
        identity: Arc<I>,
        profiles: Arc<P>,
        users_collection: impl Into<String>,
    ) -> (Self, watch::Receiver<SessionState>) {
        let initial = match identity.current_user() {
            Some(_) => SessionState::Unresolved,
            None => SessionState::Unauthorized,
        };
        let (state_tx, state_rx) = watch::channel(initial);

        let controller = Self {
            identity,
            profiles,
            users_collection: users_collection.into(),
            state_tx,
            generation: 0,
        };

        (controller, state_rx)
    }

    /// A fresh receiver for the published state.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Consume auth events until the identity service closes its stream.
    ///
    /// Every session-active event restarts role resolution from
    /// `Unresolved`, superseding any lookup still in flight; every
    /// session-inactive event lands on `Unauthorized` immediately.
    pub async fn run(mut self) {
        let mut auth = self.identity.watch_auth();
        let mut pending: Option<PendingLookup> = None;

        loop {
            tokio::select! {
                maybe_event = auth.next() => {
                    let Some(user) = maybe_event else { break };
                    self.apply_auth_change(user, &mut pending);
                }
                (generation, role) = next_resolution(&mut pending) => {
                    pending = None;
                    self.apply_resolution(generation, role);
                }
            }
        }

        debug!("auth stream closed, session controller stopping");
    }

    /// React to a sign-in or sign-out reported by the identity service.
    ///
    /// Bumps the generation so a lookup issued before this event can no
    /// longer land.
    fn apply_auth_change(&mut self, user: Option<UserId>, pending: &mut Option<PendingLookup>) {
        self.generation = self.generation.wrapping_add(1);

        match user {
            Some(user_id) => {
                // Always re-fetch, even if a role was resolved in an
                // earlier session for the same user.
                info!(%user_id, "session active, resolving role");
                self.state_tx.send_replace(SessionState::Unresolved);

                let generation = self.generation;
                let profiles = Arc::clone(&self.profiles);
                let collection = self.users_collection.clone();
                *pending = Some(Box::pin(async move {
                    let role = resolve_role(profiles.as_ref(), &collection, &user_id).await;
                    (generation, role)
                }));
            }
            None => {
                info!("session inactive");
                *pending = None;
                self.state_tx.send_replace(SessionState::Unauthorized);
            }
        }
    }

    /// Apply a completed role lookup, unless a newer transition has
    /// superseded it.
    fn apply_resolution(&mut self, generation: u64, role: Role) {
        if generation != self.generation {
            debug!(%role, "discarding stale role resolution");
            return;
        }

        info!(%role, "role resolved");
        self.state_tx.send_replace(SessionState::Resolved(role));
    }
}

/// Await the pending lookup, or park forever when there is none.
async fn next_resolution(pending: &mut Option<PendingLookup>) -> (u64, Role) {
    match pending.as_mut() {
        Some(lookup) => lookup.await,
        None => std::future::pending().await,
    }
}

/// Sign-in/sign-out surface handed to the shell's sign-in screen.
///
/// Validates locally before touching the identity service: blank email or
/// password never leaves the device, and the email is trimmed and parsed
/// first.
#[derive(Clone)]
pub struct SessionHandle<I> {
    identity: Arc<I>,
}

impl<I: Identity> SessionHandle<I> {
    /// Wrap an identity service.
    #[must_use]
    pub const fn new(identity: Arc<I>) -> Self {
        Self { identity }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SignInError::MissingCredentials` if either field is blank,
    /// `SignInError::InvalidEmail` if the email does not parse, and
    /// whatever the identity service reports otherwise.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, SignInError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(SignInError::MissingCredentials);
        }

        let email = Email::parse(email)?;
        let user_id = self.identity.sign_in(&email, password).await?;
        info!(%user_id, "signed in");

        Ok(user_id)
    }

    /// End the active session.
    ///
    /// The resulting auth event drives the session controller to
    /// `Unauthorized`; there is nothing to do here but tell the identity
    /// service.
    pub async fn sign_out(&self) {
        self.identity.sign_out().await;
        info!("signed out");
    }
}
