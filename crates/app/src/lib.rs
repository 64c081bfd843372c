//! Stockshelf application core.
//!
//! The logic of a small catalog-management client: who is signed in, what
//! their role permits, what the catalog currently contains, and the draft
//! being edited. Everything hard — identity verification, persistence,
//! change notification — is delegated to an external managed backend
//! reached through the narrow contracts in [`backend`]; rendering is left
//! to whatever shell embeds this crate.
//!
//! # Architecture
//!
//! - [`session`] - Auth-state machine; owns the current [`SessionState`]
//! - [`services`] - Role resolution against the attribute store
//! - [`catalog`] - Live catalog feed and the role-gated mutation form
//! - [`backend`] - External collaborator contracts + in-memory stand-in
//! - [`state`] - [`App`], the wired-together whole
//!
//! All external notifications arrive over channels and are consumed by a
//! single controller task, so the core stays single-threaded and
//! deterministic.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod telemetry;

pub use catalog::{CatalogFeed, CatalogForm, Draft, DraftMode, MutationError, SaveOutcome};
pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use session::{Screen, SessionController, SessionHandle, SessionState};
pub use state::App;
