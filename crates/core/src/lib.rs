//! Stockshelf Core - Shared types library.
//!
//! This crate provides common types used across all Stockshelf components:
//! - `app` - The application core (session, catalog feed, catalog form)
//! - `integration-tests` - End-to-end flows against the in-memory backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no backend access, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, the role
//!   enum, and catalog entry types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
