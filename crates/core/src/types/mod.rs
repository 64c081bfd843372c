//! Core types for Stockshelf.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod entry;
pub mod id;
pub mod role;

pub use email::{Email, EmailError};
pub use entry::{CatalogEntry, CatalogRecord};
pub use id::*;
pub use role::Role;
