//! Unified error handling.
//!
//! Provides a unified `AppError` aggregating the boundary error types.
//! Entry points on [`crate::App`] return `Result<T, AppError>`; the finer
//! enums remain available where a caller wants to branch on the cause.

use thiserror::Error;

use crate::backend::{SignInError, StoreError};
use crate::catalog::MutationError;
use crate::config::ConfigError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sign-in was rejected locally or by the identity service.
    #[error("Sign-in error: {0}")]
    SignIn(#[from] SignInError),

    /// A catalog mutation was rejected or failed.
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    /// A collection-store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
