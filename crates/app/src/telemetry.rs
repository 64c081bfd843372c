//! Tracing setup for embedding shells.
//!
//! The shell that hosts this crate calls [`init`] once at startup; tests
//! use [`try_init`], which tolerates an already-installed subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "stockshelf_app=info";

/// Initialize tracing with `EnvFilter`.
///
/// Defaults to info level for this crate if `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber is already installed; call once from the
/// shell's entry point.
pub fn init() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize tracing, ignoring an already-installed subscriber.
///
/// Intended for tests, where any test may have installed the subscriber
/// first.
pub fn try_init() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
