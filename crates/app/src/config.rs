//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOCKSHELF_PROJECT_ID` - Managed-backend project identifier
//! - `STOCKSHELF_API_KEY` - Managed-backend API key (secret)
//!
//! ## Optional
//! - `STOCKSHELF_CATALOG_COLLECTION` - Catalog collection name (default: products)
//! - `STOCKSHELF_USERS_COLLECTION` - User-record collection name (default: users)

use secrecy::SecretString;
use thiserror::Error;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AppConfig {
    /// Managed-backend project identifier.
    pub project_id: String,
    /// Managed-backend API key.
    pub api_key: SecretString,
    /// Collection holding catalog entries.
    pub catalog_collection: String,
    /// Collection holding per-user records (role attribute lives here).
    pub users_collection: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("catalog_collection", &self.catalog_collection)
            .field("users_collection", &self.users_collection)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or the API
    /// key fails placeholder validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let project_id = get_required_env("STOCKSHELF_PROJECT_ID")?;
        let api_key = get_validated_secret("STOCKSHELF_API_KEY")?;
        let catalog_collection = get_env_or_default("STOCKSHELF_CATALOG_COLLECTION", "products");
        let users_collection = get_env_or_default("STOCKSHELF_USERS_COLLECTION", "users");

        Ok(Self {
            project_id,
            api_key,
            catalog_collection,
            users_collection,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a secret is not an obvious placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn test_config() -> AppConfig {
        AppConfig {
            project_id: "stockshelf-test".to_string(),
            api_key: SecretString::from("AIzaSyD4k9qm2xv8LwQ0j"),
            catalog_collection: "products".to_string(),
            users_collection: "users".to_string(),
        }
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("AIzaSyD4k9qm2xv8LwQ0j", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = test_config();
        let debug_output = format!("{config:?}");

        // Public fields should be visible
        assert!(debug_output.contains("stockshelf-test"));
        assert!(debug_output.contains("products"));

        // The API key should be redacted
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("AIzaSyD4k9qm2xv8LwQ0j"));
    }

    #[test]
    fn test_api_key_still_exposable() {
        let config = test_config();
        assert_eq!(config.api_key.expose_secret(), "AIzaSyD4k9qm2xv8LwQ0j");
    }
}
