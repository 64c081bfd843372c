//! Role resolution against the attribute store.
//!
//! A signed-in user's role lives as a free-text `role` field on their
//! record in the users collection. Resolution fetches that record once per
//! session and maps the field through [`Role::from_attribute`].

use serde_json::Value;
use tracing::warn;

use stockshelf_core::{Role, UserId};

use crate::backend::{LookupError, Profiles};

/// Name of the role attribute on a user record.
const ROLE_FIELD: &str = "role";

/// Resolve the role for `user_id`.
///
/// Never fails: any lookup failure — unreachable store, denied access,
/// malformed record — resolves to [`Role::Viewer`], the least privileged
/// level, and is logged here. Fail-open-to-viewer rather than
/// fail-closed is the contract: a user whose record cannot be read can
/// still see the catalog, and nothing more. There is no retry; a fresh
/// session transition is the only re-trigger.
pub async fn resolve_role<P: Profiles>(profiles: &P, collection: &str, user_id: &UserId) -> Role {
    match fetch_role_attribute(profiles, collection, user_id).await {
        Ok(attribute) => Role::from_attribute(attribute.as_deref()),
        Err(error) => {
            warn!(%user_id, %error, "role lookup failed, defaulting to viewer");
            Role::Viewer
        }
    }
}

/// Fetch the raw role attribute, if the record and field exist.
async fn fetch_role_attribute<P: Profiles>(
    profiles: &P,
    collection: &str,
    user_id: &UserId,
) -> Result<Option<String>, LookupError> {
    let record = profiles.user_record(collection, user_id).await?;

    Ok(record
        .as_ref()
        .and_then(|r| r.get(ROLE_FIELD))
        .and_then(Value::as_str)
        .map(str::to_owned))
}
