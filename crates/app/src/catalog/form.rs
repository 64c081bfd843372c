//! Catalog form controller.
//!
//! Owns the draft being edited and issues every catalog mutation. The
//! authorization gate lives here, locally, in front of each operation:
//! an insufficient role is rejected before any backend call goes out,
//! whatever rules the remote store may or may not enforce on its own.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument};

use stockshelf_core::{CatalogEntry, CatalogRecord, EntryId};

use crate::backend::{Documents, StoreError};
use crate::session::SessionState;

/// Errors a catalog mutation can be rejected or fail with.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The current session's role does not permit this operation. No
    /// backend call was made.
    #[error("not permitted: {0}")]
    Unauthorized(&'static str),

    /// A required field is blank. No backend call was made.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The backend call failed. The draft and catalog are left as they
    /// were so the user can retry.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Whether the draft creates a new entry or edits an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DraftMode {
    /// Saving will create a new entry.
    #[default]
    Creating,
    /// Saving will fully replace the entry with this id.
    Editing(EntryId),
}

/// The transient, editable copy of an entry's fields.
///
/// Never persisted; lives only as long as the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// The editable fields.
    pub fields: CatalogRecord,
    /// Create-new versus edit-existing.
    pub mode: DraftMode,
}

impl Draft {
    /// Whether the draft edits an existing entry (drives the shell's
    /// create-vs-update submit label).
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self.mode, DraftMode::Editing(_))
    }

    /// Reset to the empty creating state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// What a successful save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new entry was created under this store-assigned id.
    Created(EntryId),
    /// The entry with this id was replaced.
    Updated(EntryId),
}

/// Draft state plus role-gated mutations against the catalog collection.
pub struct CatalogForm<D> {
    store: Arc<D>,
    collection: String,
    session: watch::Receiver<SessionState>,
    draft: Draft,
}

impl<D: Documents> CatalogForm<D> {
    /// Create a form over `collection`, consulting `session` for the
    /// current role on every operation.
    #[must_use]
    pub fn new(
        store: Arc<D>,
        collection: impl Into<String>,
        session: watch::Receiver<SessionState>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            session,
            draft: Draft::default(),
        }
    }

    /// The current draft.
    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Mutable access to the draft fields, for the shell's input bindings.
    pub const fn fields_mut(&mut self) -> &mut CatalogRecord {
        &mut self.draft.fields
    }

    fn current_role(&self) -> Option<stockshelf_core::Role> {
        self.session.borrow().role()
    }

    /// Copy `entry` into the draft and switch to editing it.
    ///
    /// A no-op unless the current role may modify the catalog.
    pub fn begin_edit(&mut self, entry: &CatalogEntry) {
        let Some(role) = self.current_role() else {
            return;
        };
        if !role.can_modify() {
            return;
        }

        self.draft = Draft {
            fields: CatalogRecord::from(entry),
            mode: DraftMode::Editing(entry.id.clone()),
        };
    }

    /// Discard the draft.
    pub fn cancel(&mut self) {
        self.draft.clear();
    }

    /// Persist the draft: create when `Creating`, full-replace when
    /// `Editing`.
    ///
    /// On success the draft resets to empty `Creating`; on any error it is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// `MutationError::Unauthorized` when the role may not modify the
    /// catalog, `MutationError::MissingField` when a required field is
    /// blank (neither issues a backend call), `MutationError::Store` when
    /// the backend call fails.
    #[instrument(skip(self))]
    pub async fn save(&mut self) -> Result<SaveOutcome, MutationError> {
        let Some(role) = self.current_role() else {
            return Err(MutationError::Unauthorized("an active session is required"));
        };
        if !role.can_modify() {
            return Err(MutationError::Unauthorized(
                "only managers and admins may save entries",
            ));
        }

        require_fields(&self.draft.fields)?;

        let body = serde_json::to_value(&self.draft.fields).map_err(StoreError::from)?;

        let outcome = match self.draft.mode.clone() {
            DraftMode::Editing(id) => {
                self.store.set(&self.collection, &id, body).await?;
                info!(%id, "catalog entry updated");
                SaveOutcome::Updated(id)
            }
            DraftMode::Creating => {
                let id = self.store.create(&self.collection, body).await?;
                info!(%id, "catalog entry created");
                SaveOutcome::Created(id)
            }
        };

        self.draft.clear();
        Ok(outcome)
    }

    /// Delete `entry` from the catalog.
    ///
    /// If the open draft was editing the same entry, it resets too.
    ///
    /// # Errors
    ///
    /// `MutationError::Unauthorized` when the role is not admin (no
    /// backend call), `MutationError::Store` when the backend call fails.
    #[instrument(skip(self, entry), fields(id = %entry.id))]
    pub async fn delete(&mut self, entry: &CatalogEntry) -> Result<(), MutationError> {
        let Some(role) = self.current_role() else {
            return Err(MutationError::Unauthorized("an active session is required"));
        };
        if !role.can_delete() {
            return Err(MutationError::Unauthorized("only admins may delete entries"));
        }

        self.store.delete(&self.collection, &entry.id).await?;
        info!(id = %entry.id, "catalog entry deleted");

        if self.draft.mode == DraftMode::Editing(entry.id.clone()) {
            self.draft.clear();
        }

        Ok(())
    }
}

/// Reject a draft with any blank required field, naming the first.
fn require_fields(fields: &CatalogRecord) -> Result<(), MutationError> {
    let required = [
        ("name", &fields.name),
        ("category", &fields.category),
        ("price", &fields.price),
        ("image_url", &fields.image_url),
    ];

    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(MutationError::MissingField(name));
        }
    }

    Ok(())
}
