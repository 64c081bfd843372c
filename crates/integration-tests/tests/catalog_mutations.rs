//! Integration tests for role-gated catalog mutations.
//!
//! Each test drives the whole core: sign in, wait for the role to
//! resolve, then mutate through the form while a feed watches the
//! collection.

use serde_json::json;

use stockshelf_app::{MutationError, SaveOutcome, SessionState};
use stockshelf_core::{CatalogEntry, EntryId, Role};
use stockshelf_integration_tests::{CATALOG, seeded_backend, test_app};

async fn sign_in_as(
    app: &stockshelf_app::App<stockshelf_app::backend::MemoryBackend>,
    email: &str,
    role: Role,
) {
    app.sign_in(email, "hunter2").await.expect("sign in");
    app.session_state()
        .wait_for(|s| *s == SessionState::Resolved(role))
        .await
        .expect("role resolved");
}

fn widget_entry(id: &str) -> CatalogEntry {
    CatalogEntry {
        id: EntryId::new(id),
        name: "Widget".into(),
        category: "Tools".into(),
        price: "9.99".into(),
        image_url: "http://x/y.png".into(),
    }
}

// ============================================================================
// Create Tests
// ============================================================================

#[tokio::test]
async fn test_admin_creates_entry_visible_in_feed() {
    let backend = seeded_backend();
    let app = test_app(&backend);
    sign_in_as(&app, "ada@example.com", Role::Admin).await;

    let feed = app.open_catalog().await.expect("open feed");
    let mut watch = feed.watch();
    let mut form = app.catalog_form();

    form.fields_mut().name = "Widget".into();
    form.fields_mut().category = "Tools".into();
    form.fields_mut().price = "9.99".into();
    form.fields_mut().image_url = "http://x/y.png".into();

    let outcome = form.save().await.expect("save");
    let SaveOutcome::Created(id) = outcome else {
        panic!("expected a create, got {outcome:?}");
    };

    watch
        .wait_for(|entries| entries.len() == 1)
        .await
        .expect("entry arrives");
    let entries = feed.entries();
    assert_eq!(entries[0].id, id);
    assert_eq!(entries[0].name, "Widget");
    assert_eq!(entries[0].price, "9.99");

    // Draft is back to empty creating.
    assert!(!form.draft().is_editing());
    assert_eq!(form.draft().fields.name, "");
}

#[tokio::test]
async fn test_viewer_save_is_blocked_before_any_call() {
    let backend = seeded_backend();
    let app = test_app(&backend);
    sign_in_as(&app, "vik@example.com", Role::Viewer).await;

    let mut form = app.catalog_form();
    form.fields_mut().name = "Widget".into();
    form.fields_mut().category = "Tools".into();
    form.fields_mut().price = "9.99".into();
    form.fields_mut().image_url = "http://x/y.png".into();

    assert!(matches!(
        form.save().await,
        Err(MutationError::Unauthorized(_))
    ));
    assert!(backend.documents(CATALOG).is_empty());
}

#[tokio::test]
async fn test_manager_save_with_blank_field_is_blocked() {
    let backend = seeded_backend();
    let app = test_app(&backend);
    sign_in_as(&app, "mei@example.com", Role::Manager).await;

    let mut form = app.catalog_form();
    form.fields_mut().name = "Widget".into();
    form.fields_mut().category = "Tools".into();
    // price left blank
    form.fields_mut().image_url = "http://x/y.png".into();

    assert!(matches!(
        form.save().await,
        Err(MutationError::MissingField("price"))
    ));
    assert!(backend.documents(CATALOG).is_empty());
}

// ============================================================================
// Update Tests
// ============================================================================

#[tokio::test]
async fn test_manager_edits_entry_in_place() {
    let backend = seeded_backend();
    backend.put_document(
        CATALOG,
        "42",
        json!({"name": "Widget", "category": "Tools", "price": "9.99", "image_url": "http://x/y.png"}),
    );

    let app = test_app(&backend);
    sign_in_as(&app, "mei@example.com", Role::Manager).await;

    let feed = app.open_catalog().await.expect("open feed");
    let mut watch = feed.watch();
    let mut form = app.catalog_form();

    let current = feed.entries();
    form.begin_edit(&current[0]);
    assert!(form.draft().is_editing());

    form.fields_mut().name = "Widget Mk II".into();
    let outcome = form.save().await.expect("save");
    assert_eq!(outcome, SaveOutcome::Updated(EntryId::new("42")));

    watch
        .wait_for(|entries| entries.iter().any(|e| e.name == "Widget Mk II"))
        .await
        .expect("update arrives");

    // Updated in place, not duplicated.
    assert_eq!(feed.entries().len(), 1);
    assert_eq!(feed.entries()[0].id, EntryId::new("42"));
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn test_manager_delete_is_blocked_before_any_call() {
    let backend = seeded_backend();
    backend.put_document(CATALOG, "7", json!({"name": "Keep me"}));

    let app = test_app(&backend);
    sign_in_as(&app, "mei@example.com", Role::Manager).await;

    let mut form = app.catalog_form();
    assert!(matches!(
        form.delete(&widget_entry("7")).await,
        Err(MutationError::Unauthorized(_))
    ));
    assert!(backend.document(CATALOG, "7").is_some());
}

#[tokio::test]
async fn test_admin_delete_clears_matching_draft() {
    let backend = seeded_backend();
    backend.put_document(
        CATALOG,
        "7",
        json!({"name": "Widget", "category": "Tools", "price": "9.99", "image_url": "http://x/y.png"}),
    );

    let app = test_app(&backend);
    sign_in_as(&app, "ada@example.com", Role::Admin).await;

    let feed = app.open_catalog().await.expect("open feed");
    let mut watch = feed.watch();
    let mut form = app.catalog_form();

    // Start editing the entry, then delete it out from under the draft.
    form.begin_edit(&widget_entry("7"));
    form.delete(&widget_entry("7")).await.expect("delete");

    assert!(backend.document(CATALOG, "7").is_none());
    assert!(!form.draft().is_editing());
    assert_eq!(form.draft().fields.name, "");

    watch.wait_for(Vec::is_empty).await.expect("feed empties");
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_write_failure_surfaces_and_preserves_state() {
    let backend = seeded_backend();
    let app = test_app(&backend);
    sign_in_as(&app, "ada@example.com", Role::Admin).await;

    let mut form = app.catalog_form();
    form.fields_mut().name = "Widget".into();
    form.fields_mut().category = "Tools".into();
    form.fields_mut().price = "9.99".into();
    form.fields_mut().image_url = "http://x/y.png".into();

    backend.fail_writes(true);
    assert!(matches!(
        form.save().await,
        Err(MutationError::Store(_))
    ));

    // Draft and catalog both untouched; a manual retry succeeds.
    assert_eq!(form.draft().fields.name, "Widget");
    assert!(backend.documents(CATALOG).is_empty());

    backend.fail_writes(false);
    assert!(matches!(form.save().await, Ok(SaveOutcome::Created(_))));
    assert_eq!(backend.documents(CATALOG).len(), 1);
}

// ============================================================================
// Session/Mutation Interaction Tests
// ============================================================================

#[tokio::test]
async fn test_mutation_blocked_after_sign_out() {
    let backend = seeded_backend();
    let app = test_app(&backend);
    sign_in_as(&app, "ada@example.com", Role::Admin).await;

    let mut form = app.catalog_form();
    form.fields_mut().name = "Widget".into();
    form.fields_mut().category = "Tools".into();
    form.fields_mut().price = "9.99".into();
    form.fields_mut().image_url = "http://x/y.png".into();

    app.sign_out().await;
    app.session_state()
        .wait_for(|s| *s == SessionState::Unauthorized)
        .await
        .expect("unauthorized");

    // The form consults the live session state: the admin role died with
    // the session.
    assert!(matches!(
        form.save().await,
        Err(MutationError::Unauthorized(_))
    ));
    assert!(backend.documents(CATALOG).is_empty());
}
