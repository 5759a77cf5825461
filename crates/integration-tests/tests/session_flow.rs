//! Integration tests for session reconciliation and logout.
//!
//! The session provider is simulated by pushing snapshots at the
//! synchronizer, exactly as an embedder would from its session-change event.

use httpmock::prelude::*;
use serde_json::json;

use tiffin_core::types::UserId;
use tiffin_integration_tests::{
    RecordingProvider, SharedProvider, TestBackend, favorite_json, profile_json,
};

use tiffin_client::session::{SessionSnapshot, SessionUser};
use tiffin_client::storage::keys;

fn provider_user(id: &str, email: &str) -> SessionUser {
    SessionUser {
        id: id.to_string(),
        email: Some(email.to_string()),
        name: None,
    }
}

// =============================================================================
// Authenticated With Backend Tokens
// =============================================================================

#[tokio::test]
async fn test_login_confirms_identity_with_backend() {
    let backend = TestBackend::start().await;
    let me = backend
        .server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/me")
                .header("authorization", "Bearer acc");
            then.status(200).json_body(profile_json(7, "ali@tiffin.pk", "ali"));
        })
        .await;
    let favorites = backend
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/favorites");
            then.status(200).json_body(json!([favorite_json(1, "Chicken Karahi")]));
        })
        .await;

    let provider = SharedProvider::default();
    let sync = backend.client.synchronizer(provider.clone());

    let snapshot = SessionSnapshot::authenticated(provider_user("7", "ali@tiffin.pk"))
        .with_backend_tokens("acc", "ref");
    sync.on_session_change(&snapshot).await;

    // Canonical identity wins over anything synthesized from the provider.
    let user = backend.client.auth().user().expect("signed in");
    assert_eq!(user.id, UserId::new(7));
    assert_eq!(user.username, "ali");
    assert!(backend.client.auth().is_authenticated());

    // Tokens persisted for later API calls.
    assert_eq!(backend.stored(keys::ACCESS_TOKEN).as_deref(), Some("acc"));
    assert_eq!(backend.stored(keys::REFRESH_TOKEN).as_deref(), Some("ref"));

    // Favorites reloaded after the successful reconciliation.
    assert_eq!(backend.client.favorites().favorites().len(), 1);

    assert_eq!(provider.0.sign_outs(), 0);
    me.assert_async().await;
    favorites.assert_async().await;
}

#[tokio::test]
async fn test_backend_rejection_repairs_session() {
    let backend = TestBackend::start().await;
    backend
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/auth/me");
            then.status(401).json_body(json!({"detail": "invalid token"}));
        })
        .await;
    backend
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/refresh");
            then.status(401).json_body(json!({"detail": "expired"}));
        })
        .await;
    let favorites = backend
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/favorites");
            then.status(200).json_body(json!([]));
        })
        .await;

    let provider = SharedProvider::default();
    let sync = backend.client.synchronizer(provider.clone());

    let snapshot = SessionSnapshot::authenticated(provider_user("7", "ali@tiffin.pk"))
        .with_backend_tokens("acc", "ref");
    sync.on_session_change(&snapshot).await;

    // The rejected pair must not survive anywhere.
    assert_eq!(backend.stored(keys::ACCESS_TOKEN), None);
    assert_eq!(backend.stored(keys::REFRESH_TOKEN), None);
    assert!(!backend.client.auth().is_authenticated());
    assert_eq!(backend.client.auth().user(), None);

    // The provider session is terminated, and no favorites reload happens.
    assert_eq!(provider.0.sign_outs(), 1);
    assert_eq!(favorites.hits_async().await, 0);
}

// =============================================================================
// Authenticated Without Backend Tokens
// =============================================================================

#[tokio::test]
async fn test_provider_fallback_synthesizes_identity() {
    let backend = TestBackend::start().await;
    let me = backend
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/auth/me");
            then.status(200).json_body(profile_json(42, "zara@tiffin.pk", "zara"));
        })
        .await;
    let favorites = backend
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/favorites");
            then.status(200).json_body(json!([]));
        })
        .await;

    let provider = SharedProvider::default();
    let sync = backend.client.synchronizer(provider.clone());

    let mut user = provider_user("42", "zara@tiffin.pk");
    user.name = Some("Zara".to_string());
    sync.on_session_change(&SessionSnapshot::authenticated(user))
        .await;

    // Identity synthesized locally, no backend round-trip.
    let profile = backend.client.auth().user().expect("signed in");
    assert_eq!(profile.id, UserId::new(42));
    assert_eq!(profile.username, "zara");
    assert_eq!(profile.name.as_deref(), Some("Zara"));
    assert!(backend.client.auth().is_authenticated());
    assert_eq!(me.hits_async().await, 0);

    // The favorites reload guard finds no stored token and stays local.
    assert_eq!(favorites.hits_async().await, 0);
    assert!(backend.client.favorites().favorites().is_empty());
}

// =============================================================================
// Signed Out and Loading
// =============================================================================

#[tokio::test]
async fn test_signed_out_session_clears_local_state() {
    let backend = TestBackend::start().await;
    backend.seed_tokens("acc", "ref");

    let provider = SharedProvider::default();
    let sync = backend.client.synchronizer(provider.clone());

    sync.on_session_change(&SessionSnapshot::authenticated(provider_user(
        "7",
        "ali@tiffin.pk",
    )))
    .await;
    assert!(backend.client.auth().is_authenticated());

    sync.on_session_change(&SessionSnapshot::unauthenticated())
        .await;

    assert_eq!(backend.stored(keys::ACCESS_TOKEN), None);
    assert_eq!(backend.stored(keys::REFRESH_TOKEN), None);
    assert!(!backend.client.auth().is_authenticated());
    assert_eq!(backend.client.auth().user(), None);
}

#[tokio::test]
async fn test_loading_never_resets_a_working_session() {
    let backend = TestBackend::start().await;
    backend.seed_tokens("acc", "ref");

    let provider = SharedProvider::default();
    let sync = backend.client.synchronizer(provider.clone());

    sync.on_session_change(&SessionSnapshot::authenticated(provider_user(
        "7",
        "ali@tiffin.pk",
    )))
    .await;

    sync.on_session_change(&SessionSnapshot::loading()).await;

    assert!(backend.client.auth().is_authenticated());
    assert_eq!(backend.stored(keys::ACCESS_TOKEN).as_deref(), Some("acc"));
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_resets_state_and_notifies_provider() {
    let backend = TestBackend::start().await;
    let provider = RecordingProvider::default();

    let sync = backend.client.synchronizer(SharedProvider::default());
    sync.on_session_change(&SessionSnapshot::authenticated(provider_user(
        "7",
        "ali@tiffin.pk",
    )))
    .await;

    backend.client.cart().add_item(tiffin_core::cart::CartItemInput {
        id: "naan".to_string(),
        name: "Garlic Naan".to_string(),
        price: rust_decimal::Decimal::from(80),
        image: None,
    });
    assert_eq!(backend.client.cart().total_items(), 1);

    backend.client.auth().logout(&provider).await;

    assert_eq!(backend.client.auth().user(), None);
    assert!(!backend.client.auth().is_authenticated());
    assert!(backend.client.cart().is_empty());
    assert_eq!(provider.sign_outs(), 1);

    // Idempotent: a second logout is safe.
    backend.client.auth().logout(&provider).await;
    assert_eq!(backend.client.auth().user(), None);
    assert_eq!(provider.sign_outs(), 2);
}
