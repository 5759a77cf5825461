//! External session reconciliation.
//!
//! The session provider (OAuth broker, native account manager, whatever the
//! embedder uses) owns login lifecycle; the backend owns identity. This
//! module reconciles the two into the local auth store every time the
//! provider reports a status change, with a fixed precedence:
//! backend-confirmed identity, then provider fallback, then none.
//!
//! # Example
//!
//! ```rust,ignore
//! use tiffin_client::session::{SessionSnapshot, SessionUser};
//!
//! let sync = client.synchronizer(provider);
//!
//! // Called from the embedder's session-change event
//! let snapshot = SessionSnapshot::authenticated(SessionUser {
//!     id: "7".to_string(),
//!     email: Some("a@b.com".to_string()),
//!     name: None,
//! })
//! .with_backend_tokens(access, refresh);
//! sync.on_session_change(&snapshot).await;
//! ```

use std::future::Future;

use thiserror::Error;
use tracing::{debug, info, warn};

use tiffin_core::profile::UserProfile;
use tiffin_core::types::{Email, UserId};

use crate::api::ApiClient;
use crate::models::TokenPair;
use crate::storage::SharedStorage;
use crate::store::{AuthStore, FavoritesStore};

// ─────────────────────────────────────────────────────────────────────────────
// Provider Seam
// ─────────────────────────────────────────────────────────────────────────────

/// Error reported by a session provider operation.
#[derive(Debug, Clone, Error)]
#[error("session provider error: {0}")]
pub struct ProviderError(pub String);

/// The external collaborator that owns the login session.
///
/// Sign-out is best effort everywhere it is called; implementations should
/// report failure rather than panic.
pub trait SessionProvider: Send + Sync {
    /// End the provider-side session.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

/// The provider's lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The provider has not resolved the session yet.
    Loading,
    /// A login session exists.
    Authenticated,
    /// No login session exists.
    Unauthenticated,
}

/// The provider's own projection of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUser {
    /// Provider-side user id, conventionally a stringified backend id.
    pub id: String,
    /// Email, when the provider knows it.
    pub email: Option<String>,
    /// Display name, when the provider knows it.
    pub name: Option<String>,
}

/// One observation of the provider's session, pushed to the synchronizer on
/// every change.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Lifecycle status.
    pub status: SessionStatus,
    /// The provider's user projection, when authenticated.
    pub user: Option<SessionUser>,
    /// Backend access token minted during provider login, if any.
    pub backend_access_token: Option<String>,
    /// Backend refresh token minted during provider login, if any.
    pub backend_refresh_token: Option<String>,
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("status", &self.status)
            .field("user", &self.user)
            .field(
                "backend_access_token",
                &self.backend_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "backend_refresh_token",
                &self.backend_refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl SessionSnapshot {
    /// A still-resolving session.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            user: None,
            backend_access_token: None,
            backend_refresh_token: None,
        }
    }

    /// A signed-out session.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
            backend_access_token: None,
            backend_refresh_token: None,
        }
    }

    /// A signed-in session carrying the provider's user projection.
    #[must_use]
    pub const fn authenticated(user: SessionUser) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
            backend_access_token: None,
            backend_refresh_token: None,
        }
    }

    /// Attach the backend token pair minted at login.
    #[must_use]
    pub fn with_backend_tokens(
        mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.backend_access_token = Some(access_token.into());
        self.backend_refresh_token = Some(refresh_token.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Synchronizer
// ─────────────────────────────────────────────────────────────────────────────

/// Reconciles session-provider status changes into the local auth store.
pub struct SessionSynchronizer<P> {
    provider: P,
    api: ApiClient,
    auth: AuthStore,
    favorites: FavoritesStore,
    storage: SharedStorage,
}

impl<P: SessionProvider> SessionSynchronizer<P> {
    /// Create a synchronizer around an existing set of handles.
    #[must_use]
    pub const fn new(
        provider: P,
        api: ApiClient,
        auth: AuthStore,
        favorites: FavoritesStore,
        storage: SharedStorage,
    ) -> Self {
        Self {
            provider,
            api,
            auth,
            favorites,
            storage,
        }
    }

    /// The wrapped provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Reconcile local auth state with one session observation.
    ///
    /// `Loading` is a no-op so transient states never reset a working
    /// session. After a successful reconciliation to authenticated, the
    /// favorites set is reloaded from the server.
    pub async fn on_session_change(&self, snapshot: &SessionSnapshot) {
        match snapshot.status {
            SessionStatus::Loading => {
                debug!("session still resolving, no action");
            }
            SessionStatus::Authenticated => self.reconcile_authenticated(snapshot).await,
            SessionStatus::Unauthenticated => self.reconcile_unauthenticated(),
        }
    }

    async fn reconcile_authenticated(&self, snapshot: &SessionSnapshot) {
        if let (Some(access), Some(refresh)) = (
            &snapshot.backend_access_token,
            &snapshot.backend_refresh_token,
        ) {
            let pair = TokenPair::new(access.clone(), refresh.clone());
            if let Err(e) = pair.store(&self.storage) {
                warn!(error = %e, "failed to persist session tokens");
            }

            match self.api.me().await {
                Ok(profile) => {
                    info!(user_id = %profile.id, "session confirmed by backend");
                    self.auth.set_user(Some(profile));
                }
                Err(e) => {
                    // A provider-authenticated but backend-rejected session
                    // must not persist; every protected call would fail.
                    warn!(error = %e, "backend rejected session, signing out");
                    TokenPair::purge(&self.storage);
                    self.auth.set_user(None);
                    if let Err(e) = self.provider.sign_out().await {
                        warn!(error = %e, "session provider sign-out failed");
                    }
                    return;
                }
            }
        } else {
            let profile = synthesize_profile(snapshot.user.as_ref());
            info!(user_id = %profile.id, "session authenticated without backend tokens, using provider identity");
            self.auth.set_user(Some(profile));
            self.auth.set_authenticated(true);
        }

        self.favorites.load_from_server().await;
    }

    fn reconcile_unauthenticated(&self) {
        debug!("session signed out, clearing local auth");
        TokenPair::purge(&self.storage);
        self.auth.set_user(None);
    }
}

/// Build a degraded identity from the provider's user projection.
///
/// Best effort by construction: an unparseable id becomes 0, a missing email
/// an empty one, and the username degrades with the email local part.
fn synthesize_profile(user: Option<&SessionUser>) -> UserProfile {
    let id: i64 = user.map_or(0, |u| u.id.parse().unwrap_or(0));
    let email = user.and_then(|u| u.email.clone()).unwrap_or_default();
    let name = user.and_then(|u| u.name.clone());

    UserProfile::with_derived_username(UserId::new(id), Email::from_trusted(email), name)
}
