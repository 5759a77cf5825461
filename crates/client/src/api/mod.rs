//! Backend REST API client.
//!
//! The backend is the source of truth for identity, favorites, and delivery
//! configuration. This client reads its bearer credential from durable
//! storage on every request, stamps each request with a fresh
//! `x-request-id`, and transparently refreshes the token pair once when a
//! protected call comes back 401.
//!
//! Token refresh is reactive only. Concurrent refreshes are not serialized;
//! the last writer wins, same as every other overlapping mutation here.
//!
//! # Example
//!
//! ```rust,ignore
//! use tiffin_client::api::ApiClient;
//!
//! let api = ApiClient::new(&config, storage)?;
//!
//! // Fetch the canonical identity for the stored access token
//! let profile = api.me().await?;
//!
//! // Favorites round-trip
//! api.add_favorite(product_id).await?;
//! let favorites = api.favorites().await?;
//! ```

mod error;

pub use error::{ApiError, FieldError};

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use tiffin_core::ProductId;
use tiffin_core::delivery::WorkingHours;
use tiffin_core::favorites::FavoriteItem;
use tiffin_core::profile::UserProfile;

use crate::config::ClientConfig;
use crate::models::TokenPair;
use crate::storage::{SharedStorage, keys};

use error::{ErrorBody, ErrorDetail};

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

/// Successful response from `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    /// Absent when the backend keeps the old refresh token valid.
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

/// Response from `GET /delivery/available`.
#[derive(Debug, Deserialize)]
struct DeliveryAvailability {
    is_available: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// API Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the backend REST API.
///
/// Cheap to clone; all clones share the same connection pool and storage.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    storage: SharedStorage,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig, storage: SharedStorage) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                storage,
            }),
        })
    }

    /// Get the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auth Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the canonical identity for the stored access token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when no valid credential is
    /// available, [`ApiError`] otherwise on transport or backend failures.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.fetch(Method::GET, "/auth/me", None).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Favorites Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the full favorites list for the current user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or backend failures.
    #[instrument(skip(self))]
    pub async fn favorites(&self) -> Result<Vec<FavoriteItem>, ApiError> {
        self.fetch(Method::GET, "/favorites", None).await
    }

    /// Mark a product as favorite.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or backend failures.
    #[instrument(skip(self))]
    pub async fn add_favorite(&self, id: ProductId) -> Result<(), ApiError> {
        self.authorized(Method::POST, &format!("/favorites/{id}"), None)
            .await?;
        Ok(())
    }

    /// Remove a product from favorites.
    ///
    /// Removing an id the backend does not know is still a request; the
    /// backend decides whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or backend failures.
    #[instrument(skip(self))]
    pub async fn remove_favorite(&self, id: ProductId) -> Result<(), ApiError> {
        self.authorized(Method::DELETE, &format!("/favorites/{id}"), None)
            .await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Delivery Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the configured delivery working hours.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or backend failures.
    #[instrument(skip(self))]
    pub async fn working_hours(&self) -> Result<WorkingHours, ApiError> {
        self.fetch(Method::GET, "/delivery/working-hours", None).await
    }

    /// Replace the configured delivery working hours.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the backend rejects the window,
    /// [`ApiError`] otherwise on transport or backend failures.
    #[instrument(skip(self, hours))]
    pub async fn set_working_hours(&self, hours: &WorkingHours) -> Result<WorkingHours, ApiError> {
        let body = serde_json::to_value(hours)?;
        self.fetch(Method::PUT, "/delivery/working-hours", Some(body))
            .await
    }

    /// Check whether delivery is currently available.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or backend failures.
    #[instrument(skip(self))]
    pub async fn delivery_available(&self) -> Result<bool, ApiError> {
        let availability: DeliveryAvailability =
            self.fetch(Method::GET, "/delivery/available", None).await?;
        Ok(availability.is_available)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request Execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute a request and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let response = self.authorized(method, path, body).await?;
        Ok(response.json().await?)
    }

    /// Execute a request with the stored bearer credential, refreshing the
    /// token pair and retrying exactly once on 401.
    ///
    /// A failed refresh, or a second 401, purges both stored token keys and
    /// surfaces [`ApiError::Unauthorized`].
    async fn authorized(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self.send(&method, path, body.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return into_api_result(response).await;
        }

        debug!(path, "unauthorized, attempting token refresh");
        if self.refresh_tokens().await {
            let retried = self.send(&method, path, body.as_ref()).await?;
            if retried.status() != StatusCode::UNAUTHORIZED {
                return into_api_result(retried).await;
            }
        }

        TokenPair::purge(&self.inner.storage);
        Err(ApiError::Unauthorized)
    }

    /// Send a single request: base URL join, request-id stamp, bearer header
    /// when a token is stored, optional JSON body.
    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{path}", self.inner.base_url);

        let mut request = self
            .inner
            .client
            .request(method.clone(), &url)
            .header("x-request-id", Uuid::new_v4().to_string());

        if let Some(token) = self.stored_access_token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Returns `true` only when a usable new pair has been persisted. All
    /// failure modes come back `false`; the caller decides what a dead
    /// credential means.
    async fn refresh_tokens(&self) -> bool {
        let Some(current) = TokenPair::load(&self.inner.storage) else {
            debug!("no stored token pair to refresh");
            return false;
        };

        let url = format!("{}/auth/refresh", self.inner.base_url);
        let body = serde_json::json!({ "refresh_token": current.refresh_token });

        let response = match self
            .inner
            .client
            .post(&url)
            .header("x-request-id", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "token refresh request failed");
                return false;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "token refresh rejected");
            return false;
        }

        let parsed: RefreshResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "malformed token refresh response");
                return false;
            }
        };

        let mut pair = TokenPair::new(
            parsed.access_token,
            parsed.refresh_token.unwrap_or(current.refresh_token),
        );
        if let Some(expires_in) = parsed.expires_in {
            pair = pair.with_expiry(expires_in);
        }
        if pair.is_expired() {
            warn!("refreshed token pair is already expired");
            return false;
        }

        if let Err(e) = pair.store(&self.inner.storage) {
            warn!(error = %e, "failed to persist refreshed tokens");
            return false;
        }

        debug!("token pair refreshed");
        true
    }

    fn stored_access_token(&self) -> Option<String> {
        match self.inner.storage.get(keys::ACCESS_TOKEN) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "failed to read stored access token");
                None
            }
        }
    }
}

/// Map a non-success response to an [`ApiError`], passing success through.
async fn into_api_result(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(error_from_body(status, &text))
}

fn error_from_body(status: StatusCode, body: &str) -> ApiError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        match parsed.detail {
            Some(ErrorDetail::Fields(fields)) => return ApiError::Validation(fields),
            Some(ErrorDetail::Message(detail)) => {
                return ApiError::Backend {
                    status: status.as_u16(),
                    detail,
                };
            }
            None => {}
        }
    }

    ApiError::Backend {
        status: status.as_u16(),
        detail: body.trim().to_string(),
    }
}
