//! Backend token pair and its storage lifecycle.
//!
//! The backend issues an access/refresh pair that is independent of the
//! session provider's own session token. The pair lives in durable storage
//! under [`keys::ACCESS_TOKEN`] and [`keys::REFRESH_TOKEN`]; expiry metadata
//! is kept in memory only and checked lazily.

use chrono::Utc;
use tracing::warn;

use crate::storage::{SharedStorage, StorageError, keys};

/// A backend access/refresh token pair.
///
/// Implements `Debug` manually to redact both tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// The access token sent as a bearer credential.
    pub access_token: String,
    /// The refresh token exchanged for a new pair.
    pub refresh_token: String,
    /// Token lifetime in seconds, when the issuer reported one.
    pub expires_in: Option<i64>,
    /// Unix timestamp when the pair was obtained.
    pub obtained_at: i64,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

impl TokenPair {
    /// Create a pair obtained now, with unknown lifetime.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in: None,
            obtained_at: Utc::now().timestamp(),
        }
    }

    /// Attach a reported lifetime in seconds.
    #[must_use]
    pub const fn with_expiry(mut self, expires_in: i64) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Check if the access token is expired (with 60s buffer).
    ///
    /// A pair with no reported lifetime never counts as expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_in.is_some_and(|expires_in| {
            let now = Utc::now().timestamp();
            let expires_at = self.obtained_at + expires_in;
            now >= (expires_at - 60)
        })
    }

    /// Load the pair from durable storage, if both halves are present.
    ///
    /// Storage read failures are logged and reported as absence.
    #[must_use]
    pub fn load(storage: &SharedStorage) -> Option<Self> {
        let access = read_key(storage, keys::ACCESS_TOKEN)?;
        let refresh = read_key(storage, keys::REFRESH_TOKEN)?;
        Some(Self::new(access, refresh))
    }

    /// Write both halves to durable storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing medium rejects either write.
    pub fn store(&self, storage: &SharedStorage) -> Result<(), StorageError> {
        storage.set(keys::ACCESS_TOKEN, &self.access_token)?;
        storage.set(keys::REFRESH_TOKEN, &self.refresh_token)?;
        Ok(())
    }

    /// Remove both halves from durable storage, best effort.
    pub fn purge(storage: &SharedStorage) {
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN] {
            if let Err(e) = storage.remove(key) {
                warn!(key, error = %e, "failed to remove stored token");
            }
        }
    }
}

fn read_key(storage: &SharedStorage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "failed to read stored token");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_token_is_expired() {
        let now = Utc::now().timestamp();

        // Pair that expired an hour ago
        let expired = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: Some(3600),
            obtained_at: now - 7200,
        };
        assert!(expired.is_expired());

        // Pair that expires in an hour
        let valid = TokenPair::new("a", "r").with_expiry(3600);
        assert!(!valid.is_expired());

        // Pair that expires in 30 seconds (expired due to 60s buffer)
        let almost = TokenPair::new("a", "r").with_expiry(30);
        assert!(almost.is_expired());

        // Unknown lifetime never expires
        let unknown = TokenPair::new("a", "r");
        assert!(!unknown.is_expired());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_store_load_purge_roundtrip() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());

        assert!(TokenPair::load(&storage).is_none());

        let pair = TokenPair::new("acc-1", "ref-1");
        pair.store(&storage).unwrap();

        let loaded = TokenPair::load(&storage).unwrap();
        assert_eq!(loaded.access_token, "acc-1");
        assert_eq!(loaded.refresh_token, "ref-1");

        TokenPair::purge(&storage);
        assert!(TokenPair::load(&storage).is_none());
        assert!(storage.get(keys::ACCESS_TOKEN).unwrap().is_none());
    }

    #[test]
    fn test_load_requires_both_halves() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        storage.set(keys::ACCESS_TOKEN, "acc-only").unwrap();
        assert!(TokenPair::load(&storage).is_none());
    }
}
