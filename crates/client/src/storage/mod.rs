//! Durable key-value storage.
//!
//! The stores persist through a narrow synchronous string-to-string surface
//! so the embedding application can supply whatever medium it has (browser
//! local storage via bindings, a config directory on desktop, a plain map in
//! tests). Two backends ship here: [`MemoryStorage`] and [`FileStorage`].

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

use thiserror::Error;

/// Storage keys used by the client.
pub mod keys {
    /// Key for the backend access token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for the backend refresh token.
    pub const REFRESH_TOKEN: &str = "refresh_token";

    /// Namespace key for the persisted auth snapshot.
    pub const AUTH_STORE: &str = "auth-storage";

    /// Namespace key for the persisted cart snapshot.
    pub const CART_STORE: &str = "cart-storage";
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A synchronous durable key-value medium over string values.
///
/// Implementations must tolerate concurrent calls; the client itself issues
/// them from whatever thread the embedder drives it on.
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error when the medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a storage backend.
pub type SharedStorage = Arc<dyn StorageBackend>;
