//! Unified error handling for the client crate.
//!
//! Most failure paths inside the stores resolve to a safe default and never
//! reach the embedder; `ClientError` covers the few operations that do
//! surface errors (construction, explicit API calls).

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Top-level error type for the Tiffin client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
