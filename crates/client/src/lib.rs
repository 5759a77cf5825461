//! Tiffin Client - Headless client core for the Tiffin storefront.
//!
//! This crate is the state-management layer the frontends embed: persisted
//! cart and auth stores, a server-synchronized favorites store with
//! optimistic updates, a backend API client, and a session synchronizer that
//! reconciles the external session provider with the backend's own token
//! pair.
//!
//! # Architecture
//!
//! - [`storage`] - Durable key-value backends (memory, file)
//! - [`persist`] - Generic persisted store with hydration and subscriptions
//! - [`api`] - Backend REST API client
//! - [`store`] - Cart, favorites, and auth stores plus their cross-wiring
//! - [`session`] - Session provider seam and the synchronizer
//! - [`state`] - One-stop construction of the whole client
//!
//! # Failure philosophy
//!
//! Nothing in this crate is allowed to take the UI down. Backend rejections
//! fall back to empty or previous-good state, storage failures are logged
//! and swallowed, and a malformed persisted snapshot counts as absent.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod persist;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use state::TiffinClient;
