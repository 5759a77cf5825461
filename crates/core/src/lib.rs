//! Tiffin Core - Shared domain types.
//!
//! This crate provides the types shared by every Tiffin component:
//! - `client` - Headless client core (stores, session sync, backend API client)
//! - the storefront and admin frontends that embed it
//!
//! # Architecture
//!
//! The core crate contains only types and pure state machines - no I/O, no
//! HTTP, no storage access. Everything here is synchronous and total;
//! persistence and server synchronization live in `tiffin-client`.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`cart`] - Pure shopping-cart state machine
//! - [`favorites`] - Favorite-item set with snapshot semantics
//! - [`profile`] - Canonical user identity
//! - [`delivery`] - Working hours and delivery-zone matching

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod delivery;
pub mod favorites;
pub mod profile;
pub mod types;

pub use types::*;
