//! Client-side models that do not belong to the shared domain crate.

pub mod token;

pub use token::TokenPair;
