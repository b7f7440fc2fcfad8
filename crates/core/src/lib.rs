//! Recipe Core - Shared types library.
//!
//! This crate provides common types used across all recipe components:
//! - `api` - The recipe HTTP API (users, tags, ingredients, recipes)
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and
//!   upload path naming

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
