//! Tienda Core - Shared domain types.
//!
//! This crate provides the types used across the tienda components:
//! - `store` - Schema management, seeding and the ad-hoc query runner
//! - `cli` - The `tienda` command-line front-end
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access.
//! Database encoding lives behind the optional `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, statuses
//!   and database names

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
