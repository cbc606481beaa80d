//! Core types for the storefront schema.
//!
//! This module provides type-safe wrappers for the values stored in the
//! `usuarios`, `productos`, `ordenes` and `orden_producto` tables.

pub mod database_name;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use database_name::{DatabaseName, DatabaseNameError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::{OrderStatus, OrderStatusError};
