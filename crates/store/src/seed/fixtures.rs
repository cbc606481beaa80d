//! Declarative seed data.
//!
//! ## YAML Format
//!
//! ```yaml
//! users:
//!   - name: Juan Pérez
//!     email: juan@example.com
//! products:
//!   - name: Laptop
//!     description: Laptop de alta gama
//!     price: "1200.00"
//!     stock: 10
//! orders:
//!   - user: 1          # 1-based position in `users`
//!     status: completada
//!     total: "1200.00"
//! order_lines:
//!   - order: 1         # 1-based position in `orders`
//!     product: 1       # 1-based position in `products`
//!     quantity: 1
//!     unit_price: "1200.00"
//! ```
//!
//! Prices are quoted so they parse as exact decimals.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use tienda_core::{Email, OrderStatus, Price};

/// Fixture set compiled into the binary.
const BUNDLED_FIXTURES: &str = include_str!("../../fixtures/seed.yaml");

/// Longest `nombre` the schema accepts.
const MAX_NAME_LENGTH: usize = 100;

/// Errors loading or validating fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        message: String,
    },

    /// The YAML is malformed or does not match the fixture layout.
    #[error("failed to parse fixtures: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The fixtures parsed but are inconsistent.
    #[error("{} validation errors found: {}", .0.len(), .0.join("; "))]
    Invalid(Vec<String>),

    /// A reference could not be resolved against the captured ids.
    #[error("{entity} at position {position} does not exist")]
    MissingReference {
        /// Referenced list (`user`, `order` or `product`).
        entity: &'static str,
        /// 1-based position that was requested.
        position: usize,
    },
}

/// A row for `usuarios`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserFixture {
    /// Display name.
    pub name: String,
    /// Unique email.
    pub email: Email,
}

/// A row for `productos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductFixture {
    /// Product name.
    pub name: String,
    /// Optional long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Current unit price.
    pub price: Price,
    /// Units in stock.
    #[serde(default)]
    pub stock: i32,
}

/// A row for `ordenes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderFixture {
    /// 1-based position of the owning user in [`SeedFixtures::users`].
    pub user: usize,
    /// Order status. Any literal of 1..=20 characters is accepted.
    #[serde(default)]
    pub status: OrderStatus,
    /// Stored total, inserted as written.
    pub total: Price,
}

/// A row for `orden_producto`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderLineFixture {
    /// 1-based position of the order in [`SeedFixtures::orders`].
    pub order: usize,
    /// 1-based position of the product in [`SeedFixtures::products`].
    pub product: usize,
    /// Units bought.
    pub quantity: i32,
    /// Unit price at the time of purchase.
    pub unit_price: Price,
}

/// A full seed data set, in insertion order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFixtures {
    /// Users, inserted first.
    pub users: Vec<UserFixture>,
    /// Products, inserted second.
    pub products: Vec<ProductFixture>,
    /// Orders, inserted third.
    #[serde(default)]
    pub orders: Vec<OrderFixture>,
    /// Order lines, inserted last.
    #[serde(default)]
    pub order_lines: Vec<OrderLineFixture>,
}

impl SeedFixtures {
    /// The fixture set shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled file is broken.
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::from_yaml(BUNDLED_FIXTURES)
    }

    /// Parse and validate fixtures from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Parse` for malformed YAML and
    /// `FixtureError::Invalid` if validation finds problems.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        let fixtures: Self = serde_yaml::from_str(yaml)?;
        let errors = fixtures.validate();
        if !errors.is_empty() {
            return Err(FixtureError::Invalid(errors));
        }
        Ok(fixtures)
    }

    /// Read, parse and validate a fixture file.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Io` if the file cannot be read, otherwise as
    /// [`SeedFixtures::from_yaml`].
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|e| FixtureError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Check references and uniqueness before anything touches the database.
    ///
    /// Order totals are deliberately not compared with their lines.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut emails = HashSet::new();
        for (i, user) in self.users.iter().enumerate() {
            let position = i + 1;
            check_name(&mut errors, "user", position, &user.name);
            if !emails.insert(user.email.as_str()) {
                errors.push(format!("user {position}: duplicate email {}", user.email));
            }
        }

        for (i, product) in self.products.iter().enumerate() {
            let position = i + 1;
            check_name(&mut errors, "product", position, &product.name);
            if product.stock < 0 {
                errors.push(format!(
                    "product {position}: stock cannot be negative ({})",
                    product.stock
                ));
            }
        }

        for (i, order) in self.orders.iter().enumerate() {
            if !in_range(order.user, self.users.len()) {
                errors.push(format!(
                    "order {}: user {} does not exist ({} users)",
                    i + 1,
                    order.user,
                    self.users.len()
                ));
            }
        }

        let mut pairs = HashSet::new();
        for (i, line) in self.order_lines.iter().enumerate() {
            let position = i + 1;
            if !in_range(line.order, self.orders.len()) {
                errors.push(format!(
                    "order line {position}: order {} does not exist ({} orders)",
                    line.order,
                    self.orders.len()
                ));
            }
            if !in_range(line.product, self.products.len()) {
                errors.push(format!(
                    "order line {position}: product {} does not exist ({} products)",
                    line.product,
                    self.products.len()
                ));
            }
            if line.quantity <= 0 {
                errors.push(format!(
                    "order line {position}: quantity must be positive ({})",
                    line.quantity
                ));
            }
            if !pairs.insert((line.order, line.product)) {
                errors.push(format!(
                    "order line {position}: product {} already appears in order {}",
                    line.product, line.order
                ));
            }
        }

        errors
    }
}

const fn in_range(position: usize, len: usize) -> bool {
    position >= 1 && position <= len
}

fn check_name(errors: &mut Vec<String>, entity: &str, position: usize, name: &str) {
    if name.trim().is_empty() {
        errors.push(format!("{entity} {position}: name cannot be empty"));
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(format!(
            "{entity} {position}: name exceeds {MAX_NAME_LENGTH} characters"
        ));
    }
}
