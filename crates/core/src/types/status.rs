//! Order status values stored in `ordenes.estado`.
//!
//! The column itself is an open `VARCHAR(20)` (no check constraint). The four
//! named variants are the statuses the application writes, with the Spanish
//! words the schema has always used; anything else that fits the column is
//! kept verbatim in [`OrderStatus::Other`].

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderStatus`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderStatusError {
    #[error("order status cannot be empty")]
    Empty,
    #[error("order status must be at most {max} characters")]
    TooLong { max: usize },
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderStatus {
    /// Placed but not yet shipped. Column default.
    #[default]
    Pending,
    /// Handed to the carrier.
    Shipped,
    /// Delivered and closed.
    Completed,
    /// Cancelled before completion.
    Cancelled,
    /// Any other literal the column accepts.
    Other(String),
}

impl OrderStatus {
    /// Maximum length of the `estado` column.
    pub const MAX_LENGTH: usize = 20;

    /// The named statuses, in lifecycle order.
    pub const KNOWN: [Self; 4] = [
        Self::Pending,
        Self::Shipped,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Parse a status literal.
    ///
    /// # Errors
    ///
    /// Returns an error if the literal is empty or does not fit the column.
    pub fn parse(s: &str) -> Result<Self, OrderStatusError> {
        if s.is_empty() {
            return Err(OrderStatusError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(OrderStatusError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self::KNOWN
            .into_iter()
            .find(|status| status.as_str() == s)
            .unwrap_or_else(|| Self::Other(s.to_owned())))
    }

    /// The literal stored in the `estado` column.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pendiente",
            Self::Shipped => "enviada",
            Self::Completed => "completada",
            Self::Cancelled => "cancelada",
            Self::Other(literal) => literal,
        }
    }

    /// Whether this is one of the named statuses.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = OrderStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(literal) => literal,
            known => known.as_str().to_owned(),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}
