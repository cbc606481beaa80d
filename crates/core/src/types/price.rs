//! Fixed-point price type for `DECIMAL(10, 2)` columns.
//!
//! Used for `productos.precio`, `ordenes.total` and the price snapshot in
//! `orden_producto.precio_unitario`.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The amount has more than two fractional digits.
    #[error("price must have at most {max} decimal places: {value}")]
    TooPrecise {
        /// Maximum fractional digits allowed by the column.
        max: u32,
        /// The rejected amount.
        value: Decimal,
    },
    /// The amount does not fit `DECIMAL(10, 2)`.
    #[error("price exceeds the column range: {0}")]
    OutOfRange(Decimal),
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative monetary amount with at most two decimal places.
///
/// ```
/// use tienda_core::Price;
///
/// let price: Price = "1200.00".parse().unwrap();
/// assert_eq!(price.to_string(), "1200.00");
/// assert!("-1".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Fractional digits stored by the column.
    pub const SCALE: u32 = 2;

    /// Largest value `DECIMAL(10, 2)` can hold.
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two decimal
    /// places, or does not fit the column.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise {
                max: Self::SCALE,
                value: amount,
            });
        }
        if amount > Self::MAX {
            return Err(PriceError::OutOfRange(amount));
        }
        let mut amount = amount;
        amount.rescale(Self::SCALE);
        Ok(Self(amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_two_places() {
        assert_eq!("120".parse::<Price>().unwrap().to_string(), "120.00");
        assert_eq!("85.5".parse::<Price>().unwrap().to_string(), "85.50");
        assert_eq!("0".parse::<Price>().unwrap(), Price::ZERO);
    }

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            "-0.01".parse::<Price>(),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let mut amount = Decimal::ZERO;
        amount.set_sign_negative(true);
        let price = Price::new(amount).unwrap();
        assert_eq!(price, Price::ZERO);
    }

    #[test]
    fn test_rejects_extra_precision() {
        assert!(matches!(
            "1.005".parse::<Price>(),
            Err(PriceError::TooPrecise { max: 2, .. })
        ));
        // Trailing zeros are not extra precision
        assert!("1.500".parse::<Price>().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!("99999999.99".parse::<Price>().is_ok());
        assert!(matches!(
            "100000000.00".parse::<Price>(),
            Err(PriceError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            "doce".parse::<Price>(),
            Err(PriceError::Invalid(_))
        ));
    }

    #[test]
    fn test_deserialize_from_quoted_yaml() {
        let price: Price = serde_yaml::from_str("\"450.00\"").unwrap();
        assert_eq!(Decimal::from(price), Decimal::new(45_000, 2));
    }
}
