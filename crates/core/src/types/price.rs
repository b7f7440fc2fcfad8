//! Type-safe recipe price using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(5, 2)`: at most three integer digits and
//! exactly two decimal places. Serialized as a string (`"5.00"`) so clients
//! never see binary floating point.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// More than two decimal places were supplied.
    #[error("price must have at most {max} decimal places")]
    TooPrecise {
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// The amount does not fit the column.
    #[error("price must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// A recipe price with fixed two-place scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Number of decimal places kept.
    pub const SCALE: u32 = 2;

    /// Exclusive upper bound (`NUMERIC(5, 2)` tops out at 999.99).
    pub const MAX_EXCLUSIVE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two
    /// significant decimal places, or is 1000 or more.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let mut normalized = amount.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(PriceError::TooPrecise { max: Self::SCALE });
        }

        if normalized >= Self::MAX_EXCLUSIVE {
            return Err(PriceError::TooLarge {
                max: Self::MAX_EXCLUSIVE,
            });
        }

        normalized.rescale(Self::SCALE);
        Ok(Self(normalized))
    }

    /// Create a price from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Price::new`].
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, Self::SCALE))
    }

    /// The amount as a decimal with scale 2.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
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
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let mut amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        amount.rescale(Self::SCALE);
        Ok(Self(amount))
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
    fn test_new_rescales_to_two_places() {
        let price = Price::new(Decimal::new(6, 0)).unwrap();
        assert_eq!(price.to_string(), "6.00");

        let price = Price::new(Decimal::new(5500, 3)).unwrap();
        assert_eq!(price.to_string(), "5.50");
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(599).unwrap().to_string(), "5.99");
        assert_eq!(Price::from_cents(0).unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Price::from_cents(-1), Err(PriceError::Negative));
    }

    #[test]
    fn test_rejects_three_decimal_places() {
        assert_eq!(
            Price::new(Decimal::new(1005, 3)),
            Err(PriceError::TooPrecise { max: 2 })
        );
    }

    #[test]
    fn test_upper_bound() {
        assert!(Price::from_cents(99_999).is_ok());
        assert!(matches!(
            Price::from_cents(100_000),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::from_cents(500).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"5.00\"");
    }

    #[test]
    fn test_deserializes_from_string_and_number() {
        let from_str: Price = serde_json::from_str("\"6.00\"").unwrap();
        let from_num: Price = serde_json::from_str("6").unwrap();
        assert_eq!(from_str, from_num);
        assert!(serde_json::from_str::<Price>("\"-2.00\"").is_err());
    }
}
