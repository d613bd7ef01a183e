//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are domain objects that are **immutable** and **compared by value**.
/// To "modify" a value object, create a new one with the new values.
///
/// ```ignore
/// let a = Price::try_new(Decimal::new(2550, 2))?;
/// let b = Price::try_new(Decimal::new(255, 1))?;
/// assert_eq!(a, b); // 25.50 == 25.5
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Digits allowed after the decimal point.
pub const PRICE_SCALE: u32 = 2;

/// Exclusive upper bound, matching a `NUMERIC(12, 2)` column.
pub fn price_limit() -> Decimal {
    Decimal::new(10_000_000_000, 0)
}

/// Unit price of a product. Strictly positive, whole cents, below `price_limit()`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub fn try_new(amount: Decimal) -> DomainResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("price must be greater than 0"));
        }
        if amount.normalize().scale() > PRICE_SCALE {
            return Err(DomainError::validation(
                "price must have at most 2 decimal places",
            ));
        }
        if amount >= price_limit() {
            return Err(DomainError::validation(
                "price must be less than 10000000000",
            ));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl ValueObject for Price {}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Units on hand. Never negative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StockLevel(i64);

impl StockLevel {
    pub fn try_new(units: i64) -> DomainResult<Self> {
        if units < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(Self(units))
    }

    pub fn units(&self) -> i64 {
        self.0
    }

    /// Remove `count` units, refusing to go below zero.
    ///
    /// `count` must be positive; the caller validates that before reaching here.
    pub fn take(self, count: i64) -> DomainResult<Self> {
        if count <= 0 {
            return Err(DomainError::validation("count must be greater than 0"));
        }
        if count > self.0 {
            return Err(DomainError::insufficient_stock(count, self.0));
        }
        Ok(Self(self.0 - count))
    }
}

impl ValueObject for StockLevel {}

impl core::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
