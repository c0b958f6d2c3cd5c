//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Currency symbol used for display.
    pub const SYMBOL: &'static str = "₹";

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Percentage saved against `original`, when `original` is higher.
    ///
    /// See [`discount_percent`].
    #[must_use]
    pub fn discount_from(&self, original: Self) -> Option<u32> {
        discount_percent(*self, original)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::SYMBOL, self.0.normalize())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Whole-number discount of `price` against `original`.
///
/// Computed as `round((1 - price / original) * 100)` with halves rounded away
/// from zero. Returns `None` unless `original` is strictly greater than
/// `price` and positive.
///
/// ```
/// use medicare_core::{Price, discount_percent};
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(75, 0));
/// let original = Price::new(Decimal::new(100, 0));
/// assert_eq!(discount_percent(price, original), Some(25));
/// assert_eq!(discount_percent(original, price), None);
/// ```
#[must_use]
pub fn discount_percent(price: Price, original: Price) -> Option<u32> {
    if original.0 <= price.0 || original.0 <= Decimal::ZERO {
        return None;
    }
    let ratio = Decimal::ONE - price.0 / original.0;
    let percent = (ratio * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    percent.to_u32()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(units: i64) -> Price {
        Price::new(Decimal::new(units, 0))
    }

    #[test]
    fn test_discount_rounds_to_nearest() {
        // 1 - 199/299 = 0.3344...
        assert_eq!(discount_percent(price(199), price(299)), Some(33));
        // 1 - 2/3 = 0.333.., 1 - 1/3 = 0.666..
        assert_eq!(discount_percent(price(1), price(3)), Some(67));
    }

    #[test]
    fn test_no_discount_when_not_cheaper() {
        assert_eq!(discount_percent(price(100), price(100)), None);
        assert_eq!(discount_percent(price(120), price(100)), None);
        assert_eq!(discount_percent(price(0), price(0)), None);
    }

    #[test]
    fn test_display_uses_rupee_symbol() {
        assert_eq!(Price::new(Decimal::new(4999, 2)).to_string(), "₹49.99");
        assert_eq!(Price::new(Decimal::new(1000, 2)).to_string(), "₹10");
    }

    #[test]
    fn test_deserializes_from_number_and_string() {
        let from_number: Price = serde_json::from_str("12.5").unwrap();
        let from_string: Price = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(from_number, from_string);
    }
}
