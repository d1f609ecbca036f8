//! Integer money in minor currency units.
//!
//! Prices, cart totals and order totals are stored as `i64` minor units
//! (paise, cents). Conversion to a decimal amount only happens for display.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Number of minor units in one major unit is `10^MINOR_DIGITS`.
const MINOR_DIGITS: u32 = 2;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    ToSchema,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Decimal amount in major units, always carrying two fractional digits.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_DIGITS)
    }

    /// `unit × quantity`, failing instead of wrapping on overflow.
    pub fn times(self, quantity: i32) -> AppResult<Self> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("money overflow")))
    }

    pub fn checked_add(self, other: Money) -> AppResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("money overflow")))
    }

    /// Symbol-prefixed amount, e.g. `₹25.00`.
    pub fn format_with(self, symbol: &str) -> String {
        format!("{symbol}{}", self.to_decimal())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_two_fraction_digits() {
        assert_eq!(Money::from_minor(2500).format_with("₹"), "₹25.00");
        assert_eq!(Money::from_minor(1099).format_with("$"), "$10.99");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.format_with("₹"), "₹0.00");
    }

    #[test]
    fn times_multiplies_by_quantity() {
        assert_eq!(Money::from_minor(1000).times(2).unwrap(), Money::from_minor(2000));
        assert!(Money::from_minor(i64::MAX).times(2).is_err());
    }

    #[test]
    fn sums_line_subtotals() {
        let total = [Money::from_minor(2000), Money::from_minor(500)]
            .into_iter()
            .try_fold(Money::ZERO, Money::checked_add)
            .unwrap();
        assert_eq!(total, Money::from_minor(2500));
        assert!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)).is_err());
    }
}
