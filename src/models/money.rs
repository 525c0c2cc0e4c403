//! Money type for representing currency amounts
//!
//! Budgets and expenses are tracked in whole currency units (i64). There is no
//! fractional part; daily limits are derived with floor division, so any
//! remainder is simply not handed out. Arithmetic saturates at the `i64`
//! bounds instead of overflowing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount accepted for a budget, savings target or expense
    pub const MAX_AMOUNT: Money = Money(1_000_000_000_000);

    /// Create a Money amount from whole units
    ///
    /// # Examples
    /// ```
    /// use spendwise::models::Money;
    /// let amount = Money::from_units(250);
    /// assert_eq!(amount.units(), 250);
    /// ```
    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in whole units
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Whether the amount is above [`Money::MAX_AMOUNT`]
    pub const fn exceeds_max(&self) -> bool {
        self.0 > Self::MAX_AMOUNT.0
    }

    /// Split evenly across `parts`, rounding toward negative infinity.
    ///
    /// `parts` below 1 is treated as 1 so the division can never fail.
    ///
    /// ```
    /// use spendwise::models::Money;
    /// assert_eq!(Money::from_units(100).split_floor(3), Money::from_units(33));
    /// assert_eq!(Money::from_units(-10).split_floor(3), Money::from_units(-4));
    /// ```
    pub fn split_floor(&self, parts: i64) -> Self {
        Self(self.0.div_euclid(parts.max(1)))
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "250", "-250", "$250", "1,250"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed),
        };

        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let digits: String = rest.chars().filter(|c| *c != ',' && *c != '_').collect();

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyParseError::InvalidFormat(s.to_string()));
        }

        let units: i64 = digits
            .parse()
            .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?;

        Ok(Self(if negative { -units } else { units }))
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}", symbol, self.0.unsigned_abs())
        } else {
            format!("{}{}", symbol, self.0)
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pad as a whole so `{:>8}` aligns columns in tables.
        f.pad(&self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_units(1050)), "$1050");
        assert_eq!(format!("{}", Money::zero()), "$0");
        assert_eq!(format!("{}", Money::from_units(-30)), "-$30");
        assert_eq!(format!("{:>6}", Money::from_units(5)), "    $5");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(1000);
        let b = Money::from_units(500);

        assert_eq!((a + b).units(), 1500);
        assert_eq!((a - b).units(), 500);
        assert_eq!((b - a).units(), -500);
        assert_eq!((-a).units(), -1000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_units(i64::MAX);
        let min = Money::from_units(i64::MIN);

        assert_eq!(max + max, max);
        assert_eq!(min - max, min);
        assert_eq!(-min, max);
        assert_eq!(min.abs(), max);
        assert_eq!(min.format_with_symbol("$"), "-$9223372036854775808");

        let mut total = max;
        total += Money::from_units(1);
        assert_eq!(total, max);
    }

    #[test]
    fn test_max_amount_bound() {
        assert!(!Money::MAX_AMOUNT.exceeds_max());
        assert!((Money::MAX_AMOUNT + Money::from_units(1)).exceeds_max());
    }

    #[test]
    fn test_split_floor_absorbs_remainder() {
        assert_eq!(Money::from_units(100).split_floor(3).units(), 33);
        assert_eq!(Money::from_units(300).split_floor(3).units(), 100);
        assert_eq!(Money::from_units(7).split_floor(0).units(), 7);
        assert_eq!(Money::from_units(7).split_floor(-4).units(), 7);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("250").unwrap().units(), 250);
        assert_eq!(Money::parse("$250").unwrap().units(), 250);
        assert_eq!(Money::parse("-250").unwrap().units(), -250);
        assert_eq!(Money::parse(" 1,250 ").unwrap().units(), 1250);
        assert!(Money::parse("12.50").is_err());
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_units(100), Money::from_units(200), Money::from_units(300)];
        let by_ref: Money = amounts.iter().sum();
        let total: Money = amounts.into_iter().sum();
        assert_eq!(total.units(), 600);
        assert_eq!(by_ref, total);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_units(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
