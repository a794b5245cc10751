//! Money value object stored in minor currency units.
//!
//! Gateways exchange amounts as decimal strings ("12.50"). Everything in
//! this crate works on whole cents and only converts at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Amount of money in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// True when the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies by a whole count, saturating on overflow.
    pub fn times(&self, count: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(count)))
    }

    /// Applies a tax percentage, rounding to the nearest cent.
    ///
    /// `Money::from_cents(1000).with_tax_percent(10.0)` is 11.00.
    pub fn with_tax_percent(&self, percent: f64) -> Self {
        Self((self.0 as f64 * (1.0 + percent / 100.0)).round() as i64)
    }

    /// Formats as a plain two-decimal string, the wire format gateways accept.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}
