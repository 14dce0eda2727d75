//! Exact monetary amounts.
//!
//! Wraps `rust_decimal` so that balances never pick up floating-point drift.
//! Values are displayed in their shortest form (`370`, `100.5`), which is the
//! form used inside ledger entries.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// An exact decimal amount of money.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use atm_ledger::Money;
///
/// let amount = Money::from_str("630.00").unwrap();
/// assert_eq!(amount.to_string(), "630");
/// assert_eq!(amount.whole_units(), Some(630));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Money(value)
    }

    /// Builds an amount from a whole number of currency units.
    pub fn from_units(units: u64) -> Self {
        Money(Decimal::from(units))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` for amounts strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns the amount as a whole number of units.
    ///
    /// `None` for negative amounts, amounts with a fractional part, and
    /// amounts that do not fit in a `u64`.
    pub fn whole_units(&self) -> Option<u64> {
        if !self.0.fract().is_zero() {
            return None;
        }
        self.0.to_u64()
    }

    /// Adds without panicking; `None` if the result is out of range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl From<u64> for Money {
    fn from(units: u64) -> Self {
        Money::from_units(units)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}
