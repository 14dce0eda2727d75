//! Note denominations and withdrawal breakdowns.
//!
//! The dispenser holds a fixed set of notes. A withdrawal is only accepted
//! when it can be paid out exactly from that set, either by the greedy
//! allocation below or by a breakdown the customer chose.

use crate::error::WithdrawalRejection;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Dispensable note values, largest first.
///
/// The order is significant: greedy allocation walks it front to back and
/// ledger entries list breakdowns in this order.
pub const DENOMINATIONS: [u32; 6] = [500, 200, 100, 50, 20, 10];

/// Returns `true` if `value` is one of [`DENOMINATIONS`].
pub fn is_denomination(value: u32) -> bool {
    DENOMINATIONS.contains(&value)
}

/// A caller-supplied `denomination -> count` map, not yet validated.
///
/// Counts are signed so that a negative count can be reported instead of
/// being unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenominationSelection(BTreeMap<u32, i64>);

impl DenominationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the count for a denomination, replacing any previous count.
    pub fn with(mut self, denomination: u32, count: i64) -> Self {
        self.0.insert(denomination, count);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, u32, i64> {
        self.0.iter()
    }
}

impl FromIterator<(u32, i64)> for DenominationSelection {
    fn from_iter<I: IntoIterator<Item = (u32, i64)>>(iter: I) -> Self {
        DenominationSelection(iter.into_iter().collect())
    }
}

/// Error returned when a selection string cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid denomination entry '{0}', expected <denomination>:<count>")]
pub struct ParseSelectionError(pub String);

impl FromStr for DenominationSelection {
    type Err = ParseSelectionError;

    /// Parses `"500:1;100:2"`. Entries are separated by `;`, whitespace
    /// around entries and their parts is ignored, and a denomination may
    /// appear only once.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut selection = BTreeMap::new();

        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (denom, count) = entry
                .split_once(':')
                .ok_or_else(|| ParseSelectionError(entry.to_string()))?;
            let denom: u32 = denom
                .trim()
                .parse()
                .map_err(|_| ParseSelectionError(entry.to_string()))?;
            let count: i64 = count
                .trim()
                .parse()
                .map_err(|_| ParseSelectionError(entry.to_string()))?;

            if selection.insert(denom, count).is_some() {
                return Err(ParseSelectionError(entry.to_string()));
            }
        }

        Ok(DenominationSelection(selection))
    }
}

/// A validated payout: a count per denomination that adds up to a known total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    /// Counts aligned with [`DENOMINATIONS`].
    counts: [u64; DENOMINATIONS.len()],
    total: u64,
}

impl Breakdown {
    /// Computes a breakdown by taking as many of each note as fit, largest first.
    ///
    /// Fails with [`WithdrawalRejection::NotDispensable`] if a remainder
    /// smaller than the smallest note is left over.
    pub fn greedy(amount: u64) -> std::result::Result<Self, WithdrawalRejection> {
        let mut counts = [0u64; DENOMINATIONS.len()];
        let mut remaining = amount;

        for (slot, &denom) in counts.iter_mut().zip(DENOMINATIONS.iter()) {
            let denom = u64::from(denom);
            *slot = remaining / denom;
            remaining -= *slot * denom;
        }

        if remaining != 0 {
            return Err(WithdrawalRejection::NotDispensable);
        }

        Ok(Breakdown {
            counts,
            total: amount,
        })
    }

    /// Validates a caller-chosen selection against the requested amount.
    ///
    /// Every key must be a known denomination, every count non-negative, and
    /// the weighted sum must equal `amount` exactly.
    pub fn from_selection(
        amount: u64,
        selection: &DenominationSelection,
    ) -> std::result::Result<Self, WithdrawalRejection> {
        let mut counts = [0u64; DENOMINATIONS.len()];
        let mut total: u64 = 0;

        for (&denom, &count) in selection.iter() {
            if count < 0 {
                return Err(WithdrawalRejection::NegativeCount(denom));
            }
            let slot = DENOMINATIONS
                .iter()
                .position(|&d| d == denom)
                .ok_or(WithdrawalRejection::UnknownDenomination(denom))?;

            let count = count as u64;
            counts[slot] = count;
            total = u64::from(denom)
                .checked_mul(count)
                .and_then(|value| total.checked_add(value))
                .ok_or(WithdrawalRejection::SumMismatch)?;
        }

        if total != amount {
            return Err(WithdrawalRejection::SumMismatch);
        }

        Ok(Breakdown { counts, total })
    }

    /// Sum of `denomination * count` over the breakdown.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of notes of the given denomination (0 for unknown values).
    pub fn count(&self, denomination: u32) -> u64 {
        DENOMINATIONS
            .iter()
            .position(|&d| d == denomination)
            .map(|slot| self.counts[slot])
            .unwrap_or(0)
    }

    /// Non-zero `(denomination, count)` pairs, largest denomination first.
    pub fn notes(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        DENOMINATIONS
            .iter()
            .copied()
            .zip(self.counts.iter().copied())
            .filter(|&(_, count)| count > 0)
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (denom, count)) in self.notes().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}x{}", count, denom)?;
        }
        Ok(())
    }
}
