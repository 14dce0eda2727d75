//! Ledger entries.
//!
//! Entries are kept structured inside an account and only turned into text
//! when they leave the crate (statements, JSON, CSV summaries).

use crate::denomination::Breakdown;
use crate::money::Money;
use chrono::NaiveDateTime;
use std::fmt;

/// Timestamp layout used when rendering entries.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// What kind of balance change an entry records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Funds credited to the account.
    Deposit,

    /// Funds paid out as the given notes.
    Withdraw(Breakdown),
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Deposit => "Deposit",
            EntryKind::Withdraw(_) => "Withdraw",
        }
    }
}

/// An immutable, timestamped ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub timestamp: NaiveDateTime,

    pub kind: EntryKind,

    /// Amount moved by this entry (always as requested, never signed).
    pub amount: Money,

    /// Account balance right after this entry was applied.
    pub balance: Money,
}

impl TransactionRecord {
    pub fn deposit(timestamp: NaiveDateTime, amount: Money, balance: Money) -> Self {
        TransactionRecord {
            timestamp,
            kind: EntryKind::Deposit,
            amount,
            balance,
        }
    }

    pub fn withdrawal(
        timestamp: NaiveDateTime,
        amount: Money,
        breakdown: Breakdown,
        balance: Money,
    ) -> Self {
        TransactionRecord {
            timestamp,
            kind: EntryKind::Withdraw(breakdown),
            amount,
            balance,
        }
    }

    /// The balance this entry was applied to.
    pub fn previous_balance(&self) -> Money {
        match self.kind {
            EntryKind::Deposit => self.balance - self.amount,
            EntryKind::Withdraw(_) => self.balance + self.amount,
        }
    }

    /// Notes paid out, if this is a withdrawal.
    pub fn breakdown(&self) -> Option<&Breakdown> {
        match &self.kind {
            EntryKind::Deposit => None,
            EntryKind::Withdraw(breakdown) => Some(breakdown),
        }
    }
}

/// Renders `<timestamp> | <label> ₹<amount>[ [<notes>]] | Balance ₹<balance>`.
impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} ₹{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.kind.label(),
            self.amount
        )?;
        if let EntryKind::Withdraw(breakdown) = &self.kind {
            write!(f, " [{}]", breakdown)?;
        }
        write!(f, " | Balance ₹{}", self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_render_deposit() {
        let record = TransactionRecord::deposit(at(), Money::from(250), Money::from(1250));
        assert_eq!(
            record.to_string(),
            "2024-03-01T09:30:00 | Deposit ₹250 | Balance ₹1250"
        );
        assert_eq!(record.previous_balance(), Money::from(1000));
        assert!(record.breakdown().is_none());
    }

    #[test]
    fn test_render_withdrawal() {
        let breakdown = Breakdown::greedy(630).unwrap();
        let record =
            TransactionRecord::withdrawal(at(), Money::from(630), breakdown, Money::from(370));
        assert_eq!(
            record.to_string(),
            "2024-03-01T09:30:00 | Withdraw ₹630 [1x500, 1x100, 1x20, 1x10] | Balance ₹370"
        );
        assert_eq!(record.previous_balance(), Money::from(1000));
        assert_eq!(record.kind.label(), "Withdraw");
    }
}
