//! Account model and balance transitions.
//!
//! Every transition either applies completely (balance updated and one
//! ledger entry appended) or leaves the account exactly as it was.

use crate::denomination::{Breakdown, DenominationSelection};
use crate::error::{AtmError, Result, WithdrawalRejection};
use crate::money::Money;
use crate::transaction::TransactionRecord;
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// A customer account as held by the bank.
///
/// # Invariants
///
/// - `transactions` is append-only and ordered by insertion
/// - each entry's balance follows from the one before it, and the last
///   entry's balance equals `balance`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: String,

    pub username: String,

    /// Lookup key used at login. Stored in plain text and never serialized.
    #[serde(skip_serializing)]
    pub pin: String,

    pub balance: Money,

    #[serde(serialize_with = "serialize_entries")]
    pub transactions: Vec<TransactionRecord>,
}

fn serialize_entries<S>(
    entries: &[TransactionRecord],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(entries.iter().map(|entry| entry.to_string()))
}

impl Account {
    /// Creates an account with an opening balance and an empty ledger.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        pin: impl Into<String>,
        balance: Money,
    ) -> Self {
        Account {
            id: id.into(),
            username: username.into(),
            pin: pin.into(),
            balance,
            transactions: Vec::new(),
        }
    }

    /// Credits the account.
    ///
    /// No amount validation takes place: zero and negative amounts are
    /// applied as given. Fails only if the new balance is out of range, in
    /// which case the account is unchanged.
    pub fn deposit(&mut self, amount: Money, at: NaiveDateTime) -> Result<&TransactionRecord> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| AtmError::AmountOverflow(self.id.clone()))?;
        Ok(self.append(TransactionRecord::deposit(at, amount, self.balance)))
    }

    /// Withdraws `amount`, paying it out with the greedy note allocation.
    pub fn withdraw_auto(
        &mut self,
        amount: Money,
        at: NaiveDateTime,
    ) -> std::result::Result<&TransactionRecord, WithdrawalRejection> {
        let units = Self::whole_positive_units(amount)?;
        let breakdown = Breakdown::greedy(units)?;
        self.apply_withdrawal(amount, breakdown, at)
    }

    /// Withdraws `amount`, paying it out exactly as `selection` describes.
    pub fn withdraw_selected(
        &mut self,
        amount: Money,
        selection: &DenominationSelection,
        at: NaiveDateTime,
    ) -> std::result::Result<&TransactionRecord, WithdrawalRejection> {
        let units = Self::whole_positive_units(amount)?;
        let breakdown = Breakdown::from_selection(units, selection)?;
        self.apply_withdrawal(amount, breakdown, at)
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent_transactions(&self, n: usize) -> &[TransactionRecord] {
        let start = self.transactions.len().saturating_sub(n);
        &self.transactions[start..]
    }

    /// Rendered ledger, oldest first.
    pub fn transaction_log(&self) -> Vec<String> {
        self.transactions.iter().map(|t| t.to_string()).collect()
    }

    fn whole_positive_units(amount: Money) -> std::result::Result<u64, WithdrawalRejection> {
        if !amount.is_positive() {
            return Err(WithdrawalRejection::NonPositiveAmount);
        }
        amount
            .whole_units()
            .ok_or(WithdrawalRejection::NotWholeUnits)
    }

    fn apply_withdrawal(
        &mut self,
        amount: Money,
        breakdown: Breakdown,
        at: NaiveDateTime,
    ) -> std::result::Result<&TransactionRecord, WithdrawalRejection> {
        if amount > self.balance {
            return Err(WithdrawalRejection::InsufficientFunds);
        }

        self.balance -= amount;
        Ok(self.append(TransactionRecord::withdrawal(
            at,
            amount,
            breakdown,
            self.balance,
        )))
    }

    fn append(&mut self, record: TransactionRecord) -> &TransactionRecord {
        self.transactions.push(record);
        &self.transactions[self.transactions.len() - 1]
    }

    /// Verifies that ledger entries chain into the current balance.
    #[cfg(debug_assertions)]
    pub fn check_invariant(&self) -> bool {
        let chained = self
            .transactions
            .windows(2)
            .all(|pair| pair[1].previous_balance() == pair[0].balance);
        let current = self
            .transactions
            .last()
            .map(|last| last.balance == self.balance)
            .unwrap_or(true);
        chained && current
    }
}
