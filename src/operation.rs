//! Operation records for batch processing.

use crate::denomination::DenominationSelection;
use crate::money::Money;
use serde::Deserialize;
use std::str::FromStr;

/// Raw operation record as read from CSV: `pin,op,amount,denominations`.
///
/// `amount` is only used by deposits and withdrawals; `denominations`
/// (`500:1;100:2`) only by withdrawals.
#[derive(Debug, Deserialize)]
pub struct OperationRecord {
    pub pin: String,

    /// login, balance, deposit, withdraw, statement
    pub op: String,

    pub amount: Option<String>,

    pub denominations: Option<String>,
}

impl OperationRecord {
    /// Parses the raw CSV record into a typed operation.
    ///
    /// A withdrawal with a non-empty `denominations` field becomes an
    /// explicit-denomination withdrawal; otherwise notes are picked
    /// automatically.
    pub fn parse(&self) -> std::result::Result<ParsedOperation, String> {
        let op = self.op.trim().to_lowercase();

        let kind = match op.as_str() {
            "login" => OpKind::Login,
            "balance" => OpKind::Balance,
            "statement" => OpKind::Statement,
            "deposit" => OpKind::Deposit(self.parse_amount()?),
            "withdraw" | "withdrawal" => {
                let amount = self.parse_amount()?;
                let selection = self.parse_selection()?;
                match selection {
                    Some(selection) => OpKind::WithdrawWith(amount, selection),
                    None => OpKind::Withdraw(amount),
                }
            }
            other => return Err(format!("unknown operation '{}'", other)),
        };

        Ok(ParsedOperation {
            pin: self.pin.trim().to_string(),
            kind,
        })
    }

    fn parse_amount(&self) -> std::result::Result<Money, String> {
        let raw = self
            .amount
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "missing amount".to_string())?;
        Money::from_str(raw).map_err(|e| format!("invalid amount '{}': {}", raw, e))
    }

    fn parse_selection(&self) -> std::result::Result<Option<DenominationSelection>, String> {
        let raw = match self.denominations.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };
        let selection = DenominationSelection::from_str(raw).map_err(|e| e.to_string())?;
        Ok(Some(selection).filter(|s| !s.is_empty()))
    }
}

/// A parsed operation ready for the ledger.
#[derive(Debug, Clone)]
pub struct ParsedOperation {
    pub pin: String,

    pub kind: OpKind,
}

/// Operation variants with associated data.
#[derive(Debug, Clone)]
pub enum OpKind {
    /// Resolve the account without changing it.
    Login,

    /// Report the current balance.
    Balance,

    /// Credit funds.
    Deposit(Money),

    /// Withdraw with automatically chosen notes.
    Withdraw(Money),

    /// Withdraw with the given notes.
    WithdrawWith(Money, DenominationSelection),

    /// Report the full ledger.
    Statement,
}
