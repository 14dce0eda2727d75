//! Account storage.
//!
//! The ledger only talks to storage through [`AccountRepository`], so it can
//! run against the in-memory store here or anything else that can look an
//! account up by PIN and write it back.

use crate::account::Account;
use crate::error::{AtmError, Result};
use crate::money::Money;
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;

/// Persistence port for accounts.
pub trait AccountRepository {
    /// Looks up the account registered under `pin`.
    fn find_by_pin(&self, pin: &str) -> Option<Account>;

    /// Stores the full account, replacing any previous version.
    fn save(&mut self, account: Account) -> Result<Account>;

    /// All stored accounts, in no particular order.
    fn accounts(&self) -> Vec<Account>;
}

/// Accounts kept in a map keyed by PIN. Last write wins.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccountRepository {
    accounts: HashMap<String, Account>,
}

/// A seed row: `id,username,pin,balance`.
#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: String,
    username: String,
    pin: String,
    balance: Money,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from a CSV reader with header `id,username,pin,balance`.
    ///
    /// Ids and PINs must be unique across the seed and opening balances
    /// must not be negative.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let mut repo = Self::new();
        let mut ids = HashSet::new();

        for (row_idx, result) in csv_reader.deserialize::<AccountRecord>().enumerate() {
            let row = row_idx + 2; // 1-indexed, accounting for header row
            let record = result.map_err(|e| AtmError::InvalidRecord {
                row,
                message: e.to_string(),
            })?;

            if record.pin.is_empty() {
                return Err(AtmError::InvalidRecord {
                    row,
                    message: "empty PIN".to_string(),
                });
            }
            if record.balance < Money::ZERO {
                return Err(AtmError::InvalidRecord {
                    row,
                    message: format!("negative opening balance {}", record.balance),
                });
            }
            if !ids.insert(record.id.clone()) {
                return Err(AtmError::DuplicateAccount { key: record.id, row });
            }
            if repo.accounts.contains_key(&record.pin) {
                return Err(AtmError::DuplicateAccount {
                    key: format!("{} (PIN already in use)", record.id),
                    row,
                });
            }

            let account = Account::new(record.id, record.username, record.pin, record.balance);
            debug!("Row {}: Loaded account {}", row, account.id);
            repo.accounts.insert(account.pin.clone(), account);
        }

        Ok(repo)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountRepository for InMemoryAccountRepository {
    fn find_by_pin(&self, pin: &str) -> Option<Account> {
        self.accounts.get(pin).cloned()
    }

    fn save(&mut self, account: Account) -> Result<Account> {
        self.accounts.insert(account.pin.clone(), account.clone());
        Ok(account)
    }

    fn accounts(&self) -> Vec<Account> {
        self.accounts.values().cloned().collect()
    }
}
