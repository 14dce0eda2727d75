//! # ATM Ledger
//!
//! Account ledger for an ATM back end: PIN login, balance inquiry,
//! deposits, withdrawals paid out in a fixed set of notes, and mini
//! statements.
//!
//! ## Design Principles
//!
//! - **Exact amounts**: balances use `rust_decimal`, never floats
//! - **All or nothing**: a rejected withdrawal leaves the account untouched
//! - **Structured ledger**: entries are typed records, rendered to text only
//!   at the boundary
//! - **Storage behind a trait**: the ledger works against any
//!   [`AccountRepository`]
//!
//! ## Example
//!
//! ```
//! use atm_ledger::{Account, AccountLedger, AccountRepository, InMemoryAccountRepository, Money};
//!
//! let mut repo = InMemoryAccountRepository::new();
//! repo.save(Account::new("1", "asha", "1234", Money::from(1000))).unwrap();
//!
//! let mut ledger = AccountLedger::new(repo);
//! let mut account = ledger.login("1234").unwrap();
//! let account = ledger.withdraw(&mut account, Money::from(630)).unwrap();
//! assert_eq!(account.balance, Money::from(370));
//! ```

pub mod account;
pub mod denomination;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod money;
pub mod operation;
pub mod repository;
pub mod statement;
pub mod transaction;

pub use account::Account;
pub use denomination::{Breakdown, DenominationSelection, DENOMINATIONS};
pub use engine::AtmEngine;
pub use error::{AtmError, Result, WithdrawalRejection};
pub use ledger::AccountLedger;
pub use money::Money;
pub use operation::{OpKind, OperationRecord, ParsedOperation};
pub use repository::{AccountRepository, InMemoryAccountRepository};
pub use statement::MiniStatement;
pub use transaction::{EntryKind, TransactionRecord};
