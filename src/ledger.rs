//! Account ledger operations.
//!
//! [`AccountLedger`] is what the outside world (CLI, batch engine, or any
//! front end) calls into. Each operation is a single read-modify-write of one
//! account: the caller resolves the account with [`AccountLedger::login`],
//! the ledger applies the transition and writes the whole account back.
//! Nothing is locked; two interleaved writers on the same account resolve as
//! last-write-wins in the repository.

use crate::account::Account;
use crate::denomination::DenominationSelection;
use crate::error::{AtmError, Result, WithdrawalRejection};
use crate::money::Money;
use crate::repository::AccountRepository;
use crate::statement::MiniStatement;
use chrono::{Local, NaiveDateTime};
use log::{debug, warn};

/// Source of entry timestamps.
pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct AccountLedger<R: AccountRepository> {
    repo: R,
    clock: Clock,
}

impl<R: AccountRepository> AccountLedger<R> {
    /// Creates a ledger stamping entries with local wall-clock time.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, local_now)
    }

    pub fn with_clock(repo: R, clock: Clock) -> Self {
        AccountLedger { repo, clock }
    }

    /// Resolves the account registered under `pin`.
    pub fn login(&self, pin: &str) -> Result<Account> {
        self.repo.find_by_pin(pin).ok_or(AtmError::AccountNotFound)
    }

    pub fn balance(&self, pin: &str) -> Result<Money> {
        Ok(self.login(pin)?.balance)
    }

    /// Credits `amount` and persists the account.
    ///
    /// Amounts are not validated; zero and negative deposits are applied
    /// (and logged at warn level). A deposit that would take the balance out
    /// of range fails with [`AtmError::AmountOverflow`] and saves nothing.
    pub fn deposit(&mut self, account: &mut Account, amount: Money) -> Result<Account> {
        if !amount.is_positive() {
            warn!(
                "Applying non-positive deposit of {} to account {}",
                amount, account.id
            );
        }

        account.deposit(amount, (self.clock)())?;
        debug!(
            "Deposited {} to account {}, balance {}",
            amount, account.id, account.balance
        );
        self.repo.save(account.clone())
    }

    /// Withdraws `amount`, letting the dispenser pick notes largest first.
    ///
    /// On failure the account is left untouched and nothing is saved.
    pub fn withdraw(&mut self, account: &mut Account, amount: Money) -> Result<Account> {
        let outcome = account
            .withdraw_auto(amount, (self.clock)())
            .map(|record| record.to_string());
        self.finish_withdrawal(account, amount, outcome)
    }

    /// Withdraws `amount` paid out exactly as `selection` describes.
    ///
    /// On failure the account is left untouched and nothing is saved.
    pub fn withdraw_with(
        &mut self,
        account: &mut Account,
        amount: Money,
        selection: &DenominationSelection,
    ) -> Result<Account> {
        let outcome = account
            .withdraw_selected(amount, selection, (self.clock)())
            .map(|record| record.to_string());
        self.finish_withdrawal(account, amount, outcome)
    }

    fn finish_withdrawal(
        &mut self,
        account: &Account,
        amount: Money,
        outcome: std::result::Result<String, WithdrawalRejection>,
    ) -> Result<Account> {
        match outcome {
            Ok(entry) => {
                debug!("Account {}: {}", account.id, entry);
                self.repo.save(account.clone())
            }
            Err(reason) => {
                debug!(
                    "Rejected withdrawal of {} from account {}: {}",
                    amount, account.id, reason
                );
                Err(AtmError::InvalidWithdrawal(reason))
            }
        }
    }

    /// Full rendered ledger of the account, oldest first.
    pub fn statement(&self, pin: &str) -> Result<Vec<String>> {
        Ok(self.login(pin)?.transaction_log())
    }

    pub fn mini_statement(&self, pin: &str) -> Result<MiniStatement> {
        Ok(MiniStatement::for_account(&self.login(pin)?))
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryAccountRepository;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap()
    }

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn ledger_with(balance: &str) -> AccountLedger<InMemoryAccountRepository> {
        let mut repo = InMemoryAccountRepository::new();
        repo.save(Account::new("1", "asha", "1234", money(balance)))
            .unwrap();
        AccountLedger::with_clock(repo, fixed_clock)
    }

    #[test]
    fn test_login() {
        let ledger = ledger_with("1000");
        assert_eq!(ledger.login("1234").unwrap().username, "asha");
        assert!(matches!(
            ledger.login("9999"),
            Err(AtmError::AccountNotFound)
        ));
        assert!(matches!(
            ledger.balance("9999"),
            Err(AtmError::AccountNotFound)
        ));
    }

    #[test]
    fn test_deposit_is_persisted() {
        let mut ledger = ledger_with("1000");
        let mut account = ledger.login("1234").unwrap();

        let saved = ledger.deposit(&mut account, money("250")).unwrap();
        assert_eq!(saved.balance.to_string(), "1250");
        assert_eq!(ledger.balance("1234").unwrap().to_string(), "1250");
        assert_eq!(
            ledger.statement("1234").unwrap(),
            vec!["2024-03-01T10:15:00 | Deposit ₹250 | Balance ₹1250"]
        );
    }

    #[test]
    fn test_withdraw_630() {
        let mut ledger = ledger_with("1000");
        let mut account = ledger.login("1234").unwrap();

        let saved = ledger.withdraw(&mut account, money("630")).unwrap();
        assert_eq!(saved.balance.to_string(), "370");
        assert_eq!(ledger.balance("1234").unwrap().to_string(), "370");
        assert_eq!(
            ledger.statement("1234").unwrap(),
            vec!["2024-03-01T10:15:00 | Withdraw ₹630 [1x500, 1x100, 1x20, 1x10] | Balance ₹370"]
        );
    }

    #[test]
    fn test_withdraw_635_rejected() {
        let mut ledger = ledger_with("1000");
        let mut account = ledger.login("1234").unwrap();

        let err = ledger.withdraw(&mut account, money("635")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid denomination or insufficient balance");
        assert_eq!(err.rejection(), Some(WithdrawalRejection::NotDispensable));
        assert_eq!(account.balance.to_string(), "1000");
        assert_eq!(ledger.balance("1234").unwrap().to_string(), "1000");
        assert!(ledger.statement("1234").unwrap().is_empty());
    }

    #[test]
    fn test_explicit_withdraw_insufficient_funds() {
        let mut ledger = ledger_with("50");
        let mut account = ledger.login("1234").unwrap();
        let selection = DenominationSelection::new().with(50, 1).with(10, 1);

        let err = ledger
            .withdraw_with(&mut account, money("60"), &selection)
            .unwrap_err();
        assert_eq!(err.rejection(), Some(WithdrawalRejection::InsufficientFunds));
        assert_eq!(ledger.balance("1234").unwrap().to_string(), "50");
    }

    #[test]
    fn test_explicit_withdraw_sum_mismatch_with_enough_balance() {
        let mut ledger = ledger_with("1000");
        let mut account = ledger.login("1234").unwrap();
        let selection = DenominationSelection::new().with(100, 2);

        let err = ledger
            .withdraw_with(&mut account, money("300"), &selection)
            .unwrap_err();
        assert_eq!(err.rejection(), Some(WithdrawalRejection::SumMismatch));
        assert!(account.transactions.is_empty());
    }

    #[test]
    fn test_explicit_withdraw_unknown_denomination() {
        let mut ledger = ledger_with("1000");
        let mut account = ledger.login("1234").unwrap();
        let selection = DenominationSelection::new().with(1000, 1);

        let err = ledger
            .withdraw_with(&mut account, money("1000"), &selection)
            .unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(WithdrawalRejection::UnknownDenomination(1000))
        );
    }

    #[test]
    fn test_mini_statement() {
        let mut ledger = ledger_with("1000");
        let mut account = ledger.login("1234").unwrap();
        ledger.deposit(&mut account, money("10")).unwrap();
        ledger.withdraw(&mut account, money("500")).unwrap();

        let statement = ledger.mini_statement("1234").unwrap();
        assert_eq!(statement.username, "asha");
        assert_eq!(statement.lines.len(), 5);
        assert!(statement.lines[0].contains("Deposit ₹10 "));
        assert!(statement.lines[1].contains("Withdraw ₹500 [1x500]"));
        assert!(statement.lines[2].is_empty());
    }

    proptest! {
        #[test]
        fn failed_withdrawal_changes_nothing(
            balance in 0u64..100_000u64,
            amount in 1u64..200_000u64,
        ) {
            let mut ledger = ledger_with(&balance.to_string());
            let mut account = ledger.login("1234").unwrap();
            let before = account.clone();

            if ledger.withdraw(&mut account, Money::from(amount)).is_err() {
                prop_assert_eq!(&account, &before);
                prop_assert_eq!(ledger.login("1234").unwrap(), before);
            } else {
                prop_assert!(amount % 10 == 0 && amount <= balance);
            }
        }

        #[test]
        fn deposit_then_withdraw_restores_balance(
            balance in 0u64..100_000u64,
            units in 1u64..10_000u64,
        ) {
            let amount = Money::from(units * 10);
            let mut ledger = ledger_with(&balance.to_string());
            let mut account = ledger.login("1234").unwrap();

            ledger.deposit(&mut account, amount).unwrap();
            let saved = ledger.withdraw(&mut account, amount).unwrap();

            prop_assert_eq!(saved.balance, Money::from(balance));
            prop_assert_eq!(saved.transactions.len(), 2);
            prop_assert!(saved.check_invariant());
        }
    }
}
