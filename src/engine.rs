//! Batch processing engine.
//!
//! Streams a CSV of operations through an [`AccountLedger`] the way a front
//! end would issue requests one by one: each row resolves the account by PIN
//! and applies a single operation. Rows that fail are logged and skipped.

use crate::error::{AtmError, Result};
use crate::ledger::{AccountLedger, Clock};
use crate::operation::{OpKind, OperationRecord, ParsedOperation};
use crate::repository::{AccountRepository, InMemoryAccountRepository};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::{Read, Write};

/// Drives ledger operations from CSV input.
///
/// # Output Ordering
///
/// Final account states are written sorted by account id so that output
/// is reproducible.
pub struct AtmEngine<R: AccountRepository = InMemoryAccountRepository> {
    ledger: AccountLedger<R>,
}

impl<R: AccountRepository> AtmEngine<R> {
    pub fn new(repo: R) -> Self {
        AtmEngine {
            ledger: AccountLedger::new(repo),
        }
    }

    pub fn with_clock(repo: R, clock: Clock) -> Self {
        AtmEngine {
            ledger: AccountLedger::with_clock(repo, clock),
        }
    }

    pub fn ledger(&self) -> &AccountLedger<R> {
        &self.ledger
    }

    /// Processes operations from a CSV reader in streaming fashion.
    ///
    /// Invalid rows, unknown PINs and rejected withdrawals are logged at warn
    /// level and skipped.
    pub fn process_csv<Rd: Read>(&mut self, reader: Rd) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<OperationRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => match record.parse() {
                    Ok(op) => {
                        if let Err(e) = self.process_operation(op, row_num) {
                            warn!("Row {}: {}", row_num, e);
                        }
                    }
                    Err(message) => {
                        warn!(
                            "Row {}: {}",
                            row_num,
                            AtmError::InvalidRecord {
                                row: row_num,
                                message
                            }
                        );
                    }
                },
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                }
            }
        }

        Ok(())
    }

    /// Applies a single parsed operation.
    pub fn process_operation(&mut self, op: ParsedOperation, row: usize) -> Result<()> {
        let mut account = self.ledger.login(&op.pin)?;

        match op.kind {
            OpKind::Login => {
                debug!("Row {}: Login for {}", row, account.username);
            }
            OpKind::Balance => {
                debug!(
                    "Row {}: Balance of account {} is {}",
                    row, account.id, account.balance
                );
            }
            OpKind::Deposit(amount) => {
                self.ledger.deposit(&mut account, amount)?;
            }
            OpKind::Withdraw(amount) => {
                self.ledger.withdraw(&mut account, amount)?;
            }
            OpKind::WithdrawWith(amount, selection) => {
                self.ledger.withdraw_with(&mut account, amount, &selection)?;
            }
            OpKind::Statement => {
                for line in account.transaction_log() {
                    debug!("Row {}: {}", row, line);
                }
            }
        }

        Ok(())
    }

    /// Writes final account states to CSV: `id,username,balance,transactions`.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "username", "balance", "transactions"])?;

        let mut accounts = self.ledger.repository().accounts();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));

        for account in accounts {
            csv_writer.write_record([
                account.id.clone(),
                account.username.clone(),
                account.balance.to_string(),
                account.transactions.len().to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io::Cursor;

    const ACCOUNTS: &str = r#"id,username,pin,balance
1,asha,1234,1000
2,ravi,4321,50"#;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn process_csv_str(ops: &str) -> AtmEngine {
        let repo = InMemoryAccountRepository::from_csv(Cursor::new(ACCOUNTS)).unwrap();
        let mut engine = AtmEngine::with_clock(repo, fixed_clock);
        engine.process_csv(Cursor::new(ops)).unwrap();
        engine
    }

    #[test]
    fn test_deposit_and_auto_withdrawal() {
        let ops = r#"pin,op,amount,denominations
1234,deposit,200,
1234,withdraw,630,"#;

        let engine = process_csv_str(ops);
        let statement = engine.ledger().statement("1234").unwrap();
        assert_eq!(
            statement,
            vec![
                "2024-03-01T09:00:00 | Deposit ₹200 | Balance ₹1200",
                "2024-03-01T09:00:00 | Withdraw ₹630 [1x500, 1x100, 1x20, 1x10] | Balance ₹570",
            ]
        );
    }

    #[test]
    fn test_explicit_withdrawal() {
        let ops = r#"pin,op,amount,denominations
1234,withdraw,400,200:1;100:1;50:4"#;

        let engine = process_csv_str(ops);
        assert_eq!(engine.ledger().balance("1234").unwrap().to_string(), "600");
        assert!(engine.ledger().statement("1234").unwrap()[0]
            .contains("Withdraw ₹400 [1x200, 1x100, 4x50]"));
    }

    #[test]
    fn test_rejected_rows_are_skipped() {
        let ops = r#"pin,op,amount,denominations
4321,withdraw,60,50:1;10:1
9999,deposit,100,
1234,withdraw,635,
1234,transfer,10,
1234,deposit,5,"#;

        let engine = process_csv_str(ops);
        assert_eq!(engine.ledger().balance("4321").unwrap().to_string(), "50");
        assert_eq!(engine.ledger().balance("1234").unwrap().to_string(), "1005");
        assert_eq!(engine.ledger().statement("1234").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_pin_is_an_error() {
        let repo = InMemoryAccountRepository::from_csv(Cursor::new(ACCOUNTS)).unwrap();
        let mut engine = AtmEngine::with_clock(repo, fixed_clock);
        let op = OperationRecord {
            pin: "0000".to_string(),
            op: "balance".to_string(),
            amount: None,
            denominations: None,
        }
        .parse()
        .unwrap();

        assert!(matches!(
            engine.process_operation(op, 2),
            Err(AtmError::AccountNotFound)
        ));
    }

    #[test]
    fn test_output_format() {
        let ops = r#"pin,op,amount,denominations
4321,deposit,10.5,
1234,withdraw,100,"#;

        let engine = process_csv_str(ops);
        let mut output = Vec::new();
        engine.write_output(&mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "id,username,balance,transactions\n1,asha,900,1\n2,ravi,60.5,1\n"
        );
    }
}
