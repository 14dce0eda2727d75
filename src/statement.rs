//! Mini statements.
//!
//! A mini statement always has exactly [`MINI_STATEMENT_LINES`] entry lines:
//! the most recent entries, oldest first, padded with blank lines when the
//! account has fewer.

use crate::account::Account;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Number of entry lines on a mini statement.
pub const MINI_STATEMENT_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiniStatement {
    pub username: String,

    /// Exactly [`MINI_STATEMENT_LINES`] lines; blank lines are empty strings.
    pub lines: Vec<String>,
}

impl MiniStatement {
    pub fn for_account(account: &Account) -> Self {
        let mut lines: Vec<String> = account
            .recent_transactions(MINI_STATEMENT_LINES)
            .iter()
            .map(|t| t.to_string())
            .collect();
        lines.resize(MINI_STATEMENT_LINES, String::new());

        MiniStatement {
            username: account.username.clone(),
            lines,
        }
    }
}

impl fmt::Display for MiniStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mini Statement")?;
        writeln!(f, "User: {}", self.username)?;
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Writes the full ledger of an account as a JSON array of entry strings.
pub fn write_json_statement<W: Write>(account: &Account, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &account.transaction_log())?;
    Ok(())
}
