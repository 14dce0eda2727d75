//! Error types for the ATM ledger.

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, AtmError>;

/// Errors that can occur while operating on accounts.
#[derive(Error, Debug)]
pub enum AtmError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input record
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Two seeded accounts share a PIN or an id
    #[error("Duplicate account {key} at row {row}")]
    DuplicateAccount { key: String, row: usize },

    /// No account is registered under the given PIN
    #[error("User does not exist")]
    AccountNotFound,

    /// The withdrawal was rejected and the account left untouched.
    ///
    /// The message is the same for every reason; the reason itself is kept
    /// for logging and for callers that want finer diagnostics.
    #[error("Invalid denomination or insufficient balance")]
    InvalidWithdrawal(WithdrawalRejection),

    /// A balance would leave the representable range
    #[error("Amount out of range for account {0}")]
    AmountOverflow(String),

    /// Missing command line arguments
    #[error("Missing input file argument. Usage: atm-ledger <accounts.csv> <operations.csv> [--statement <pin>] [--json]")]
    MissingArgument,

    /// `--json` given without `--statement <pin>`
    #[error("--json requires --statement <pin>")]
    JsonWithoutStatement,

    /// Unrecognized command line argument
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

impl AtmError {
    /// Returns the rejection reason if this is a rejected withdrawal.
    pub fn rejection(&self) -> Option<WithdrawalRejection> {
        match self {
            AtmError::InvalidWithdrawal(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Why a withdrawal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalRejection {
    /// Amount has a fractional part or cannot be represented as whole units.
    NotWholeUnits,

    /// Amount is zero or negative.
    NonPositiveAmount,

    /// Greedy allocation left a remainder below the smallest denomination.
    NotDispensable,

    /// Selection contains a value outside the denomination set.
    UnknownDenomination(u32),

    /// Selection contains a negative count.
    NegativeCount(u32),

    /// Selection does not add up to the requested amount.
    SumMismatch,

    /// Amount exceeds the current balance.
    InsufficientFunds,
}

impl std::fmt::Display for WithdrawalRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalRejection::NotWholeUnits => write!(f, "amount is not a whole number of units"),
            WithdrawalRejection::NonPositiveAmount => write!(f, "amount must be positive"),
            WithdrawalRejection::NotDispensable => {
                write!(f, "amount cannot be dispensed with the available notes")
            }
            WithdrawalRejection::UnknownDenomination(d) => write!(f, "unknown denomination {}", d),
            WithdrawalRejection::NegativeCount(d) => write!(f, "negative count for denomination {}", d),
            WithdrawalRejection::SumMismatch => write!(f, "denominations do not add up to the amount"),
            WithdrawalRejection::InsufficientFunds => write!(f, "insufficient balance"),
        }
    }
}
