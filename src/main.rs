//! ATM Ledger CLI
//!
//! Loads accounts from a CSV file, applies a CSV of operations to them and
//! prints either the final account summary or one account's statement.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.csv operations.csv > summary.csv
//! cargo run -- accounts.csv operations.csv --statement 1234
//! cargo run -- accounts.csv operations.csv --statement 1234 --json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use atm_ledger::statement::write_json_statement;
use atm_ledger::{AtmEngine, AtmError, InMemoryAccountRepository, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Parsed command line.
struct Args {
    accounts_path: String,
    operations_path: String,
    statement_pin: Option<String>,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let accounts_path = args.next().ok_or(AtmError::MissingArgument)?;
    let operations_path = args.next().ok_or(AtmError::MissingArgument)?;
    let mut statement_pin = None;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--statement" => {
                statement_pin = Some(args.next().ok_or(AtmError::MissingArgument)?);
            }
            "--json" => json = true,
            _ => return Err(AtmError::UnknownArgument(arg)),
        }
    }

    if json && statement_pin.is_none() {
        return Err(AtmError::JsonWithoutStatement);
    }

    Ok(Args {
        accounts_path,
        operations_path,
        statement_pin,
        json,
    })
}

fn run() -> Result<()> {
    let args = parse_args(env::args().skip(1))?;

    let accounts = BufReader::new(File::open(&args.accounts_path)?);
    let repo = InMemoryAccountRepository::from_csv(accounts)?;

    let operations = BufReader::new(File::open(&args.operations_path)?);
    let mut engine = AtmEngine::new(repo);
    engine.process_csv(operations)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match args.statement_pin {
        Some(pin) if args.json => {
            let account = engine.ledger().login(&pin)?;
            write_json_statement(&account, &mut handle)?;
            writeln!(handle)?;
        }
        Some(pin) => {
            let statement = engine.ledger().mini_statement(&pin)?;
            write!(handle, "{}", statement)?;
        }
        None => engine.write_output(handle)?,
    }

    Ok(())
}
