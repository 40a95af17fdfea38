use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::application::{Ledger, LedgerError};
use crate::domain::{Cents, Transaction, TransactionFilter, ValidationError, format_cents};
use crate::io::Exporter;
use crate::storage::{
    DEFAULT_KEY, FileStore, KeyValueStore, SqliteStore, TransactionStore,
};

/// Ledger as opened by the command line, whatever the backend.
pub type CliLedger = Ledger<TransactionStore<Box<dyn KeyValueStore>>>;

/// Budgetbook - Personal Budget Tracker
#[derive(Parser, Debug)]
#[command(name = "budgetbook")]
#[command(about = "Track income and expenses and see where your balance stands")]
#[command(version)]
pub struct Cli {
    /// Data location. For the file backend the file stem is the storage key
    /// and the data lives in `<stem>.json`; for sqlite it is the database file.
    #[arg(short, long, env = "BUDGETBOOK_DATA", default_value = "budgetbook.json")]
    pub data: PathBuf,

    /// Storage backend
    #[arg(short, long, env = "BUDGETBOOK_BACKEND", value_enum, default_value_t = Backend::File)]
    pub backend: Backend,

    /// Currency symbol shown in front of amounts (e.g. "₦", "€")
    #[arg(long, env = "BUDGETBOOK_CURRENCY", default_value = "")]
    pub currency: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// One JSON file per ledger
    File,
    /// A SQLite database
    Sqlite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record an income or expense
    Add {
        /// What the money was for
        description: String,

        /// Amount (e.g., "1500.00" or "1500")
        #[arg(allow_negative_numbers = true)]
        amount: String,

        /// Transaction type: income, expense
        #[arg(short = 't', long = "type")]
        kind: String,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },

    /// List transactions, newest first
    List {
        /// Which transactions to show: all, income, expense
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Show total income, total expenses and balance
    Totals,

    /// Export transactions to CSV or JSON
    Export {
        /// Which transactions to export: all, income, expense
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Open the ledger described by the data and backend options.
    pub fn open_ledger(&self) -> Result<CliLedger> {
        let storage = match self.backend {
            Backend::File => {
                let key = self
                    .data
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .filter(|s| !s.is_empty())
                    .with_context(|| {
                        format!("Invalid data file name: {}", self.data.display())
                    })?
                    .to_string();
                let dir = match self.data.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                };
                let store: Box<dyn KeyValueStore> = Box::new(FileStore::new(dir));
                TransactionStore::with_key(store, key)
            }
            Backend::Sqlite => {
                let store: Box<dyn KeyValueStore> = Box::new(SqliteStore::open(&self.data)?);
                TransactionStore::with_key(store, DEFAULT_KEY)
            }
        };

        tracing::debug!(data = %self.data.display(), backend = ?self.backend, "opening ledger");
        Ok(Ledger::open(storage))
    }

    pub fn run(self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out)
    }

    /// Run the command, writing user-facing output to `out`.
    pub fn run_with_output<W: Write>(self, out: &mut W) -> Result<()> {
        let mut ledger = self.open_ledger()?;
        let presenter = Presenter {
            currency: &self.currency,
        };

        match self.command {
            Commands::Add {
                description,
                amount,
                kind,
            } => {
                let transaction = ledger.add_from_input(&description, &amount, &kind)?;
                writeln!(
                    out,
                    "Added {}: {} {} ({})",
                    transaction.kind,
                    transaction.description,
                    presenter.money(transaction.amount_cents),
                    transaction.id
                )?;
            }

            Commands::Delete { id } => {
                let id = Uuid::parse_str(id.trim())
                    .with_context(|| format!("Invalid transaction ID '{}'", id))?;
                let removed = ledger.delete(id)?;
                writeln!(
                    out,
                    "Deleted {}: {} {}",
                    removed.kind,
                    removed.description,
                    presenter.money(removed.amount_cents)
                )?;
            }

            Commands::List { filter } => {
                let filter: TransactionFilter = filter.parse()?;
                run_list_command(&ledger, filter, &presenter, out)?;
            }

            Commands::Totals => {
                let totals = ledger.totals();
                writeln!(out, "{:<10} {:>16}", "Income:", presenter.money(totals.income))?;
                writeln!(out, "{:<10} {:>16}", "Expenses:", presenter.money(totals.expenses))?;
                writeln!(out, "{}", "-".repeat(27))?;
                writeln!(out, "{:<10} {:>16}", "Balance:", presenter.money(totals.balance))?;
            }

            Commands::Export {
                filter,
                format,
                output,
            } => {
                let filter: TransactionFilter = filter.parse()?;
                run_export_command(&ledger, filter, format, output.as_deref(), out)?;
            }
        }

        Ok(())
    }
}

/// Process exit status for a failed command: 2 when the input was at fault
/// (bad amount, unknown id, ...), 1 for storage and I/O failures.
pub fn exit_status(error: &anyhow::Error) -> u8 {
    let user_error = match error.downcast_ref::<LedgerError>() {
        Some(e) => e.is_user_error(),
        None => {
            error.downcast_ref::<ValidationError>().is_some()
                || error.downcast_ref::<uuid::Error>().is_some()
        }
    };

    if user_error {
        2
    } else {
        tracing::error!(error = ?error, "command failed");
        1
    }
}

/// Presentation formatting. The ledger only deals in cents.
struct Presenter<'a> {
    currency: &'a str,
}

impl Presenter<'_> {
    fn money(&self, cents: Cents) -> String {
        let amount = format_cents(cents);
        match amount.strip_prefix('-') {
            Some(abs) => format!("-{}{}", self.currency, abs),
            None => format!("{}{}", self.currency, amount),
        }
    }

    fn signed(&self, transaction: &Transaction) -> String {
        let sign = if transaction.is_income() { '+' } else { '-' };
        format!("{}{}", sign, self.money(transaction.amount_cents))
    }
}

fn run_list_command<W: Write>(
    ledger: &CliLedger,
    filter: TransactionFilter,
    presenter: &Presenter<'_>,
    out: &mut W,
) -> Result<()> {
    let transactions = ledger.list(filter);

    if transactions.is_empty() {
        if ledger.is_empty() {
            writeln!(out, "No transactions yet. Add your first transaction to get started.")?;
        } else {
            writeln!(out, "No {} transactions found.", filter)?;
        }
        return Ok(());
    }

    writeln!(
        out,
        "{:<36} {:<19} {:<8} {:>16} DESCRIPTION",
        "ID", "DATE", "TYPE", "AMOUNT"
    )?;
    writeln!(out, "{}", "-".repeat(100))?;

    for transaction in transactions {
        writeln!(
            out,
            "{:<36} {:<19} {:<8} {:>16} {}",
            transaction.id,
            transaction.created_at.format("%d %b %Y, %H:%M").to_string(),
            transaction.kind,
            presenter.signed(transaction),
            truncate(&transaction.description, 40)
        )?;
    }
    Ok(())
}

fn run_export_command<W: Write>(
    ledger: &CliLedger,
    filter: TransactionFilter,
    format: ExportFormat,
    output: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let exporter = Exporter::new(ledger).with_filter(filter);

    let writer: Box<dyn Write + '_> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(&mut *out),
    };

    let count = match format {
        ExportFormat::Csv => exporter.export_csv(writer)?,
        ExportFormat::Json => exporter.export_json(writer)?.transactions.len(),
    };

    if let Some(path) = output {
        eprintln!("Exported {} transactions to {}", count, path.display());
    }
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
