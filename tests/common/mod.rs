// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use budgetbook::application::Ledger;
use budgetbook::domain::{Transaction, TransactionType};
use budgetbook::storage::{FileStore, MemoryStore, SqliteStore, TransactionStore};
use tempfile::TempDir;

pub type MemoryLedger = Ledger<TransactionStore<MemoryStore>>;

/// Helper to create an empty ledger that persists nowhere
pub fn memory_ledger() -> MemoryLedger {
    Ledger::open(TransactionStore::new(MemoryStore::new()))
}

/// Helper to create a file-backed ledger in a temporary directory
pub fn file_ledger() -> Result<(Ledger<TransactionStore<FileStore>>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let ledger = Ledger::open(TransactionStore::new(FileStore::new(temp_dir.path())));
    Ok((ledger, temp_dir))
}

/// Helper to create a SQLite-backed ledger in a temporary directory
pub fn sqlite_ledger() -> Result<(Ledger<TransactionStore<SqliteStore>>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store = SqliteStore::open(temp_dir.path().join("budget.db"))?;
    Ok((Ledger::open(TransactionStore::new(store)), temp_dir))
}

/// Test fixture: one salary and one grocery run
pub struct Household {
    pub salary: Transaction,
    pub groceries: Transaction,
}

impl Household {
    pub fn record(ledger: &mut MemoryLedger) -> Result<Self> {
        let salary = ledger.add("Salary", 150000, TransactionType::Income)?;
        let groceries = ledger.add("Groceries", 15000, TransactionType::Expense)?;
        Ok(Self { salary, groceries })
    }
}
