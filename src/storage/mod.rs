//! Persistence for the ledger.
//!
//! The ledger only sees [`Storage`]: load everything, save everything.
//! Underneath, [`TransactionStore`] encodes the whole sequence as a single
//! JSON value kept under one key of a [`KeyValueStore`], so any backend that
//! can hold a string per key can persist a ledger.

mod file;
mod memory;
mod sqlite;
mod transaction_store;

pub use file::*;
pub use memory::*;
pub use sqlite::*;
pub use transaction_store::*;

use anyhow::Result;

use crate::domain::Transaction;

/// Key the transaction list is stored under unless configured otherwise.
pub const DEFAULT_KEY: &str = "budget-transactions";

/// Whole-sequence persistence consumed by the ledger.
pub trait Storage {
    /// Return the last persisted sequence, or an empty one when nothing
    /// usable has been persisted. Never fails.
    fn load(&self) -> Vec<Transaction>;

    /// Overwrite the persisted sequence with `transactions`.
    fn save(&mut self, transactions: &[Transaction]) -> Result<()>;
}

/// Opaque string storage addressed by key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
