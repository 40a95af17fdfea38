use std::collections::HashSet;

use anyhow::{Context, Result, bail};

use crate::domain::{Transaction, checked_totals};

use super::{DEFAULT_KEY, KeyValueStore, Storage};

/// [`Storage`] that keeps the full transaction list as one JSON array under
/// a single key.
pub struct TransactionStore<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> TransactionStore<K> {
    /// Store transactions under [`DEFAULT_KEY`].
    pub fn new(store: K) -> Self {
        Self::with_key(store, DEFAULT_KEY)
    }

    pub fn with_key(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn inner(&self) -> &K {
        &self.store
    }

    /// Load the persisted list, reporting why it could not be used.
    /// [`Storage::load`] is the lenient variant the ledger relies on.
    pub fn try_load(&self) -> Result<Vec<Transaction>> {
        match self.store.get(&self.key)? {
            Some(raw) => decode(&raw),
            None => Ok(Vec::new()),
        }
    }
}

impl<K: KeyValueStore> Storage for TransactionStore<K> {
    fn load(&self) -> Vec<Transaction> {
        match self.try_load() {
            Ok(transactions) => {
                tracing::debug!(key = %self.key, count = transactions.len(), "loaded transactions");
                transactions
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = ?e, "discarding unusable stored transactions");
                Vec::new()
            }
        }
    }

    fn save(&mut self, transactions: &[Transaction]) -> Result<()> {
        let json = serde_json::to_string(transactions).context("Failed to encode transactions")?;
        self.store.set(&self.key, &json)
    }
}

/// Decode a persisted list and check it still satisfies the ledger invariants.
fn decode(raw: &str) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> =
        serde_json::from_str(raw).context("Stored transactions are not valid JSON records")?;

    let mut seen = HashSet::with_capacity(transactions.len());
    for transaction in &transactions {
        transaction
            .validate()
            .with_context(|| format!("Stored transaction {} is invalid", transaction.id))?;
        if !seen.insert(transaction.id) {
            bail!("Stored transaction id {} appears more than once", transaction.id);
        }
    }

    if checked_totals(&transactions).is_none() {
        bail!("Stored transactions sum past the largest representable total");
    }

    Ok(transactions)
}
