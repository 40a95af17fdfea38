use crate::domain::{
    Cents, Totals, Transaction, TransactionFilter, TransactionId, TransactionType,
    ValidationError, compute_totals, filter_transactions, parse_cents,
};
use crate::storage::Storage;

use super::LedgerError;

/// The ordered collection of transactions, newest first.
///
/// Every successful mutation is written through to the storage before the
/// call returns. If that write fails the mutation is undone, so memory and
/// storage never disagree.
pub struct Ledger<S> {
    transactions: Vec<Transaction>,
    storage: S,
}

impl<S: Storage> Ledger<S> {
    /// Create a ledger seeded with whatever the storage has persisted.
    pub fn open(storage: S) -> Self {
        let transactions = storage.load();
        tracing::debug!(count = transactions.len(), "opened ledger");
        Self {
            transactions,
            storage,
        }
    }

    /// Record a new transaction at the front of the ledger.
    pub fn add(
        &mut self,
        description: &str,
        amount_cents: Cents,
        kind: TransactionType,
    ) -> Result<Transaction, LedgerError> {
        let transaction = Transaction::new(description, amount_cents, kind)?;
        self.check_total_headroom(&transaction)?;

        self.transactions.insert(0, transaction.clone());
        if let Err(e) = self.persist() {
            self.transactions.remove(0);
            return Err(e);
        }

        tracing::info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount_cents = transaction.amount_cents,
            "added transaction"
        );
        Ok(transaction)
    }

    /// Record a transaction from raw user input.
    /// `amount` is a decimal string ("150.00") and `kind` is "income" or
    /// "expense" in any case.
    pub fn add_from_input(
        &mut self,
        description: &str,
        amount: &str,
        kind: &str,
    ) -> Result<Transaction, LedgerError> {
        let amount_cents = parse_cents(amount).map_err(|source| ValidationError::InvalidAmount {
            input: amount.trim().to_string(),
            source,
        })?;
        let kind: TransactionType = kind.parse()?;
        self.add(description, amount_cents, kind)
    }

    /// Remove the transaction with `id` and return it.
    pub fn delete(&mut self, id: TransactionId) -> Result<Transaction, LedgerError> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        let removed = self.transactions.remove(index);
        if let Err(e) = self.persist() {
            self.transactions.insert(index, removed);
            return Err(e);
        }

        tracing::info!(id = %removed.id, "deleted transaction");
        Ok(removed)
    }

    pub fn totals(&self) -> Totals {
        compute_totals(&self.transactions)
    }

    /// Transactions matching `filter`, newest first.
    pub fn list(&self, filter: TransactionFilter) -> Vec<&Transaction> {
        filter_transactions(&self.transactions, filter)
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Refuse a transaction whose amount would push its side of the totals
    /// past `i64`, so [`Ledger::totals`] stays exact.
    fn check_total_headroom(&self, transaction: &Transaction) -> Result<(), ValidationError> {
        let totals = self.totals();
        let running = match transaction.kind {
            TransactionType::Income => totals.income,
            TransactionType::Expense => totals.expenses,
        };
        running
            .checked_add(transaction.amount_cents)
            .map(|_| ())
            .ok_or(ValidationError::TotalOverflow(transaction.amount_cents))
    }

    fn persist(&mut self) -> Result<(), LedgerError> {
        self.storage.save(&self.transactions)?;
        tracing::debug!(count = self.transactions.len(), "persisted ledger");
        Ok(())
    }
}
