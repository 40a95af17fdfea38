use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::Ledger;
use crate::domain::{Totals, Transaction, TransactionFilter, compute_totals};
use crate::storage::Storage;

/// Point-in-time JSON export of a (possibly filtered) ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub filter: String,
    /// Totals over the exported transactions only
    pub totals: Totals,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting ledger data to CSV or JSON
pub struct Exporter<'a, S> {
    ledger: &'a Ledger<S>,
    filter: TransactionFilter,
}

impl<'a, S: Storage> Exporter<'a, S> {
    pub fn new(ledger: &'a Ledger<S>) -> Self {
        Self {
            ledger,
            filter: TransactionFilter::All,
        }
    }

    pub fn with_filter(mut self, filter: TransactionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Export transactions to CSV, newest first. Returns the row count.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let transactions = self.ledger.list(self.filter);
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "created_at", "type", "description", "amount_cents"])?;

        for transaction in &transactions {
            csv_writer.write_record([
                transaction.id.to_string().as_str(),
                transaction.created_at.to_rfc3339().as_str(),
                transaction.kind.as_str(),
                transaction.description.as_str(),
                transaction.amount_cents.to_string().as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export a JSON snapshot of the selected transactions.
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let transactions: Vec<Transaction> =
            self.ledger.list(self.filter).into_iter().cloned().collect();

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            filter: self.filter.to_string(),
            totals: compute_totals(&transactions),
            transactions,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
