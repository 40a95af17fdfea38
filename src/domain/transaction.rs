use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Cents, MAX_AMOUNT_CENTS, ParseCentsError};

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in (salary, freelance work, gifts)
    Income,
    /// Money going out (groceries, rent, bills)
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(ValidationError::InvalidType(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which transactions a list query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TransactionFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionFilter::All => "all",
            TransactionFilter::Income => "income",
            TransactionFilter::Expense => "expense",
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Income => transaction.kind == TransactionType::Income,
            TransactionFilter::Expense => transaction.kind == TransactionType::Expense,
        }
    }
}

impl FromStr for TransactionFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TransactionFilter::All),
            "income" => Ok(TransactionFilter::Income),
            "expense" => Ok(TransactionFilter::Expense),
            _ => Err(ValidationError::InvalidFilter(s.to_string())),
        }
    }
}

impl From<TransactionType> for TransactionFilter {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Income => TransactionFilter::Income,
            TransactionType::Expense => TransactionFilter::Expense,
        }
    }
}

impl std::fmt::Display for TransactionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Reasons a transaction is refused before it reaches the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Amount must be positive, got {0} cents")]
    NonPositiveAmount(Cents),

    #[error("Amount exceeds the maximum of {max} cents, got {0} cents", max = MAX_AMOUNT_CENTS)]
    AmountTooLarge(Cents),

    #[error("Recording {0} cents would overflow the ledger's running total")]
    TotalOverflow(Cents),

    #[error("Invalid amount '{input}': {source}")]
    InvalidAmount {
        input: String,
        #[source]
        source: ParseCentsError,
    },

    #[error("Invalid transaction type '{0}', expected 'income' or 'expense'")]
    InvalidType(String),

    #[error("Invalid filter '{0}', expected 'all', 'income' or 'expense'")]
    InvalidFilter(String),
}

/// A single recorded income or expense entry.
/// Transactions are immutable - the only change a ledger makes is removing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    /// Human-readable description, never empty
    pub description: String,
    /// Amount in cents (always positive)
    #[serde(rename = "amount")]
    pub amount_cents: Cents,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// When the transaction was recorded
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction with a fresh time-ordered id, stamped now.
    /// The description is stored trimmed.
    pub fn new(
        description: &str,
        amount_cents: Cents,
        kind: TransactionType,
    ) -> Result<Self, ValidationError> {
        let description = validate_description(description)?;
        validate_amount(amount_cents)?;

        Ok(Self {
            id: Uuid::now_v7(),
            description: description.to_string(),
            amount_cents,
            kind,
            created_at: Utc::now(),
        })
    }

    /// Check the invariants every stored transaction must satisfy.
    /// Used on records that did not come through [`Transaction::new`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_description(&self.description)?;
        validate_amount(self.amount_cents)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

fn validate_description(description: &str) -> Result<&str, ValidationError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(trimmed)
}

fn validate_amount(amount_cents: Cents) -> Result<(), ValidationError> {
    if amount_cents <= 0 {
        return Err(ValidationError::NonPositiveAmount(amount_cents));
    }
    if amount_cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::AmountTooLarge(amount_cents));
    }
    Ok(())
}
