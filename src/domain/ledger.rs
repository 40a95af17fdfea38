use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, TransactionFilter, TransactionType};

/// Aggregates derived from a list of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub income: Cents,
    pub expenses: Cents,
    pub balance: Cents,
}

/// Compute totals for a list of transactions.
/// Balance = sum of income - sum of expenses
///
/// A ledger never holds a list whose sums overflow (see
/// [`checked_totals`]), so saturation only matters for raw slices.
pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let (income, expenses) =
        transactions
            .iter()
            .fold((0, 0), |(income, expenses): (Cents, Cents), transaction| {
                match transaction.kind {
                    TransactionType::Income => {
                        (income.saturating_add(transaction.amount_cents), expenses)
                    }
                    TransactionType::Expense => {
                        (income, expenses.saturating_add(transaction.amount_cents))
                    }
                }
            });

    Totals {
        income,
        expenses,
        balance: income.saturating_sub(expenses),
    }
}

/// Compute totals exactly, or `None` if either sum would overflow `i64`.
pub fn checked_totals(transactions: &[Transaction]) -> Option<Totals> {
    let mut income: Cents = 0;
    let mut expenses: Cents = 0;

    for transaction in transactions {
        match transaction.kind {
            TransactionType::Income => income = income.checked_add(transaction.amount_cents)?,
            TransactionType::Expense => {
                expenses = expenses.checked_add(transaction.amount_cents)?
            }
        }
    }

    Some(Totals {
        income,
        expenses,
        // Both sums are non-negative, so the difference always fits
        balance: income - expenses,
    })
}

/// Select the transactions matching `filter`, keeping their order.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: TransactionFilter,
) -> Vec<&Transaction> {
    transactions.iter().filter(|t| filter.matches(t)).collect()
}

#[cfg(test)]
mod tests {
    use crate::domain::MAX_AMOUNT_CENTS;
    use super::*;

    fn make_transaction(description: &str, amount: Cents, kind: TransactionType) -> Transaction {
        Transaction::new(description, amount, kind).unwrap()
    }

    #[test]
    fn test_compute_totals_empty() {
        assert_eq!(compute_totals(&[]), Totals::default());
    }

    #[test]
    fn test_compute_totals_income_only() {
        let transactions = vec![make_transaction("Salary", 150000, TransactionType::Income)];

        let totals = compute_totals(&transactions);
        assert_eq!(totals.income, 150000);
        assert_eq!(totals.expenses, 0);
        assert_eq!(totals.balance, 150000);
    }

    #[test]
    fn test_compute_totals_mixed() {
        let transactions = vec![
            make_transaction("Salary", 150000, TransactionType::Income),    // +150000
            make_transaction("Groceries", 15000, TransactionType::Expense), // -15000
            make_transaction("Freelance", 45000, TransactionType::Income),  // +45000
            make_transaction("Rent", 200000, TransactionType::Expense),     // -200000
        ];

        assert_eq!(
            compute_totals(&transactions),
            Totals {
                income: 195000,
                expenses: 215000,
                balance: -20000,
            }
        );
    }

    #[test]
    fn test_cent_amounts_do_not_drift() {
        // 0.10 + 0.20 is not 0.30 in binary floating point
        let transactions = vec![
            make_transaction("Gum", 10, TransactionType::Expense),
            make_transaction("Candy", 20, TransactionType::Expense),
        ];

        assert_eq!(compute_totals(&transactions).expenses, 30);
    }

    #[test]
    fn test_checked_totals_matches_compute_totals() {
        let transactions = vec![
            make_transaction("Salary", 150000, TransactionType::Income),
            make_transaction("Groceries", 15000, TransactionType::Expense),
        ];

        assert_eq!(
            checked_totals(&transactions),
            Some(compute_totals(&transactions))
        );
        assert_eq!(checked_totals(&[]), Some(Totals::default()));
    }

    #[test]
    fn test_totals_overflow_is_detected_not_panicking() {
        // Each amount is individually valid, but together they exceed i64
        let records_to_overflow = (Cents::MAX / MAX_AMOUNT_CENTS + 1) as usize;
        let transactions: Vec<Transaction> = (0..records_to_overflow)
            .map(|_| make_transaction("Windfall", MAX_AMOUNT_CENTS, TransactionType::Income))
            .collect();

        assert_eq!(checked_totals(&transactions), None);
        let largest_safe = checked_totals(&transactions[1..]).unwrap();
        assert_eq!(
            largest_safe.income,
            MAX_AMOUNT_CENTS * (records_to_overflow as Cents - 1)
        );

        let totals = compute_totals(&transactions);
        assert_eq!(totals.income, Cents::MAX);
        assert_eq!(totals.balance, Cents::MAX);
    }

    #[test]
    fn test_filter_preserves_order() {
        let transactions = vec![
            make_transaction("Groceries", 15000, TransactionType::Expense),
            make_transaction("Salary", 150000, TransactionType::Income),
            make_transaction("Rent", 200000, TransactionType::Expense),
        ];

        let expenses = filter_transactions(&transactions, TransactionFilter::Expense);
        let descriptions: Vec<&str> = expenses.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, ["Groceries", "Rent"]);

        let all = filter_transactions(&transactions, TransactionFilter::All);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_filter_empty_result() {
        let transactions = vec![make_transaction("Salary", 150000, TransactionType::Income)];
        assert!(filter_transactions(&transactions, TransactionFilter::Expense).is_empty());
        assert!(filter_transactions(&[], TransactionFilter::All).is_empty());
    }
}
