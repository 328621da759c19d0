//! Expense models shared by the pipeline and the expense store.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::{ParsedTransaction, PaymentMethod};

/// Identity of the authenticated user owning expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a persisted expense row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub i64);

/// A parsed, categorized transaction not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCandidate {
    /// The statement transaction this candidate was built from.
    pub transaction: ParsedTransaction,

    /// Assigned category identifier.
    pub category: String,

    /// Display title (truncated merchant name).
    pub title: String,

    /// Original merchant text.
    pub description: String,
}

impl ExpenseCandidate {
    pub fn merchant_name(&self) -> &str {
        &self.transaction.merchant_name
    }

    pub fn amount(&self) -> Decimal {
        self.transaction.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.transaction.transaction_date
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.transaction.payment_method
    }

    /// Build the row handed to the expense store.
    pub fn to_new_expense(&self) -> NewExpense {
        NewExpense {
            title: self.title.clone(),
            description: self.description.clone(),
            amount: self.amount(),
            date: self.date(),
            category: self.category.clone(),
            payment_method: self.payment_method(),
        }
    }
}

/// An expense row to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: String,
    pub payment_method: PaymentMethod,
}

/// An expense already persisted for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredExpense {
    pub id: ExpenseId,
    pub title: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: String,
    pub payment_method: PaymentMethod,
}

/// Why a parsed transaction was not saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Already present in the store.
    Duplicate,
    /// Amount rejected by the normalizer.
    InvalidAmount,
    /// Money received, not an expense.
    Credit,
    /// Statement marks the transaction as failed or pending.
    NotSettled,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Duplicate => "Duplicate transaction",
            SkipReason::InvalidAmount => "Invalid amount",
            SkipReason::Credit => "Credit transaction",
            SkipReason::NotSettled => "Transaction not settled",
        }
    }
}

/// A parsed transaction left out of the import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTransaction {
    pub transaction_date: NaiveDate,
    pub merchant_name: String,
    pub amount: Decimal,
    pub reason: SkipReason,
}

impl SkippedTransaction {
    pub fn new(transaction: &ParsedTransaction, reason: SkipReason) -> Self {
        Self {
            transaction_date: transaction.transaction_date,
            merchant_name: transaction.merchant_name.clone(),
            amount: transaction.amount,
            reason,
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionResult {
    /// Number of transactions recognized in the statement.
    pub total_extracted: usize,

    /// Number of expenses persisted.
    pub total_saved: usize,

    /// Persisted candidates, in statement order.
    pub saved: Vec<ExpenseCandidate>,

    /// Recognized transactions that were not persisted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedTransaction>,
}

impl IngestionResult {
    pub fn total_skipped(&self) -> usize {
        self.skipped.len()
    }

    pub fn duplicates(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason == SkipReason::Duplicate)
            .count()
    }
}
