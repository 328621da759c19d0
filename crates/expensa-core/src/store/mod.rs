//! Expense store and category table interfaces.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::categorize::CategoryRule;
use crate::error::StoreError;
use crate::models::expense::{ExpenseId, NewExpense, StoredExpense, UserId};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistent expense storage, scoped per user.
pub trait ExpenseStore {
    /// Expenses of `user` on `date` with exactly `amount`.
    fn query(&self, user: &UserId, date: NaiveDate, amount: Decimal) -> Result<Vec<StoredExpense>>;

    /// Persist one expense for `user`.
    fn create(&self, user: &UserId, expense: &NewExpense) -> Result<ExpenseId>;
}

/// Source of category rules, read once per ingestion run.
pub trait CategoryTable {
    /// Rules in precedence order.
    fn list(&self) -> Result<Vec<CategoryRule>>;
}
