//! In-memory expense store.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use super::{CategoryTable, ExpenseStore, Result};
use crate::categorize::{CategoryRule, default_rules};
use crate::models::expense::{ExpenseId, NewExpense, StoredExpense, UserId};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: Vec<(UserId, StoredExpense)>,
    rules: Option<Vec<CategoryRule>>,
}

/// Shared in-memory store. Clones see the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `rules` instead of the built-in category table.
    pub fn with_rules(self, rules: Vec<CategoryRule>) -> Self {
        self.inner.write().rules = Some(rules);
        self
    }

    /// All expenses of `user` in insertion order.
    pub fn expenses(&self, user: &UserId) -> Vec<StoredExpense> {
        self.inner
            .read()
            .rows
            .iter()
            .filter(|(owner, _)| owner == user)
            .map(|(_, expense)| expense.clone())
            .collect()
    }

    /// Total rows across all users.
    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExpenseStore for MemoryStore {
    fn query(&self, user: &UserId, date: NaiveDate, amount: Decimal) -> Result<Vec<StoredExpense>> {
        Ok(self
            .inner
            .read()
            .rows
            .iter()
            .filter(|(owner, e)| owner == user && e.date == date && e.amount == amount)
            .map(|(_, e)| e.clone())
            .collect())
    }

    fn create(&self, user: &UserId, expense: &NewExpense) -> Result<ExpenseId> {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = ExpenseId(inner.next_id);
        inner.rows.push((
            *user,
            StoredExpense {
                id,
                title: expense.title.clone(),
                description: expense.description.clone(),
                amount: expense.amount,
                date: expense.date,
                category: expense.category.clone(),
                payment_method: expense.payment_method,
            },
        ));
        Ok(id)
    }
}

impl CategoryTable for MemoryStore {
    fn list(&self) -> Result<Vec<CategoryRule>> {
        Ok(self.inner.read().rules.clone().unwrap_or_else(default_rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::PaymentMethod;
    use std::str::FromStr;

    fn expense(title: &str, amount: &str) -> NewExpense {
        NewExpense {
            title: title.to_string(),
            description: title.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            category: "Other".to_string(),
            payment_method: PaymentMethod::DigitalWallet,
        }
    }

    #[test]
    fn test_query_is_scoped_by_user_date_and_amount() {
        let store = MemoryStore::new();
        let alice = UserId(1);
        let bob = UserId(2);
        let date = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();

        store.create(&alice, &expense("Swiggy", "450.00")).unwrap();
        store.create(&bob, &expense("Swiggy", "450.00")).unwrap();
        store.create(&alice, &expense("Zomato", "300.00")).unwrap();

        let found = store.query(&alice, date, Decimal::from(450)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Swiggy");

        let other_day = NaiveDate::from_ymd_opt(2024, 1, 13).unwrap();
        assert!(store.query(&alice, other_day, Decimal::from(450)).unwrap().is_empty());
    }

    #[test]
    fn test_clones_share_rows() {
        let store = MemoryStore::new();
        let handle = store.clone();
        let first = handle.create(&UserId(1), &expense("Uber", "89.00")).unwrap();
        let second = handle.create(&UserId(1), &expense("Ola", "120.00")).unwrap();

        assert_eq!(store.len(), 2);
        assert_ne!(first, second);
        assert_eq!(store.expenses(&UserId(1))[1].title, "Ola");
    }

    #[test]
    fn test_category_table() {
        let store = MemoryStore::new();
        assert_eq!(store.list().unwrap(), default_rules());

        let store = store.with_rules(vec![CategoryRule::new("Rent", &["landlord"])]);
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
