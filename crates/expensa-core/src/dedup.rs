//! Duplicate detection against already persisted expenses.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::StoreError;
use crate::models::expense::{ExpenseCandidate, StoredExpense, UserId};
use crate::store::ExpenseStore;

/// Identity of a transaction for duplicate detection. Computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub date: NaiveDate,
    pub amount: Decimal,
    /// Lower-cased merchant with whitespace collapsed.
    pub merchant: String,
}

impl Fingerprint {
    pub fn new(date: NaiveDate, amount: Decimal, merchant: &str) -> Self {
        Self {
            date,
            amount: amount.normalize(),
            merchant: normalize_merchant(merchant),
        }
    }

    pub fn of_candidate(candidate: &ExpenseCandidate) -> Self {
        Self::new(candidate.date(), candidate.amount(), candidate.merchant_name())
    }

    /// Whether a stored expense carries the same transaction.
    ///
    /// Date and amount must be equal. The stored title or description must
    /// equal or contain the merchant, or be contained in it.
    pub fn matches(&self, stored: &StoredExpense) -> bool {
        if stored.date != self.date || stored.amount.normalize() != self.amount {
            return false;
        }
        if self.merchant.is_empty() {
            return false;
        }

        [&stored.title, &stored.description].into_iter().any(|text| {
            let text = normalize_merchant(text);
            !text.is_empty() && (text.contains(&self.merchant) || self.merchant.contains(&text))
        })
    }
}

/// Lower-case and collapse whitespace runs.
pub fn normalize_merchant(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Checks candidates against one user's persisted expenses.
pub struct Deduplicator<'a> {
    store: &'a dyn ExpenseStore,
    user: UserId,
}

impl<'a> Deduplicator<'a> {
    pub fn new(store: &'a dyn ExpenseStore, user: UserId) -> Self {
        Self { store, user }
    }

    /// Whether `candidate` is already stored for this user.
    pub fn is_duplicate(&self, candidate: &ExpenseCandidate) -> Result<bool, StoreError> {
        let fingerprint = Fingerprint::of_candidate(candidate);
        let existing = self
            .store
            .query(&self.user, fingerprint.date, candidate.amount())?;

        let duplicate = existing.iter().any(|stored| fingerprint.matches(stored));
        if duplicate {
            debug!(
                "Duplicate: {} {} {}",
                fingerprint.date, candidate.amount(), fingerprint.merchant
            );
        }
        Ok(duplicate)
    }
}
