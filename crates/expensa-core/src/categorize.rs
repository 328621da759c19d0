//! Keyword categorization and expense normalization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{NormalizeError, StoreError};
use crate::models::config::NormalizeConfig;
use crate::models::expense::ExpenseCandidate;
use crate::models::transaction::{ParsedTransaction, PaymentMethod};
use crate::store::CategoryTable;

/// Category assigned when no rule matches.
pub const OTHER_CATEGORY: &str = "Other";

/// A category and the merchant keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    /// Lower-case keywords, matched as substrings of the merchant name.
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            category: category.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Whether any keyword occurs in the already lower-cased merchant text.
    pub fn matches(&self, merchant_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && merchant_lower.contains(keyword.as_str()))
    }
}

/// Built-in category rules in precedence order.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Food & Dining",
            &["swiggy", "zomato", "dominos", "pizza", "restaurant", "cafe", "food", "dining", "hotel"],
        ),
        CategoryRule::new(
            "Shopping",
            &["amazon", "flipkart", "myntra", "shop", "store", "mall", "retail", "purchase"],
        ),
        CategoryRule::new(
            "Transportation",
            &["uber", "ola", "metro", "bus", "train", "fuel", "petrol", "diesel", "cab"],
        ),
        CategoryRule::new(
            "Entertainment",
            &["netflix", "prime", "hotstar", "movie", "cinema", "theatre", "game", "entertainment"],
        ),
        CategoryRule::new(
            "Utilities",
            &["electricity", "water", "gas", "internet", "mobile", "phone", "bill", "recharge"],
        ),
        CategoryRule::new(
            "Healthcare",
            &["pharmacy", "medical", "hospital", "doctor", "clinic", "health", "medicine"],
        ),
        CategoryRule::new(
            "Education",
            &["school", "college", "university", "course", "training", "education", "book"],
        ),
    ]
}

/// The built-in category table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCategories;

impl CategoryTable for DefaultCategories {
    fn list(&self) -> Result<Vec<CategoryRule>, StoreError> {
        Ok(default_rules())
    }
}

/// Immutable, ordered keyword categorizer. First matching rule wins.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Load the rules once from a category table.
    pub fn from_table(table: &dyn CategoryTable) -> Result<Self, StoreError> {
        let rules = table.list()?;
        debug!("Loaded {} category rules", rules.len());
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Category id for a merchant name.
    pub fn categorize(&self, merchant: &str) -> &str {
        let lower = merchant.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| rule.category.as_str())
            .unwrap_or(OTHER_CATEGORY)
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// Turns parsed transactions into categorized expense candidates.
#[derive(Debug, Clone)]
pub struct Normalizer {
    categorizer: Categorizer,
    title_max_chars: usize,
}

impl Normalizer {
    pub fn new(categorizer: Categorizer) -> Self {
        Self {
            categorizer,
            title_max_chars: NormalizeConfig::default().title_max_chars,
        }
    }

    pub fn from_config(categorizer: Categorizer, config: &NormalizeConfig) -> Self {
        Self::new(categorizer).with_title_max_chars(config.title_max_chars)
    }

    /// Set the maximum number of characters in a title.
    pub fn with_title_max_chars(mut self, max: usize) -> Self {
        self.title_max_chars = max;
        self
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// Validate the amount, assign a category and build title and description.
    pub fn normalize(
        &self,
        mut transaction: ParsedTransaction,
    ) -> Result<ExpenseCandidate, NormalizeError> {
        transaction.amount = validate_amount(transaction.amount)?;
        transaction.payment_method = PaymentMethod::DigitalWallet;

        let category = self.categorizer.categorize(&transaction.merchant_name).to_string();
        let title = truncate_chars(&transaction.merchant_name, self.title_max_chars);
        let description = transaction.merchant_name.clone();

        trace!("{} -> {}", transaction.merchant_name, category);

        Ok(ExpenseCandidate {
            transaction,
            category,
            title,
            description,
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Categorizer::default())
    }
}

/// Check an amount is positive with at most two decimals; return it at scale 2.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, NormalizeError> {
    if amount <= Decimal::ZERO {
        return Err(NormalizeError::InvalidAmount {
            amount: amount.to_string(),
            reason: "amount must be positive".to_string(),
        });
    }
    if amount.normalize().scale() > 2 {
        return Err(NormalizeError::InvalidAmount {
            amount: amount.to_string(),
            reason: "more than two decimal places".to_string(),
        });
    }

    let mut amount = amount;
    amount.rescale(2);
    Ok(amount)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::{Direction, TransactionStatus};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn transaction(merchant: &str, amount: &str) -> ParsedTransaction {
        ParsedTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            merchant_name: merchant.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            direction: Direction::Debit,
            payment_method: PaymentMethod::Other,
            status: TransactionStatus::Success,
            reference: None,
            line: 0,
            pattern: "dmy".to_string(),
        }
    }

    #[test]
    fn test_categorize_default_rules() {
        let categorizer = Categorizer::default();
        assert_eq!(categorizer.categorize("SWIGGY Bangalore"), "Food & Dining");
        assert_eq!(categorizer.categorize("Amazon Pay India"), "Shopping");
        assert_eq!(categorizer.categorize("Uber India"), "Transportation");
        assert_eq!(categorizer.categorize("Netflix"), "Entertainment");
        assert_eq!(categorizer.categorize("Mobile recharged 9689718455"), "Utilities");
        assert_eq!(categorizer.categorize("Apollo Pharmacy"), "Healthcare");
        assert_eq!(categorizer.categorize("Coursera course fee"), "Education");
        assert_eq!(categorizer.categorize("Rahul Sharma"), OTHER_CATEGORY);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let categorizer = Categorizer::new(vec![
            CategoryRule::new("Groceries", &["mart"]),
            CategoryRule::new("Shopping", &["mart", "shop"]),
        ]);
        assert_eq!(categorizer.categorize("D Mart"), "Groceries");
        assert_eq!(categorizer.categorize("Book Shop"), "Shopping");
    }

    #[test]
    fn test_categorize_is_deterministic() {
        let categorizer = Categorizer::from_table(&DefaultCategories).unwrap();
        let first = categorizer.categorize("Zomato order");
        for _ in 0..10 {
            assert_eq!(categorizer.categorize("Zomato order"), first);
        }
    }

    #[test]
    fn test_normalize_builds_candidate() {
        let normalizer = Normalizer::default();
        let candidate = normalizer.normalize(transaction("Swiggy", "450")).unwrap();

        assert_eq!(candidate.category, "Food & Dining");
        assert_eq!(candidate.title, "Swiggy");
        assert_eq!(candidate.description, "Swiggy");
        assert_eq!(candidate.payment_method(), PaymentMethod::DigitalWallet);
        assert_eq!(candidate.amount().to_string(), "450.00");
    }

    #[test]
    fn test_title_is_truncated_by_characters() {
        let merchant = "श्री कृष्णा स्वीट्स ".repeat(5);
        let normalizer = Normalizer::default().with_title_max_chars(10);
        let candidate = normalizer.normalize(transaction(&merchant, "20")).unwrap();

        assert_eq!(candidate.title.chars().count(), 10);
        assert_eq!(candidate.description, merchant);
    }

    #[test]
    fn test_invalid_amounts() {
        let normalizer = Normalizer::default();
        assert!(matches!(
            normalizer.normalize(transaction("Swiggy", "0")),
            Err(NormalizeError::InvalidAmount { .. })
        ));
        assert!(matches!(
            normalizer.normalize(transaction("Swiggy", "-5")),
            Err(NormalizeError::InvalidAmount { .. })
        ));
        assert!(matches!(
            normalizer.normalize(transaction("Swiggy", "10.555")),
            Err(NormalizeError::InvalidAmount { .. })
        ));
        assert!(normalizer.normalize(transaction("Swiggy", "10.500")).is_ok());
    }
}
