//! Transaction line layouts and their precedence.
//!
//! Every layout is tried against a line. The match capturing the most fields
//! wins; equal counts go to the layout listed first in [`default_patterns`].

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use super::amounts::parse_rupee_amount;
use super::dates::parse_statement_date;
use super::patterns::*;
use crate::models::transaction::{Direction, TransactionStatus};

/// A named transaction line layout.
#[derive(Debug, Clone, Copy)]
pub struct LinePattern {
    name: &'static str,
    regex: &'static Regex,
}

/// Fields captured by a line layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// Name of the layout that produced this match.
    pub pattern: &'static str,
    pub date: NaiveDate,
    /// Merchant text as printed, prefixes included.
    pub merchant: String,
    pub amount: Decimal,
    /// Explicit direction token, or one implied by the status token.
    pub direction: Option<Direction>,
    pub status: Option<TransactionStatus>,
    pub reference: Option<String>,
    /// Number of named fields the layout captured.
    pub fields: usize,
}

impl LinePattern {
    pub fn new(name: &'static str, regex: &'static Regex) -> Self {
        Self { name, regex }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Match the layout against `text`.
    ///
    /// Returns `None` when the layout does not match, the date is not a real
    /// calendar date, the amount is not numeric, or the merchant has no letters.
    pub fn apply(&self, text: &str) -> Option<LineMatch> {
        let caps = self.regex.captures(text)?;

        let date = parse_statement_date(caps.name("date")?.as_str())?;
        let amount = parse_rupee_amount(caps.name("amount")?.as_str())?;

        let merchant = caps.name("merchant")?.as_str().trim();
        if !merchant.chars().any(char::is_alphabetic) {
            return None;
        }

        let status_token = caps.name("status").map(|m| m.as_str());
        let direction = caps
            .name("direction")
            .and_then(|m| Direction::from_token(m.as_str()))
            .or_else(|| status_token.and_then(Direction::from_token));

        let fields = self
            .regex
            .capture_names()
            .flatten()
            .filter(|name| caps.name(name).is_some())
            .count();

        Some(LineMatch {
            pattern: self.name,
            date,
            merchant: merchant.to_string(),
            amount,
            direction,
            status: status_token.map(TransactionStatus::from_token),
            reference: caps.name("reference").map(|m| m.as_str().to_string()),
            fields,
        })
    }
}

/// Built-in layouts in precedence order.
pub fn default_patterns() -> Vec<LinePattern> {
    vec![
        // Jul 16, 2025 Paid to Swiggy DEBIT ₹450
        LinePattern::new("month_name_direction", &LINE_MONTH_NAME_DIRECTION),
        // 2025-07-30 T2507301234 Uber India Rs. 1,299.00 Debit
        LinePattern::new("iso_reference_direction", &LINE_ISO_REFERENCE_DIRECTION),
        // 12/01/2024 Amazon ₹1,299.00 Paid
        LinePattern::new("dmy_status", &LINE_DMY_STATUS),
        // 12/01/2024 Amazon ₹1,299.00
        LinePattern::new("dmy", &LINE_DMY),
        // 2024-01-12 Amazon Rs. 1,299.00
        LinePattern::new("iso", &LINE_ISO),
        // 16 Jul 2025 Swiggy ₹450
        LinePattern::new("day_month_name", &LINE_DAY_MONTH_NAME),
        // Swiggy 12/01/2024 ₹450
        LinePattern::new("merchant_date_amount", &LINE_MERCHANT_DATE_AMOUNT),
        // 12/01/2024 ₹450 Swiggy
        LinePattern::new("date_amount_merchant", &LINE_DATE_AMOUNT_MERCHANT),
        // Swiggy 450.00 12/01/2024
        LinePattern::new("merchant_amount_date", &LINE_MERCHANT_AMOUNT_DATE),
    ]
}

/// Pick the best layout match for `text`.
pub fn best_match(patterns: &[LinePattern], text: &str) -> Option<LineMatch> {
    patterns
        .iter()
        .filter_map(|pattern| pattern.apply(text))
        .fold(None, |best, candidate| match best {
            Some(best) if best.fields >= candidate.fields => Some(best),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pattern(name: &str) -> LinePattern {
        default_patterns()
            .into_iter()
            .find(|p| p.name() == name)
            .unwrap()
    }

    #[test]
    fn test_every_layout_recognizes_its_example() {
        let cases = [
            ("month_name_direction", "Jul 16, 2025 Paid to Swiggy DEBIT ₹450"),
            ("iso_reference_direction", "2025-07-30 T2507301234 Uber India Rs. 1,299.00 Debit"),
            ("dmy_status", "12/01/2024 Amazon ₹1,299.00 Paid"),
            ("dmy", "12/01/2024 Amazon ₹1,299.00"),
            ("iso", "2024-01-12 Amazon Rs. 1,299.00"),
            ("day_month_name", "16 Jul 2025 Swiggy ₹450"),
            ("merchant_date_amount", "Swiggy 12/01/2024 ₹450"),
            ("date_amount_merchant", "12/01/2024 ₹450 Swiggy"),
            ("merchant_amount_date", "Swiggy 450.00 12/01/2024"),
        ];

        for (name, line) in cases {
            assert!(pattern(name).apply(line).is_some(), "{} should match {:?}", name, line);
        }
    }

    #[test]
    fn test_best_match_prefers_more_fields() {
        let m = best_match(&default_patterns(), "12/01/2024 Amazon ₹1,299.00 Paid").unwrap();
        assert_eq!(m.pattern, "dmy_status");
        assert_eq!(m.fields, 4);
        assert_eq!(m.direction, Some(Direction::Debit));
        assert_eq!(m.status, Some(TransactionStatus::Success));
        assert_eq!(m.amount, Decimal::from_str("1299.00").unwrap());
    }

    #[test]
    fn test_best_match_ties_resolve_by_list_order() {
        let line = "Paid 12/01/2024 Swiggy ₹450 13/01/2024 ₹90";
        let dmy = pattern("dmy");
        let trailing = pattern("merchant_date_amount");

        let first = best_match(&[dmy, trailing], line).unwrap();
        assert_eq!(first.pattern, "dmy");
        assert_eq!(first.date, date(2024, 1, 12));

        let reversed = best_match(&[trailing, dmy], line).unwrap();
        assert_eq!(reversed.pattern, "merchant_date_amount");
        assert_eq!(reversed.date, date(2024, 1, 13));
    }

    #[test]
    fn test_status_tokens() {
        let failed = best_match(&default_patterns(), "12/01/2024 Amazon ₹99 Failed").unwrap();
        assert_eq!(failed.status, Some(TransactionStatus::Failed));
        assert_eq!(failed.direction, None);

        let received = best_match(&default_patterns(), "12/01/2024 Rahul ₹500 Received").unwrap();
        assert_eq!(received.direction, Some(Direction::Credit));
    }

    #[test]
    fn test_rejects_unparseable_fields() {
        assert_eq!(best_match(&default_patterns(), "31/02/2024 Amazon ₹450"), None);
        assert_eq!(best_match(&default_patterns(), "12/01/2024 Amazon ₹abc"), None);
        assert_eq!(best_match(&default_patterns(), "12/01/2024 1234 ₹450"), None);
        assert_eq!(best_match(&default_patterns(), "Opening balance for July"), None);
    }

    #[test]
    fn test_reference_is_captured() {
        let m = best_match(
            &default_patterns(),
            "2025-07-30 T2507301234 Uber India Rs. 1,299.00 Debit",
        )
        .unwrap();
        assert_eq!(m.pattern, "iso_reference_direction");
        assert_eq!(m.reference.as_deref(), Some("T2507301234"));
        assert_eq!(m.merchant, "Uber India");
        assert_eq!(m.fields, 5);
    }
}
