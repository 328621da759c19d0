//! Amount extraction for PhonePe statements.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{AMOUNT_BARE, AMOUNT_WITH_CURRENCY};
use super::{ExtractionMatch, FieldExtractor};

/// Currency-prefixed amount extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether the text holds a currency-prefixed amount.
    pub fn contains_amount(&self, text: &str) -> bool {
        self.extract(text).is_some()
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        AMOUNT_WITH_CURRENCY
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                let amount = parse_rupee_amount(&caps[1])?;
                Some(
                    ExtractionMatch::new(amount, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// Parse a rupee amount such as `₹1,23,456.78`, `Rs. 450` or `INR 99.5`.
///
/// Currency markers and digit grouping commas are dropped. A missing
/// fraction means whole rupees. Returns `None` for anything non-numeric.
pub fn parse_rupee_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let s = s
        .strip_prefix('₹')
        .or_else(|| s.strip_prefix("INR"))
        .or_else(|| s.strip_prefix("Rs."))
        .or_else(|| s.strip_prefix("Rs"))
        .or_else(|| s.strip_prefix("rs."))
        .or_else(|| s.strip_prefix("rs"))
        .unwrap_or(s)
        .trim();

    if !AMOUNT_BARE.is_match(s) {
        return None;
    }

    Decimal::from_str(&s.replace(',', "")).ok()
}

/// Format an amount with Indian digit grouping (`1,23,456.78`).
pub fn format_rupee_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some(parts) => parts,
        None => return s,
    };
    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    // Last three digits, then groups of two.
    let mut formatted = String::new();
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        let remaining = len - i;
        if i > 0 && remaining >= 3 && (remaining == 3 || (remaining - 3) % 2 == 0) {
            formatted.push(',');
        }
        formatted.push(c);
    }

    format!("{}₹{}.{}", sign, formatted, decimal_part)
}
