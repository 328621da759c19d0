//! Merchant cleanup and money-direction inference.

use super::patterns::{CREDIT_KEYWORD, MERCHANT_PREFIX, TIME_OF_DAY};
use crate::models::transaction::Direction;

/// Merchant text with its statement prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanMerchant {
    /// Merchant or counterparty name.
    pub name: String,
    /// Direction implied by the removed prefix, if any.
    pub implied: Option<Direction>,
}

/// Strip `Paid to`, `Received from` and similar prefixes from merchant text.
pub fn clean_merchant(raw: &str) -> CleanMerchant {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = TIME_OF_DAY.replace(&collapsed, "").into_owned();

    let (name, implied) = match MERCHANT_PREFIX.captures(&collapsed) {
        Some(caps) => {
            let prefix = caps["prefix"].to_lowercase();
            let implied = if prefix.starts_with("received") {
                Direction::Credit
            } else {
                Direction::Debit
            };
            let rest = &collapsed[caps.get(0).map_or(0, |m| m.end())..];
            (rest.to_string(), Some(implied))
        }
        None => (collapsed.clone(), None),
    };

    let name = name
        .trim_matches(|c: char| c == '-' || c == ':' || c == ',' || c.is_whitespace())
        .to_string();

    CleanMerchant { name, implied }
}

/// Infer direction from free text when no explicit token was printed.
pub fn infer_direction(text: &str) -> Direction {
    if CREDIT_KEYWORD.is_match(text) {
        Direction::Credit
    } else {
        Direction::Debit
    }
}
