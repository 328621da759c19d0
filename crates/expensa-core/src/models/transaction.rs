//! Statement transaction models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A block of statement text believed to hold one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransactionLine {
    /// Index of the block's first line in the extracted text.
    pub index: usize,

    /// Head line followed by its continuation lines, space separated.
    pub text: String,
}

/// A transaction recognized in statement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    /// Date the transaction happened.
    pub transaction_date: NaiveDate,

    /// Merchant or counterparty, as printed on the statement.
    pub merchant_name: String,

    /// Transaction amount, always positive.
    pub amount: Decimal,

    /// Money out or money in.
    pub direction: Direction,

    /// How the payment was made.
    pub payment_method: PaymentMethod,

    /// Outcome printed next to the transaction.
    #[serde(default)]
    pub status: TransactionStatus,

    /// Statement transaction id, when one was printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Index of the source line in the extracted text.
    pub line: usize,

    /// Name of the line pattern that recognized this transaction.
    pub pattern: String,
}

/// Direction of money movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Money paid out.
    #[default]
    Debit,
    /// Money received.
    Credit,
}

impl Direction {
    /// Parse an explicit direction or status token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "debit" | "dr" | "paid" | "sent" => Some(Direction::Debit),
            "credit" | "cr" | "received" | "credited" => Some(Direction::Credit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

/// Payment method of an expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    /// UPI apps and wallets.
    DigitalWallet,
    #[default]
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::DigitalWallet => "digital_wallet",
            PaymentMethod::Other => "other",
        }
    }

    /// Parse a stored payment method; unknown values map to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cash" => PaymentMethod::Cash,
            "card" => PaymentMethod::Card,
            "bank_transfer" | "transfer" => PaymentMethod::BankTransfer,
            "digital_wallet" | "upi" | "phonepe" | "paytm" => PaymentMethod::DigitalWallet,
            _ => PaymentMethod::Other,
        }
    }
}

/// Outcome of a statement transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Success,
    Failed,
    Pending,
}

impl TransactionStatus {
    /// Parse a status token printed on the statement.
    pub fn from_token(token: &str) -> Self {
        let s = token.trim().to_lowercase();
        if s.contains("fail") || s.contains("declined") || s.contains("reject") {
            TransactionStatus::Failed
        } else if s.contains("pending") || s.contains("processing") {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Success
        }
    }
}
