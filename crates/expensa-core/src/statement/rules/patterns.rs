//! Common regex patterns for PhonePe statement extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Month names, three-letter or full, case-insensitive.
const MONTH: &str = r"(?i:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*)\.?";

/// Currency marker printed before an amount.
const CURRENCY: &str = r"(?:₹|\b(?i:rs)\.?|\bINR)";

/// Rupee amount with optional Indian digit grouping and fraction.
const NUMBER: &str = r"\d[\d,]*(?:\.\d+)?";

fn dmy() -> String {
    r"\b\d{1,2}[/\-]\d{1,2}[/\-](?:\d{4}|\d{2})\b".to_string()
}

fn iso() -> String {
    r"\b\d{4}-\d{2}-\d{2}\b".to_string()
}

fn month_day_year() -> String {
    format!(r"\b{MONTH}\s+\d{{1,2}},?\s+\d{{4}}\b")
}

fn day_month_year() -> String {
    format!(r"\b\d{{1,2}}\s+{MONTH},?\s+\d{{4}}\b")
}

fn amount() -> String {
    format!(r"{CURRENCY}\s*(?P<amount>{NUMBER})")
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

lazy_static! {
    // Date tokens
    pub static ref DATE_DMY: Regex = compile(
        r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{4}|\d{2})\b"
    );

    pub static ref DATE_ISO: Regex = compile(
        r"\b(\d{4})-(\d{2})-(\d{2})\b"
    );

    pub static ref DATE_MONTH_DAY_YEAR: Regex = compile(&format!(
        r"\b({MONTH})\s+(\d{{1,2}}),?\s+(\d{{4}})\b"
    ));

    pub static ref DATE_DAY_MONTH_YEAR: Regex = compile(&format!(
        r"\b(\d{{1,2}})\s+({MONTH}),?\s+(\d{{4}})\b"
    ));

    // Amount tokens
    pub static ref AMOUNT_WITH_CURRENCY: Regex = compile(&format!(
        r"{CURRENCY}\s*({NUMBER})"
    ));

    pub static ref AMOUNT_BARE: Regex = compile(
        r"^\d[\d,]*(?:\.\d+)?$"
    );

    // Transaction line layouts, named groups feed the line parser
    pub static ref LINE_MONTH_NAME_DIRECTION: Regex = compile(&format!(
        r"^(?P<date>{})\s+(?P<merchant>.+?)\s+(?:(?P<direction>(?i:debit|credit))\s+)?{}",
        month_day_year(),
        amount()
    ));

    pub static ref LINE_ISO_REFERENCE_DIRECTION: Regex = compile(&format!(
        r"^(?P<date>{})\s+(?P<reference>[A-Z]*\d[A-Z0-9]{{5,}})\s+(?P<merchant>.+?)\s+{}\s+(?P<direction>(?i:debit|credit))\b",
        iso(),
        amount()
    ));

    pub static ref LINE_DMY_STATUS: Regex = compile(&format!(
        r"(?P<date>{})\s+(?P<merchant>.+?)\s+{}\s+(?P<status>(?i:paid|failed|pending|successful|success|received))\b",
        dmy(),
        amount()
    ));

    pub static ref LINE_DMY: Regex = compile(&format!(
        r"(?P<date>{})\s+(?P<merchant>.+?)\s+{}",
        dmy(),
        amount()
    ));

    pub static ref LINE_ISO: Regex = compile(&format!(
        r"(?P<date>{})\s+(?P<merchant>.+?)\s+{}",
        iso(),
        amount()
    ));

    pub static ref LINE_DAY_MONTH_NAME: Regex = compile(&format!(
        r"(?P<date>{})\s+(?P<merchant>.+?)\s+(?:(?P<direction>(?i:debit|credit))\s+)?{}",
        day_month_year(),
        amount()
    ));

    pub static ref LINE_MERCHANT_DATE_AMOUNT: Regex = compile(&format!(
        r"^(?P<merchant>.+?)\s+(?P<date>{})\s+{}",
        dmy(),
        amount()
    ));

    pub static ref LINE_DATE_AMOUNT_MERCHANT: Regex = compile(&format!(
        r"(?P<date>{})\s+{}\s+(?P<merchant>.+)$",
        dmy(),
        amount()
    ));

    pub static ref LINE_MERCHANT_AMOUNT_DATE: Regex = compile(&format!(
        r"^(?P<merchant>.+?)\s+(?P<amount>\d[\d,]*\.\d{{2}})\s+(?P<date>{})",
        dmy()
    ));

    // Noise lines inside a transaction block
    pub static ref TIME_OF_DAY: Regex = compile(
        r"(?i)^\d{1,2}:\d{2}(?::\d{2})?\s*(?:am|pm)?(?:\s+|$)"
    );

    pub static ref TRANSACTION_ID: Regex = compile(
        r"(?i)^transaction\s+id\s*:?\s*([A-Za-z0-9]+)"
    );

    pub static ref NOISE_LINE: Regex = compile(
        r"(?i)^(?:utr\b|paid\s+by\b|credited\s+to\b|debited\s+from\b|page\s+\d+\s+of\s+\d+$|date\s+(?:transaction\s+)?(?:details|description)\b|this\s+is\s+a\s+system\s+generated|disclaimer\b)"
    );

    // Merchant text
    pub static ref MERCHANT_PREFIX: Regex = compile(
        r"(?i)^(?P<prefix>paid\s+to|payment\s+to|money\s+sent\s+to|sent\s+to|transfer\s+to|received\s+from)\s+"
    );

    pub static ref CREDIT_KEYWORD: Regex = compile(
        r"(?i)\b(?:received|credited|refund(?:ed)?|cashback|reversal|reversed|interest)\b"
    );
}
