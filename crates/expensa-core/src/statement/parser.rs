//! Transaction line parser.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::config::ParsingConfig;
use crate::models::transaction::{
    ParsedTransaction, PaymentMethod, RawTransactionLine, TransactionStatus,
};

use super::rules::patterns::{NOISE_LINE, TIME_OF_DAY, TRANSACTION_ID};
use super::rules::{
    AmountExtractor, DateExtractor, LinePattern, best_match, clean_merchant, default_patterns,
    infer_direction,
};

/// Inclusive range of acceptable transaction dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DateWindow {
    pub fn new(earliest: NaiveDate, latest: NaiveDate) -> Self {
        Self { earliest, latest }
    }

    /// Window from `earliest` up to today's local date.
    pub fn until_today(earliest: NaiveDate) -> Self {
        Self::new(earliest, Local::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.earliest <= date && date <= self.latest
    }
}

/// One transaction block: a line holding a date plus the lines after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    /// Index of the head line in the extracted text.
    pub index: usize,
    pub head: &'a str,
    /// Following lines with noise removed.
    pub continuation: Vec<String>,
    /// Transaction id printed inside the block.
    pub reference: Option<String>,
}

impl Block<'_> {
    /// Head and continuation lines joined by single spaces.
    pub fn joined(&self) -> String {
        std::iter::once(self.head)
            .chain(self.continuation.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_raw(&self) -> RawTransactionLine {
        RawTransactionLine {
            index: self.index,
            text: self.joined(),
        }
    }
}

/// Splits extracted lines into transaction blocks.
pub struct Blocks<'a> {
    lines: &'a [String],
    pos: usize,
    dates: DateExtractor,
}

impl<'a> Blocks<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self {
            lines,
            pos: 0,
            dates: DateExtractor::new(),
        }
    }

    fn is_head(&self, line: &str) -> bool {
        self.dates.contains_date(line)
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines;

        // Anything before the first date line is statement header.
        while self.pos < lines.len() && !self.is_head(&lines[self.pos]) {
            self.pos += 1;
        }
        if self.pos >= lines.len() {
            return None;
        }

        let index = self.pos;
        let head = lines[index].as_str();
        self.pos += 1;

        let mut continuation = Vec::new();
        let mut reference = None;

        while self.pos < lines.len() && !self.is_head(&lines[self.pos]) {
            let line = TIME_OF_DAY.replace(&lines[self.pos], "");
            self.pos += 1;

            if line.is_empty() {
                continue;
            }
            if let Some(caps) = TRANSACTION_ID.captures(&line) {
                reference = Some(caps[1].to_string());
                continue;
            }
            if NOISE_LINE.is_match(&line) {
                trace!("Dropping noise line: {}", line);
                continue;
            }
            continuation.push(line.into_owned());
        }

        Some(Block {
            index,
            head,
            continuation,
            reference,
        })
    }
}

/// Ordered, rule-based transaction line parser.
pub struct LineParser {
    patterns: Vec<LinePattern>,
    window: DateWindow,
    max_continuation_lines: usize,
    amounts: AmountExtractor,
}

impl LineParser {
    /// Create a parser with the built-in layouts and default settings.
    pub fn new() -> Self {
        Self::from_config(&ParsingConfig::default())
    }

    /// Create a parser from parsing configuration.
    pub fn from_config(config: &ParsingConfig) -> Self {
        Self {
            patterns: default_patterns(),
            window: DateWindow::until_today(config.earliest_date),
            max_continuation_lines: config.max_continuation_lines,
            amounts: AmountExtractor::new(),
        }
    }

    /// Set the acceptable date range.
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    /// Set how many continuation lines may extend a merchant name.
    pub fn with_max_continuation_lines(mut self, max: usize) -> Self {
        self.max_continuation_lines = max;
        self
    }

    /// Parse lines into transactions.
    ///
    /// The iterator is lazy and finite; calling `parse` again starts over.
    pub fn parse<'p, 'l>(&'p self, lines: &'l [String]) -> Transactions<'p, 'l> {
        Transactions {
            parser: self,
            blocks: Blocks::new(lines),
        }
    }

    /// Parse one block, or `None` if it holds no acceptable transaction.
    pub fn parse_block(&self, block: &Block<'_>) -> Option<ParsedTransaction> {
        let (found, head_only) = match best_match(&self.patterns, block.head) {
            Some(found) => (found, true),
            None => match best_match(&self.patterns, &block.joined()) {
                Some(found) => (found, false),
                None => {
                    debug!("No layout matched line {}: {}", block.index, block.head);
                    return None;
                }
            },
        };

        if found.amount <= Decimal::ZERO {
            debug!("Skipping non-positive amount on line {}", block.index);
            return None;
        }
        if !self.window.contains(found.date) {
            debug!(
                "Skipping line {}: date {} outside {}..={}",
                block.index, found.date, self.window.earliest, self.window.latest
            );
            return None;
        }

        let mut merchant_text = found.merchant.clone();
        if head_only {
            for extra in block
                .continuation
                .iter()
                .filter(|line| !self.amounts.contains_amount(line))
                .filter(|line| line.chars().any(char::is_alphabetic))
                .take(self.max_continuation_lines)
            {
                merchant_text.push(' ');
                merchant_text.push_str(extra);
            }
        }

        let merchant = clean_merchant(&merchant_text);
        if merchant.name.is_empty() {
            debug!("Skipping line {}: empty merchant", block.index);
            return None;
        }

        let direction = found
            .direction
            .or(merchant.implied)
            .unwrap_or_else(|| infer_direction(&merchant_text));

        Some(ParsedTransaction {
            transaction_date: found.date,
            merchant_name: merchant.name,
            amount: found.amount,
            direction,
            payment_method: PaymentMethod::DigitalWallet,
            status: found.status.unwrap_or(TransactionStatus::Success),
            reference: found.reference.or_else(|| block.reference.clone()),
            line: block.index,
            pattern: found.pattern.to_string(),
        })
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy sequence of transactions recognized in statement lines.
pub struct Transactions<'p, 'l> {
    parser: &'p LineParser,
    blocks: Blocks<'l>,
}

impl Iterator for Transactions<'_, '_> {
    type Item = ParsedTransaction;

    fn next(&mut self) -> Option<Self::Item> {
        for block in self.blocks.by_ref() {
            if let Some(transaction) = self.parser.parse_block(&block) {
                return Some(transaction);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Transactions<'_, '_> {}
