//! Statement ingestion pipeline.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::categorize::{Categorizer, Normalizer};
use crate::dedup::Deduplicator;
use crate::error::{IngestError, Result};
use crate::models::config::{ExpensaConfig, PdfConfig};
use crate::models::expense::{
    ExpenseId, IngestionResult, NewExpense, SkipReason, SkippedTransaction, StoredExpense, UserId,
};
use crate::models::transaction::{Direction, ParsedTransaction, TransactionStatus};
use crate::pdf;
use crate::statement::LineParser;
use crate::store::{self, CategoryTable, ExpenseStore, MemoryStore};

/// Runs read → parse → normalize → dedup → persist for one statement.
pub struct Ingestor {
    parser: LineParser,
    normalizer: Normalizer,
    pdf: PdfConfig,
    skip_credits: bool,
    skip_unsettled: bool,
    dry_run: bool,
}

impl Ingestor {
    pub fn new(parser: LineParser, normalizer: Normalizer) -> Self {
        Self {
            parser,
            normalizer,
            pdf: PdfConfig {
                max_pages: 0,
                ..PdfConfig::default()
            },
            skip_credits: false,
            skip_unsettled: false,
            dry_run: false,
        }
    }

    /// Build an ingestor from configuration, loading category rules once.
    pub fn from_config(config: &ExpensaConfig, categories: &dyn CategoryTable) -> Result<Self> {
        let categorizer = Categorizer::from_table(categories)
            .map_err(|source| IngestError::Pipeline { saved: 0, source })?;

        Ok(Self::new(
            LineParser::from_config(&config.parsing),
            Normalizer::from_config(categorizer, &config.normalize),
        )
        .with_pdf_config(config.pdf.clone())
        .with_skip_credits(config.normalize.skip_credits)
        .with_skip_unsettled(config.normalize.skip_unsettled))
    }

    pub fn with_pdf_config(mut self, pdf: PdfConfig) -> Self {
        self.pdf = pdf;
        self
    }

    /// Leave money received out of the import.
    pub fn with_skip_credits(mut self, skip: bool) -> Self {
        self.skip_credits = skip;
        self
    }

    /// Leave rows marked failed or pending out of the import.
    pub fn with_skip_unsettled(mut self, skip: bool) -> Self {
        self.skip_unsettled = skip;
        self
    }

    /// Run duplicate detection without writing anything.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Why the configured filters leave `transaction` out, if they do.
    pub fn filter(&self, transaction: &ParsedTransaction) -> Option<SkipReason> {
        if self.skip_unsettled && transaction.status != TransactionStatus::Success {
            Some(SkipReason::NotSettled)
        } else if self.skip_credits && transaction.direction == Direction::Credit {
            Some(SkipReason::Credit)
        } else {
            None
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Read a PDF and return the transactions it holds, without a store.
    pub fn extract(&self, data: &[u8]) -> Result<Vec<ParsedTransaction>> {
        let lines = pdf::read_lines(data, &self.pdf)?;
        Ok(self.parser.parse(&lines).collect())
    }

    /// Ingest a statement PDF for `user`.
    pub fn ingest_pdf(
        &self,
        data: &[u8],
        user: UserId,
        store: &dyn ExpenseStore,
    ) -> Result<IngestionResult> {
        let start = Instant::now();
        let lines = pdf::read_lines(data, &self.pdf)?;
        debug!("Read {} lines in {:?}", lines.len(), start.elapsed());
        self.ingest_lines(&lines, user, store)
    }

    /// Ingest statement lines already extracted from a PDF.
    pub fn ingest_lines(
        &self,
        lines: &[String],
        user: UserId,
        store: &dyn ExpenseStore,
    ) -> Result<IngestionResult> {
        let transactions: Vec<ParsedTransaction> = self.parser.parse(lines).collect();
        if transactions.is_empty() {
            return Err(IngestError::NoTransactions);
        }

        let overlay;
        let target: &dyn ExpenseStore = if self.dry_run {
            overlay = DryRunStore::new(store);
            &overlay
        } else {
            store
        };
        let dedup = Deduplicator::new(target, user);

        let mut result = IngestionResult {
            total_extracted: transactions.len(),
            ..Default::default()
        };

        for transaction in transactions {
            if let Some(reason) = self.filter(&transaction) {
                debug!("Skipping line {}: {}", transaction.line, reason.as_str());
                result.skipped.push(SkippedTransaction::new(&transaction, reason));
                continue;
            }

            let candidate = match self.normalizer.normalize(transaction.clone()) {
                Ok(candidate) => candidate,
                Err(e) => {
                    warn!("Skipping line {}: {}", transaction.line, e);
                    result
                        .skipped
                        .push(SkippedTransaction::new(&transaction, SkipReason::InvalidAmount));
                    continue;
                }
            };

            let duplicate = dedup.is_duplicate(&candidate).map_err(|source| IngestError::Pipeline {
                saved: result.total_saved,
                source,
            })?;
            if duplicate {
                result
                    .skipped
                    .push(SkippedTransaction::new(&candidate.transaction, SkipReason::Duplicate));
                continue;
            }

            target
                .create(&user, &candidate.to_new_expense())
                .map_err(|source| IngestError::Pipeline {
                    saved: result.total_saved,
                    source,
                })?;

            result.total_saved += 1;
            result.saved.push(candidate);
        }

        info!(
            "Ingested statement for user {}: {} extracted, {} saved, {} skipped{}",
            user,
            result.total_extracted,
            result.total_saved,
            result.total_skipped(),
            if self.dry_run { " (dry run)" } else { "" }
        );

        Ok(result)
    }
}

/// Reads through to a store but keeps writes in memory.
struct DryRunStore<'a> {
    base: &'a dyn ExpenseStore,
    pending: MemoryStore,
}

impl<'a> DryRunStore<'a> {
    fn new(base: &'a dyn ExpenseStore) -> Self {
        Self {
            base,
            pending: MemoryStore::new(),
        }
    }
}

impl ExpenseStore for DryRunStore<'_> {
    fn query(
        &self,
        user: &UserId,
        date: NaiveDate,
        amount: Decimal,
    ) -> store::Result<Vec<StoredExpense>> {
        let mut found = self.base.query(user, date, amount)?;
        found.extend(self.pending.query(user, date, amount)?);
        Ok(found)
    }

    fn create(&self, user: &UserId, expense: &NewExpense) -> store::Result<ExpenseId> {
        self.pending.create(user, expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::DefaultCategories;
    use crate::error::StoreError;
    use crate::pdf::fixtures::text_pdf;
    use crate::statement::DateWindow;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn ingestor() -> Ingestor {
        let parser = LineParser::new().with_window(DateWindow::new(
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        ));
        Ingestor::new(parser, Normalizer::default())
    }

    fn statement() -> Vec<String> {
        lines(&[
            "PhonePe Transaction Statement",
            "Jul 16, 2025 Mobile recharged 9689718455 DEBIT ₹302",
            "10:32 am Transaction ID T2507161032",
            "Jul 13, 2025 Paid to Todakar Chiken Centre DEBIT ₹210",
            "Jul 13, 2025 Paid to Laxmi Sweet Home DEBIT ₹20",
            "Jul 07, 2025 Paid to Mama 2 DEBIT ₹150",
            "Jul 05, 2025 Paid to SBIMOPS DEBIT ₹100",
        ])
    }

    /// Fails every create after the first `limit` succeed.
    struct FlakyStore {
        inner: MemoryStore,
        limit: usize,
        calls: Mutex<usize>,
    }

    impl ExpenseStore for FlakyStore {
        fn query(
            &self,
            user: &UserId,
            date: NaiveDate,
            amount: Decimal,
        ) -> store::Result<Vec<StoredExpense>> {
            self.inner.query(user, date, amount)
        }

        fn create(&self, user: &UserId, expense: &NewExpense) -> store::Result<ExpenseId> {
            let mut calls = self.calls.lock();
            *calls += 1;
            if *calls > self.limit {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.inner.create(user, expense)
        }
    }

    #[test]
    fn test_fresh_statement_is_saved() {
        let store = MemoryStore::new();
        let result = ingestor().ingest_lines(&statement(), UserId(1), &store).unwrap();

        assert_eq!(result.total_extracted, 5);
        assert_eq!(result.total_saved, 5);
        assert_eq!(store.len(), 5);

        let first = &result.saved[0];
        assert_eq!(first.merchant_name(), "Mobile recharged 9689718455");
        assert_eq!(first.category, "Utilities");
        assert_eq!(first.amount().to_string(), "302.00");
    }

    #[test]
    fn test_two_already_stored_transactions_are_skipped() {
        let store = MemoryStore::new();
        let input = statement();

        // Import two of the five rows first.
        let partial = lines(&[input[3].as_str(), input[5].as_str()]);
        let first = ingestor().ingest_lines(&partial, UserId(1), &store).unwrap();
        assert_eq!(first.total_saved, 2);

        let result = ingestor().ingest_lines(&input, UserId(1), &store).unwrap();
        assert_eq!(result.total_extracted, 5);
        assert_eq!(result.total_saved, 3);
        assert_eq!(result.duplicates(), 2);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_reingest_saves_nothing() {
        let store = MemoryStore::new();
        ingestor().ingest_lines(&statement(), UserId(1), &store).unwrap();

        let again = ingestor().ingest_lines(&statement(), UserId(1), &store).unwrap();
        assert_eq!(again.total_extracted, 5);
        assert_eq!(again.total_saved, 0);
        assert_eq!(again.duplicates(), 5);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_other_user_is_not_a_duplicate() {
        let store = MemoryStore::new();
        ingestor().ingest_lines(&statement(), UserId(1), &store).unwrap();

        let other = ingestor().ingest_lines(&statement(), UserId(2), &store).unwrap();
        assert_eq!(other.total_saved, 5);
    }

    #[test]
    fn test_non_numeric_amount_is_not_counted() {
        let store = MemoryStore::new();
        let input = lines(&[
            "12/01/2024 Swiggy ₹450",
            "13/01/2024 Zomato ₹abc",
            "14/01/2024 Uber ₹89",
        ]);

        let result = ingestor().ingest_lines(&input, UserId(1), &store).unwrap();
        assert_eq!(result.total_extracted, 2);
        assert_eq!(result.total_saved, 2);
    }

    #[test]
    fn test_no_transactions() {
        let store = MemoryStore::new();
        let input = lines(&["PhonePe Transaction Statement", "No transactions in this period"]);

        let err = ingestor().ingest_lines(&input, UserId(1), &store).unwrap_err();
        assert!(matches!(err, IngestError::NoTransactions));
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_pdf_upload_is_unreadable() {
        let store = MemoryStore::new();
        let err = ingestor()
            .ingest_pdf(b"not a pdf at all", UserId(1), &store)
            .unwrap_err();
        assert!(matches!(err, IngestError::UnreadablePdf(_)));

        let err = ingestor().ingest_pdf(&[], UserId(1), &store).unwrap_err();
        assert!(matches!(err, IngestError::UnreadablePdf(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_text_pdf_is_ingested_once() {
        let data = text_pdf(&[
            "PhonePe Statement",
            "12/01/2024 Swiggy Rs. 450.00",
            "13/01/2024 Uber Rs. 230.50",
            "15/01/2024 Amazon Rs. 1,299.00",
        ]);
        let store = MemoryStore::new();

        let first = ingestor().ingest_pdf(&data, UserId(1), &store).unwrap();
        assert_eq!((first.total_extracted, first.total_saved), (3, 3));
        assert_eq!(first.saved[0].transaction.merchant_name, "Swiggy");
        assert_eq!(first.saved[0].amount().to_string(), "450.00");

        let again = ingestor().ingest_pdf(&data, UserId(1), &store).unwrap();
        assert_eq!((again.total_extracted, again.total_saved), (3, 0));
        assert_eq!(again.duplicates(), 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_store_failure_keeps_earlier_saves() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            limit: 2,
            calls: Mutex::new(0),
        };

        let err = ingestor().ingest_lines(&statement(), UserId(1), &store).unwrap_err();
        match err {
            IngestError::Pipeline { saved, source } => {
                assert_eq!(saved, 2);
                assert!(matches!(source, StoreError::Unavailable(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.inner.len(), 2);
    }

    #[test]
    fn test_credits_and_unsettled_rows_are_saved_by_default() {
        let store = MemoryStore::new();
        let input = statement();

        let partial = lines(&[input[3].as_str(), input[5].as_str()]);
        ingestor().ingest_lines(&partial, UserId(1), &store).unwrap();

        let mixed = lines(&[
            input[3].as_str(),
            input[5].as_str(),
            "Jul 09, 2025 Paid to SBIMOPS DEBIT ₹100",
            "Jul 05, 2025 Received from Rahul Sharma CREDIT ₹1,500",
            "12/01/2024 Amazon ₹99.00 Failed",
        ]);
        let result = ingestor().ingest_lines(&mixed, UserId(1), &store).unwrap();
        assert_eq!(result.total_extracted, 5);
        assert_eq!(result.total_saved, 3);
        assert_eq!(result.duplicates(), 2);
        assert_eq!(result.total_skipped(), 2);
    }

    #[test]
    fn test_credit_and_unsettled_filters() {
        let input = lines(&[
            "Jul 05, 2025 Received from Rahul Sharma CREDIT ₹1,500",
            "12/01/2024 Amazon ₹1,299.00 Failed",
            "12/01/2024 Flipkart ₹499.00 Paid",
        ]);

        let store = MemoryStore::new();
        let result = ingestor()
            .with_skip_credits(true)
            .with_skip_unsettled(true)
            .ingest_lines(&input, UserId(1), &store)
            .unwrap();
        assert_eq!(result.total_extracted, 3);
        assert_eq!(result.total_saved, 1);
        let reasons: Vec<_> = result.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(reasons, vec![SkipReason::Credit, SkipReason::NotSettled]);

        let store = MemoryStore::new();
        let result = ingestor()
            .with_skip_credits(true)
            .ingest_lines(&input, UserId(1), &store)
            .unwrap();
        assert_eq!(result.total_saved, 2);
    }

    #[test]
    fn test_filters_from_config() {
        let mut config = ExpensaConfig::default();
        config.normalize.skip_credits = true;
        let ingestor = Ingestor::from_config(&config, &DefaultCategories).unwrap();

        let credit = LineParser::new()
            .parse(&lines(&["Jul 05, 2025 Received from Rahul Sharma CREDIT ₹1,500"]))
            .next()
            .unwrap();
        assert_eq!(ingestor.filter(&credit), Some(SkipReason::Credit));
        assert_eq!(ingestor.with_skip_credits(false).filter(&credit), None);
    }

    #[test]
    fn test_repeated_row_in_one_statement_is_saved_once() {
        let store = MemoryStore::new();
        let input = lines(&["12/01/2024 Swiggy ₹450", "12/01/2024 Swiggy ₹450"]);

        let result = ingestor().ingest_lines(&input, UserId(1), &store).unwrap();
        assert_eq!(result.total_extracted, 2);
        assert_eq!(result.total_saved, 1);
        assert_eq!(result.duplicates(), 1);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let store = MemoryStore::new();
        let mut input = statement();
        input.push("Jul 05, 2025 Paid to SBIMOPS DEBIT ₹100".to_string());

        let result = ingestor()
            .with_dry_run(true)
            .ingest_lines(&input, UserId(1), &store)
            .unwrap();
        assert_eq!(result.total_extracted, 6);
        assert_eq!(result.total_saved, 5);
        assert_eq!(result.duplicates(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_from_config_uses_category_table() {
        let mut config = ExpensaConfig::default();
        config.normalize.title_max_chars = 6;

        let ingestor = Ingestor::from_config(&config, &DefaultCategories).unwrap();
        let store = MemoryStore::new();
        let input = lines(&["12/01/2024 Swiggy Instamart ₹450"]);

        let result = ingestor.ingest_lines(&input, UserId(1), &store).unwrap();
        assert_eq!(result.saved[0].title, "Swiggy");
        assert_eq!(result.saved[0].category, "Food & Dining");
    }
}
