//! Core library for PhonePe statement ingestion.
//!
//! This crate provides:
//! - PDF reading (text lines in reading order)
//! - Rule-based transaction line parsing
//! - Keyword categorization and normalization
//! - Duplicate detection against persisted expenses
//! - The ingestion pipeline and expense store implementations

pub mod categorize;
pub mod dedup;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pdf;
pub mod statement;
pub mod store;

pub use categorize::{CategoryRule, Categorizer, DefaultCategories, Normalizer};
pub use dedup::{Deduplicator, Fingerprint};
pub use error::{IngestError, NormalizeError, PdfError, Result, StoreError};
pub use ingest::Ingestor;
pub use models::config::ExpensaConfig;
pub use models::expense::{
    ExpenseCandidate, ExpenseId, IngestionResult, NewExpense, SkipReason, SkippedTransaction,
    StoredExpense, UserId,
};
pub use models::transaction::{
    Direction, ParsedTransaction, PaymentMethod, RawTransactionLine, TransactionStatus,
};
pub use pdf::{PdfProcessor, PdfType, read_lines};
pub use statement::{DateWindow, LineParser};
pub use store::{CategoryTable, ExpenseStore, MemoryStore};
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
