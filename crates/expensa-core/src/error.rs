//! Error types for the expensa-core library.

use thiserror::Error;

/// Main error type for statement ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The upload is not a readable, text-bearing PDF.
    #[error("unreadable PDF: {0}")]
    UnreadablePdf(#[from] PdfError),

    /// The statement was readable but no transaction line was recognized.
    #[error("no transactions found in statement")]
    NoTransactions,

    /// A store call failed partway through the run.
    ///
    /// Expenses persisted before the failure stay committed.
    #[error("ingestion stopped after {saved} saved expenses: {source}")]
    Pipeline {
        saved: usize,
        #[source]
        source: StoreError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF reading.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF has more pages than the configured limit.
    #[error("PDF has {pages} pages, limit is {limit}")]
    TooManyPages { pages: u32, limit: u32 },

    /// No text could be extracted (image-only scan).
    #[error("PDF contains no extractable text")]
    NoText,
}

/// Errors raised while turning a parsed transaction into an expense candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Amount is not a positive decimal with at most two fractional digits.
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: String, reason: String },
}

/// Errors reported by an expense store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// SQLite error.
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for the expensa library.
pub type Result<T> = std::result::Result<T, IngestError>;
