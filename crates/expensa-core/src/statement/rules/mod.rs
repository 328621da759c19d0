//! Rule-based field extractors for PhonePe statements.

pub mod amounts;
pub mod dates;
pub mod direction;
pub mod layouts;
pub mod patterns;

pub use amounts::{AmountExtractor, format_rupee_amount, parse_rupee_amount};
pub use dates::{DateExtractor, parse_statement_date};
pub use direction::{CleanMerchant, clean_merchant, infer_direction};
pub use layouts::{LineMatch, LinePattern, best_match, default_patterns};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value extracted from statement text.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
