//! PDF reading module.

mod extractor;
#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::{PdfExtractor, lines_from_text};

use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// No extractable text (empty or scanned document).
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF reading implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}

/// Read a statement PDF into its text lines.
///
/// Fails when the bytes are not a PDF, the PDF cannot be decrypted, exceeds
/// `max_pages` (0 = unlimited), or carries less than `min_text_length`
/// visible characters.
pub fn read_lines(data: &[u8], config: &PdfConfig) -> Result<Vec<String>> {
    let mut extractor = PdfExtractor::new().with_min_text_length(config.min_text_length);
    extractor.load(data)?;

    let pages = extractor.page_count();
    if config.max_pages > 0 && pages > config.max_pages {
        return Err(PdfError::TooManyPages {
            pages,
            limit: config.max_pages,
        });
    }

    let text = extractor.extract_text()?;
    if extractor.classify(&text) == PdfType::Empty {
        return Err(PdfError::NoText);
    }
    Ok(lines_from_text(&text))
}
