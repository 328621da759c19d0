//! PDF text extraction using lopdf and pdf-extract.

use std::panic;

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            min_text_length: 20,
        }
    }

    /// Set the minimum text length for a PDF to count as text-based.
    pub fn with_min_text_length(mut self, min: usize) -> Self {
        self.min_text_length = min;
        self
    }
}

impl PdfExtractor {
    /// Classify already extracted text by its visible character count.
    pub fn classify(&self, text: &str) -> PdfType {
        let visible = text.chars().filter(|c| !c.is_whitespace()).count();
        let pdf_type = if visible >= self.min_text_length {
            PdfType::Text
        } else {
            PdfType::Empty
        };

        debug!("PDF analysis: {} visible chars -> {:?}", visible, pdf_type);
        pdf_type
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(PdfError::Parse("empty input".to_string()));
        }

        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        // pdf-extract panics on some malformed content streams.
        let data = self.raw_data.as_slice();
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => {
                trace!("Extracted {} bytes of text", text.len());
                Ok(text)
            }
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => {
                warn!("Text extraction panicked");
                Err(PdfError::TextExtraction("extractor panicked".to_string()))
            }
        }
    }
}

/// Split extracted text into trimmed, non-empty lines with single spaces.
pub fn lines_from_text(text: &str) -> Vec<String> {
    text.split(['\n', '\r', '\u{000c}'])
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}
