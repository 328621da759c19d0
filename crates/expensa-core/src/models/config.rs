//! Configuration structures for the ingestion pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Main configuration for expensa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpensaConfig {
    /// PDF reading configuration.
    pub pdf: PdfConfig,

    /// Line parsing configuration.
    pub parsing: ParsingConfig,

    /// Normalization configuration.
    pub normalize: NormalizeConfig,

    /// Expense database configuration.
    pub storage: StorageConfig,

    /// Upload server configuration.
    pub server: ServerConfig,
}

/// PDF reading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages accepted (0 = unlimited).
    pub max_pages: u32,

    /// Minimum extracted characters to treat the PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 200,
            min_text_length: 20,
        }
    }
}

/// Line parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Oldest transaction date accepted.
    pub earliest_date: NaiveDate,

    /// Continuation lines appended to a merchant description.
    pub max_continuation_lines: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            // PhonePe launched in August 2015.
            earliest_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            max_continuation_lines: 2,
        }
    }
}

/// Normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Maximum characters kept in an expense title.
    pub title_max_chars: usize,

    /// Leave credits (money received) out of imports.
    pub skip_credits: bool,

    /// Leave failed and pending rows out of imports.
    pub skip_unsettled: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            title_max_chars: 50,
            skip_credits: false,
            skip_unsettled: false,
        }
    }
}

/// Expense database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("expensa.db"),
        }
    }
}

/// Upload server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,

    /// Bearer tokens and the user each one authenticates.
    pub tokens: BTreeMap<String, i64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            tokens: BTreeMap::new(),
        }
    }
}

impl ExpensaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
