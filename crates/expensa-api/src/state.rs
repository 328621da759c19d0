//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use expensa_core::{
    CategoryTable, ExpenseStore, ExpensaConfig, IngestionResult, Ingestor, MemoryStore,
    SqliteStore, UserId,
};

use crate::error::AppError;

/// Where uploaded statements are persisted.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Shared in-memory store.
    Memory(MemoryStore),
    /// SQLite file, opened once per request.
    Sqlite(PathBuf),
}

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ExpensaConfig>,
    pub backend: StoreBackend,
}

impl AppState {
    pub fn new(config: ExpensaConfig, backend: StoreBackend) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    /// State persisting into the configured SQLite database.
    pub fn from_config(config: ExpensaConfig) -> Self {
        let path = config.storage.database_path.clone();
        Self::new(config, StoreBackend::Sqlite(path))
    }

    /// Resolve a bearer token to its user.
    pub fn user_for_token(&self, token: &str) -> Option<UserId> {
        self.config.server.tokens.get(token).copied().map(UserId)
    }

    /// Run the full pipeline for one upload. Blocking.
    pub fn ingest(&self, data: &[u8], user: UserId) -> Result<IngestionResult, AppError> {
        match &self.backend {
            StoreBackend::Memory(store) => run(&self.config, store, data, user),
            StoreBackend::Sqlite(path) => {
                let store = SqliteStore::open(path)
                    .map_err(|e| AppError::Internal(format!("opening {}: {}", path.display(), e)))?;
                run(&self.config, &store, data, user)
            }
        }
    }
}

fn run<S>(
    config: &ExpensaConfig,
    store: &S,
    data: &[u8],
    user: UserId,
) -> Result<IngestionResult, AppError>
where
    S: ExpenseStore + CategoryTable,
{
    let ingestor = Ingestor::from_config(config, store)?;
    Ok(ingestor.ingest_pdf(data, user, store)?)
}
