//! Lead persistence subsystem.
//!
//! # Data Flow
//! ```text
//! LeadService
//!     → Arc<dyn LeadStore> (injected at startup)
//!         → memory.rs (DashMap, default / tests)
//!         → sqlite.rs (sqlx pool, durable)
//! ```
//!
//! # Design Decisions
//! - Store is chosen by configuration and injected, never reached globally
//! - Every backend error is classified as transient or permanent
//! - Creation is the only write; there is no update or delete path

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};
use crate::lead::{Lead, NewLead};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors returned by a lead store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or is busy; retrying later may succeed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The record violates a storage constraint.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Any other backend failure.
    #[error("storage failure: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether the failure is expected to clear on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_))
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "transient",
            StorageError::Constraint(_) => "constraint",
            StorageError::Backend(_) => "backend",
        }
    }
}

/// Persistence interface for leads.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Insert a new lead, assigning its id and timestamp.
    async fn create(&self, lead: NewLead) -> Result<Lead, StorageError>;

    /// All stored leads, oldest first.
    async fn list(&self) -> Result<Vec<Lead>, StorageError>;
}

/// Build the store selected by configuration.
///
/// SQLite stores are migrated before being returned.
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn LeadStore>, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory lead store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Sqlite => {
            let store = SqliteStore::connect(config).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_is_transient() {
        assert!(StorageError::Unavailable("pool timed out".into()).is_transient());
        assert!(!StorageError::Constraint("CHECK failed".into()).is_transient());
        assert!(!StorageError::Backend("corrupt row".into()).is_transient());
    }

    #[tokio::test]
    async fn open_memory_store_from_default_config() {
        let store = open(&StorageConfig::default()).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
