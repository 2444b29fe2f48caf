//! In-memory lead store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::lead::{Lead, NewLead};
use crate::storage::{LeadStore, StorageError};

/// A thread-safe, process-local lead store.
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<Uuid, Lead>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn create(&self, lead: NewLead) -> Result<Lead, StorageError> {
        let lead = lead.into_lead();
        self.inner.insert(lead.id, lead.clone());
        tracing::debug!(lead_id = %lead.id, total = self.inner.len(), "Lead stored in memory");
        Ok(lead)
    }

    async fn list(&self) -> Result<Vec<Lead>, StorageError> {
        let mut leads: Vec<Lead> = self.inner.iter().map(|r| r.value().clone()).collect();
        leads.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(leads)
    }
}
