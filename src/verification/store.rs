use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{VerificationRecord, VerificationUpdate};

/// Persistence for verification records.
///
/// # Atomicity
///
/// [`upsert`](VerificationStore::upsert) must be a single create-or-update
/// against a unique subject key. A read followed by a separate insert races
/// with concurrent deliveries for the same subject and can create duplicates.
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Create the record for `update.subject_id`, or overwrite the existing one.
    ///
    /// Returns the stored record after the write.
    async fn upsert(&self, update: &VerificationUpdate) -> Result<VerificationRecord>;

    /// Look up the record for a subject.
    async fn get(&self, subject_id: &str) -> Result<Option<VerificationRecord>>;
}

/// In-memory verification store (for development/testing)
///
/// The whole create-or-update runs under one write lock.
#[derive(Clone, Default)]
pub struct InMemoryVerificationStore {
    records: Arc<RwLock<HashMap<String, VerificationRecord>>>,
}

impl InMemoryVerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VerificationStore for InMemoryVerificationStore {
    async fn upsert(&self, update: &VerificationUpdate) -> Result<VerificationRecord> {
        let now = chrono::Utc::now();
        let mut records = self.records.write().await;

        let record = records
            .entry(update.subject_id.clone())
            .and_modify(|existing| existing.apply(update, now))
            .or_insert_with(|| VerificationRecord::from_update(update, now));

        Ok(record.clone())
    }

    async fn get(&self, subject_id: &str) -> Result<Option<VerificationRecord>> {
        Ok(self.records.read().await.get(subject_id).cloned())
    }
}
