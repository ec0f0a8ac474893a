//! In-memory feed collaborators
//!
//! Suitable for development and tests. Production deployments back
//! [`FeedEntryLookup`] with the feed table and [`RefreshQueue`] with the
//! platform task queue.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{
    ContentRef, FeedEntryId, FeedEntryLookup, FeedRefreshTask, RefreshQueue, UnifiedDocumentId,
};
use crate::error::Result;

#[derive(Debug, Clone)]
struct FeedEntry {
    content: ContentRef,
    unified_document: Option<UnifiedDocumentId>,
}

/// In-memory feed entry index.
#[derive(Clone, Default)]
pub struct InMemoryFeedEntries {
    entries: Arc<RwLock<HashMap<FeedEntryId, FeedEntry>>>,
}

impl InMemoryFeedEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub async fn insert(
        &self,
        id: FeedEntryId,
        content: ContentRef,
        unified_document: Option<UnifiedDocumentId>,
    ) {
        self.entries.write().await.insert(
            id,
            FeedEntry {
                content,
                unified_document,
            },
        );
    }

    async fn matching(&self, predicate: impl Fn(&FeedEntry) -> bool) -> Vec<FeedEntryId> {
        let entries = self.entries.read().await;
        let mut ids: Vec<FeedEntryId> = entries
            .iter()
            .filter(|(_, entry)| predicate(entry))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl FeedEntryLookup for InMemoryFeedEntries {
    async fn entries_for_content(&self, content: &ContentRef) -> Result<Vec<FeedEntryId>> {
        Ok(self.matching(|entry| &entry.content == content).await)
    }

    async fn entries_for_document(
        &self,
        document: UnifiedDocumentId,
        content_type: &str,
    ) -> Result<Vec<FeedEntryId>> {
        Ok(self
            .matching(|entry| {
                entry.unified_document == Some(document)
                    && entry.content.content_type == content_type
            })
            .await)
    }
}

/// In-memory refresh queue that records tasks in enqueue order.
#[derive(Clone, Default)]
pub struct InMemoryRefreshQueue {
    tasks: Arc<Mutex<Vec<FeedRefreshTask>>>,
}

impl InMemoryRefreshQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tasks(&self) -> Vec<FeedRefreshTask> {
        self.tasks.lock().await.clone()
    }

    /// Remove and return every queued task.
    pub async fn drain(&self) -> Vec<FeedRefreshTask> {
        std::mem::take(&mut *self.tasks.lock().await)
    }
}

#[async_trait]
impl RefreshQueue for InMemoryRefreshQueue {
    async fn enqueue(&self, task: FeedRefreshTask) -> Result<()> {
        tracing::debug!(entry_id = %task.entry_id, priority = task.priority, "Feed refresh queued");
        self.tasks.lock().await.push(task);
        Ok(())
    }
}
