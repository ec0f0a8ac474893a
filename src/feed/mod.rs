//! Feed read-model refresh propagation.
//!
//! Purchases and grant applications are shown on feed entries. When one of
//! them changes, the affected entries are looked up and a refresh task is
//! queued for each. Tasks are collected into a [`PendingRefreshes`] batch and
//! only enqueued when the caller commits it after its own write succeeds.

mod memory;
mod signals;

pub use memory::{InMemoryFeedEntries, InMemoryRefreshQueue};
pub use signals::{FeedRefreshPropagator, PendingRefreshes};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority of every feed refresh task.
pub const REFRESH_PRIORITY: u8 = 1;

/// Content type of the posts that grants are attached to.
pub const POST_CONTENT_TYPE: &str = "researchhubpost";

/// Feed entry primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedEntryId(pub i64);

impl fmt::Display for FeedEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform-wide document grouping id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnifiedDocumentId(pub i64);

impl fmt::Display for UnifiedDocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generic reference to the object a feed entry shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub content_type: String,
    pub object_id: i64,
}

impl ContentRef {
    pub fn new(content_type: impl Into<String>, object_id: i64) -> Self {
        Self {
            content_type: content_type.into(),
            object_id,
        }
    }
}

/// A purchase (boost, fundraise contribution, ...) was created or updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseChange {
    pub purchase_id: i64,
    /// What the purchase was made on.
    pub content: ContentRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Saved,
    Deleted,
}

/// A grant application was saved or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantApplicationChange {
    pub application_id: i64,
    pub grant_id: i64,
    /// Document of the post the grant belongs to, if it has one.
    pub unified_document: Option<UnifiedDocumentId>,
    pub kind: ChangeKind,
}

/// Request to rebuild one feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRefreshTask {
    pub entry_id: FeedEntryId,
    pub priority: u8,
}

impl FeedRefreshTask {
    pub fn new(entry_id: FeedEntryId) -> Self {
        Self {
            entry_id,
            priority: REFRESH_PRIORITY,
        }
    }
}

/// Read access to feed entries.
#[async_trait]
pub trait FeedEntryLookup: Send + Sync {
    /// Entries showing the given object.
    async fn entries_for_content(&self, content: &ContentRef) -> Result<Vec<FeedEntryId>>;

    /// Entries of `content_type` belonging to a unified document.
    async fn entries_for_document(
        &self,
        document: UnifiedDocumentId,
        content_type: &str,
    ) -> Result<Vec<FeedEntryId>>;
}

/// Task queue that rebuilds feed entries.
#[async_trait]
pub trait RefreshQueue: Send + Sync {
    async fn enqueue(&self, task: FeedRefreshTask) -> Result<()>;
}
