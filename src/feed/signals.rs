use std::sync::Arc;

use super::{
    ChangeKind, FeedEntryId, FeedEntryLookup, FeedRefreshTask, GrantApplicationChange,
    POST_CONTENT_TYPE, PurchaseChange, RefreshQueue,
};

/// Refresh tasks waiting for the triggering write to commit.
///
/// Dropping the batch discards it; nothing reaches the queue until
/// [`commit`](Self::commit) is called.
#[derive(Debug, Default)]
#[must_use = "refreshes are only enqueued by commit()"]
pub struct PendingRefreshes {
    origin: String,
    tasks: Vec<FeedRefreshTask>,
}

impl PendingRefreshes {
    fn new(origin: String, entries: Vec<FeedEntryId>) -> Self {
        Self {
            origin,
            tasks: entries.into_iter().map(FeedRefreshTask::new).collect(),
        }
    }

    fn empty(origin: String) -> Self {
        Self::new(origin, Vec::new())
    }

    pub fn tasks(&self) -> &[FeedRefreshTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Enqueue every task, returning how many were accepted.
    ///
    /// A failed enqueue is logged and the remaining tasks are still sent.
    pub async fn commit(self, queue: &dyn RefreshQueue) -> usize {
        let mut enqueued = 0;

        for task in self.tasks {
            match queue.enqueue(task).await {
                Ok(()) => enqueued += 1,
                Err(e) => {
                    tracing::error!(
                        origin = %self.origin,
                        entry_id = %task.entry_id,
                        error = %e,
                        "Error enqueueing feed entry refresh"
                    );
                }
            }
        }

        if enqueued > 0 {
            tracing::debug!(origin = %self.origin, enqueued, "Feed entry refreshes enqueued");
        }

        enqueued
    }
}

/// Turns purchase and grant application changes into feed refreshes.
///
/// Lookup failures are logged with the triggering record id and yield an
/// empty batch; the caller's write is never failed by feed maintenance.
#[derive(Clone)]
pub struct FeedRefreshPropagator {
    lookup: Arc<dyn FeedEntryLookup>,
}

impl FeedRefreshPropagator {
    pub fn new(lookup: Arc<dyn FeedEntryLookup>) -> Self {
        Self { lookup }
    }

    /// Refresh the entries showing the purchased object.
    pub async fn on_purchase_saved(&self, change: &PurchaseChange) -> PendingRefreshes {
        let origin = format!("purchase {}", change.purchase_id);

        match self.lookup.entries_for_content(&change.content).await {
            Ok(entries) => PendingRefreshes::new(origin, entries),
            Err(e) => {
                tracing::error!(
                    purchase_id = change.purchase_id,
                    error = %e,
                    "Error refreshing feed entries for purchase"
                );
                PendingRefreshes::empty(origin)
            }
        }
    }

    pub async fn on_grant_application_saved(
        &self,
        change: &GrantApplicationChange,
    ) -> PendingRefreshes {
        self.grant_application_refreshes(change, "grant application").await
    }

    pub async fn on_grant_application_deleted(
        &self,
        change: &GrantApplicationChange,
    ) -> PendingRefreshes {
        self.grant_application_refreshes(change, "deleted grant application").await
    }

    /// Dispatch on [`GrantApplicationChange::kind`].
    pub async fn on_grant_application_changed(
        &self,
        change: &GrantApplicationChange,
    ) -> PendingRefreshes {
        match change.kind {
            ChangeKind::Saved => self.on_grant_application_saved(change).await,
            ChangeKind::Deleted => self.on_grant_application_deleted(change).await,
        }
    }

    /// Refresh the post entries of the grant's document.
    async fn grant_application_refreshes(
        &self,
        change: &GrantApplicationChange,
        label: &str,
    ) -> PendingRefreshes {
        let origin = format!("{} {}", label, change.application_id);

        let Some(document) = change.unified_document else {
            tracing::debug!(
                application_id = change.application_id,
                grant_id = change.grant_id,
                "Grant has no unified document, no feed entries to refresh"
            );
            return PendingRefreshes::empty(origin);
        };

        match self
            .lookup
            .entries_for_document(document, POST_CONTENT_TYPE)
            .await
        {
            Ok(entries) => PendingRefreshes::new(origin, entries),
            Err(e) => {
                tracing::error!(
                    application_id = change.application_id,
                    grant_id = change.grant_id,
                    error = %e,
                    "Error refreshing feed entries for {}",
                    label
                );
                PendingRefreshes::empty(origin)
            }
        }
    }
}
