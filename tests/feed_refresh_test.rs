//! Feed refresh propagation through the public API

use idv_intake::feed::{
    ChangeKind, ContentRef, FeedEntryId, FeedRefreshPropagator, FeedRefreshTask,
    GrantApplicationChange, InMemoryFeedEntries, InMemoryRefreshQueue, POST_CONTENT_TYPE,
    PurchaseChange, REFRESH_PRIORITY, UnifiedDocumentId,
};
use std::sync::Arc;

async fn seeded() -> InMemoryFeedEntries {
    let entries = InMemoryFeedEntries::new();
    let doc = Some(UnifiedDocumentId(100));

    // A fundraise post and a paper in the same document
    entries.insert(FeedEntryId(1), ContentRef::new(POST_CONTENT_TYPE, 10), doc).await;
    entries.insert(FeedEntryId(2), ContentRef::new(POST_CONTENT_TYPE, 10), doc).await;
    entries.insert(FeedEntryId(3), ContentRef::new("paper", 11), doc).await;
    entries
        .insert(FeedEntryId(4), ContentRef::new(POST_CONTENT_TYPE, 12), Some(UnifiedDocumentId(200)))
        .await;
    entries
}

#[tokio::test]
async fn test_purchase_then_commit_enqueues_priority_one_refreshes() {
    let entries = seeded().await;
    let queue = InMemoryRefreshQueue::new();
    let propagator = FeedRefreshPropagator::new(Arc::new(entries));

    let change = PurchaseChange {
        purchase_id: 55,
        content: ContentRef::new(POST_CONTENT_TYPE, 10),
    };
    let enqueued = propagator.on_purchase_saved(&change).await.commit(&queue).await;

    assert_eq!(enqueued, 2);
    assert_eq!(
        queue.tasks().await,
        vec![
            FeedRefreshTask { entry_id: FeedEntryId(1), priority: REFRESH_PRIORITY },
            FeedRefreshTask { entry_id: FeedEntryId(2), priority: REFRESH_PRIORITY },
        ]
    );
}

#[tokio::test]
async fn test_grant_application_lifecycle() {
    let entries = seeded().await;
    let queue = InMemoryRefreshQueue::new();
    let propagator = FeedRefreshPropagator::new(Arc::new(entries));

    let mut change = GrantApplicationChange {
        application_id: 8,
        grant_id: 3,
        unified_document: Some(UnifiedDocumentId(100)),
        kind: ChangeKind::Saved,
    };

    propagator.on_grant_application_changed(&change).await.commit(&queue).await;
    change.kind = ChangeKind::Deleted;
    propagator.on_grant_application_changed(&change).await.commit(&queue).await;

    let ids: Vec<_> = queue.drain().await.into_iter().map(|t| t.entry_id).collect();
    assert_eq!(ids, vec![FeedEntryId(1), FeedEntryId(2), FeedEntryId(1), FeedEntryId(2)]);
}

#[tokio::test]
async fn test_rolled_back_write_enqueues_nothing() {
    let entries = seeded().await;
    let queue = InMemoryRefreshQueue::new();
    let propagator = FeedRefreshPropagator::new(Arc::new(entries));

    let change = GrantApplicationChange {
        application_id: 8,
        grant_id: 3,
        unified_document: Some(UnifiedDocumentId(100)),
        kind: ChangeKind::Saved,
    };

    {
        let pending = propagator.on_grant_application_saved(&change).await;
        assert_eq!(pending.len(), 2);
        // transaction rolled back: batch dropped without commit
    }

    assert!(queue.tasks().await.is_empty());
}

#[tokio::test]
async fn test_grant_without_document_or_entries() {
    let propagator = FeedRefreshPropagator::new(Arc::new(seeded().await));

    let no_document = GrantApplicationChange {
        application_id: 9,
        grant_id: 4,
        unified_document: None,
        kind: ChangeKind::Deleted,
    };
    assert!(propagator.on_grant_application_deleted(&no_document).await.is_empty());

    let empty_document = GrantApplicationChange {
        unified_document: Some(UnifiedDocumentId(999)),
        ..no_document
    };
    assert!(propagator.on_grant_application_deleted(&empty_document).await.is_empty());
}
