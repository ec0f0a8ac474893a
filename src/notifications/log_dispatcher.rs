//! Log-only notification dispatcher for development
//!
//! Writes each notification to the tracing log instead of delivering it.

use super::{Notification, NotificationDispatcher};
use crate::error::Result;
use async_trait::async_trait;

/// A dispatcher that logs notifications instead of sending them
///
/// Only ids, type and status are logged; names never reach the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationDispatcher;

impl LogNotificationDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for LogNotificationDispatcher {
    async fn send(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            target: "idv_intake::notifications",
            notification_id = %notification.id,
            notification_type = ?notification.notification_type,
            recipient_id = %notification.recipient_id,
            item_id = %notification.item.id,
            extra = %notification.extra,
            "Notification dispatched (log only)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::{
        VerificationMethod, VerificationRecord, VerificationStatus,
    };

    #[tokio::test]
    async fn test_log_dispatcher_always_succeeds() {
        let now = chrono::Utc::now();
        let record = VerificationRecord {
            subject_id: "1".to_string(),
            first_name: None,
            last_name: None,
            method: VerificationMethod::Persona,
            external_id: None,
            status: VerificationStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let dispatcher = LogNotificationDispatcher::new();
        assert!(dispatcher
            .send(&Notification::verification_updated(&record))
            .await
            .is_ok());
    }
}
