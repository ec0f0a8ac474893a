//! User notifications emitted by the intake pipeline.
//!
//! Delivery (email, push, in-app) belongs to the platform's notification
//! service; this module builds the notification and hands it to a
//! [`NotificationDispatcher`].

mod log_dispatcher;

pub use log_dispatcher::LogNotificationDispatcher;

use crate::error::Result;
use crate::verification::VerificationRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of notification.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    IdentityVerificationUpdated,
}

/// Object a notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub kind: String,
    pub id: String,
}

/// A notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub notification_type: NotificationType,
    pub recipient_id: String,
    pub action_user_id: String,
    pub item: NotificationItem,
    pub extra: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Tell a subject their verification status changed.
    ///
    /// The subject is both actor and recipient.
    pub fn verification_updated(record: &VerificationRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            notification_type: NotificationType::IdentityVerificationUpdated,
            recipient_id: record.subject_id.clone(),
            action_user_id: record.subject_id.clone(),
            item: NotificationItem {
                kind: "user_verification".to_string(),
                id: record.subject_id.clone(),
            },
            extra: serde_json::json!({ "status": record.status.as_str() }),
            created_at: Utc::now(),
        }
    }
}

/// Hands notifications to the delivery system.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Test doubles for notification dispatch.
pub mod test {
    use super::*;
    use crate::error::IntakeError;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Records every notification it is asked to send.
    ///
    /// Call [`fail_with`](Self::fail_with) to make subsequent sends error.
    #[derive(Clone, Default)]
    pub struct RecordingNotificationDispatcher {
        sent: Arc<Mutex<Vec<Notification>>>,
        failure: Arc<Mutex<Option<String>>>,
    }

    impl RecordingNotificationDispatcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn fail_with(&self, message: impl Into<String>) {
            *self.failure.lock().await = Some(message.into());
        }

        pub async fn sent(&self) -> Vec<Notification> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingNotificationDispatcher {
        async fn send(&self, notification: &Notification) -> Result<()> {
            if let Some(message) = self.failure.lock().await.clone() {
                return Err(IntakeError::service_unavailable(message));
            }
            self.sent.lock().await.push(notification.clone());
            Ok(())
        }
    }
}
