use std::sync::Arc;

use super::error::WebhookError;
use super::payload::PersonaEvent;
use super::signature::PersonaSignatureVerifier;
use crate::notifications::{Notification, NotificationDispatcher};
use crate::risk::{RequestMeta, RiskScorer};
use crate::verification::{VerificationRecord, VerificationStore};

/// Outcome of the post-commit side effects.
///
/// Failures here are logged and reported, never surfaced to Persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideEffects {
    pub notified: bool,
    pub risk_tracked: bool,
}

/// A delivery that was authenticated and persisted.
#[derive(Debug, Clone)]
pub struct ProcessedWebhook {
    pub record: VerificationRecord,
    pub side_effects: SideEffects,
}

/// Persona webhook pipeline.
///
/// Steps run in order: signature check on the raw bytes, JSON parse, field
/// extraction, upsert keyed on the subject id, then notification and risk
/// tracking. Nothing is parsed or written before the signature passes.
pub struct PersonaWebhookProcessor {
    verifier: PersonaSignatureVerifier,
    store: Arc<dyn VerificationStore>,
    notifications: Arc<dyn NotificationDispatcher>,
    risk: Arc<dyn RiskScorer>,
}

impl PersonaWebhookProcessor {
    pub fn new(
        verifier: PersonaSignatureVerifier,
        store: Arc<dyn VerificationStore>,
        notifications: Arc<dyn NotificationDispatcher>,
        risk: Arc<dyn RiskScorer>,
    ) -> Self {
        Self {
            verifier,
            store,
            notifications,
            risk,
        }
    }

    pub async fn process(
        &self,
        signature: Option<&str>,
        body: &[u8],
        request: &RequestMeta,
    ) -> Result<ProcessedWebhook, WebhookError> {
        let signature = signature.ok_or(WebhookError::MissingSignature)?;
        if !self.verifier.verify(body, signature) {
            return Err(WebhookError::InvalidSignature);
        }

        let event = PersonaEvent::parse(body)?;
        let update = event.to_update()?;

        let record = self
            .store
            .upsert(&update)
            .await
            .map_err(|source| WebhookError::Persistence {
                subject_id: update.subject_id.clone(),
                source,
            })?;

        tracing::info!(
            subject_id = %record.subject_id,
            inquiry_id = ?record.external_id,
            status = %record.status,
            "Verification updated from Persona webhook"
        );

        let side_effects = self.dispatch_side_effects(&record, request).await;

        Ok(ProcessedWebhook {
            record,
            side_effects,
        })
    }

    /// Run each side effect independently of the others.
    async fn dispatch_side_effects(
        &self,
        record: &VerificationRecord,
        request: &RequestMeta,
    ) -> SideEffects {
        let notification = Notification::verification_updated(record);

        let (notified, tracked) = tokio::join!(
            self.notifications.send(&notification),
            self.risk.track_and_score(&record.subject_id, request),
        );

        let notified = match notified {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    subject_id = %record.subject_id,
                    notification_id = %notification.id,
                    error = %e,
                    "Failed to send verification notification"
                );
                false
            }
        };

        let risk_tracked = match tracked {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    subject_id = %record.subject_id,
                    error = %e,
                    "Failed to track account with risk scorer"
                );
                false
            }
        };

        SideEffects {
            notified,
            risk_tracked,
        }
    }
}
