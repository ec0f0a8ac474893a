use std::sync::Arc;

use crate::error::{IntakeError, Result};
use crate::verification::VerificationStore;
use crate::webhooks::{MalformedPayloadPolicy, PersonaWebhookProcessor};

/// Application context shared by every handler
///
/// Holds the webhook pipeline and the verification store. Collaborators are
/// optional so tests can build a context with only what they exercise.
#[derive(Clone, Default)]
pub struct AppContext {
    pub persona_webhook: Option<Arc<PersonaWebhookProcessor>>,

    pub verifications: Option<Arc<dyn VerificationStore>>,

    /// Response policy for authentic but unusable webhook bodies
    pub malformed_payload_policy: MalformedPayloadPolicy,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern for constructing AppContext
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    /// Get the Persona webhook processor, returning an error if not configured
    pub fn persona_webhook(&self) -> Result<&Arc<PersonaWebhookProcessor>> {
        self.persona_webhook
            .as_ref()
            .ok_or_else(|| IntakeError::internal("Persona webhook processor not configured"))
    }

    /// Get the verification store, returning an error if not configured
    pub fn verifications(&self) -> Result<&Arc<dyn VerificationStore>> {
        self.verifications
            .as_ref()
            .ok_or_else(|| IntakeError::internal("Verification store not configured"))
    }

    /// Get the verification store as an Option
    pub fn verifications_opt(&self) -> Option<&Arc<dyn VerificationStore>> {
        self.verifications.as_ref()
    }

    pub fn malformed_payload_policy(&self) -> MalformedPayloadPolicy {
        self.malformed_payload_policy
    }
}

/// Builder for AppContext with fluent API
#[must_use = "builder does nothing until you call build()"]
#[derive(Default)]
pub struct AppContextBuilder {
    persona_webhook: Option<Arc<PersonaWebhookProcessor>>,
    verifications: Option<Arc<dyn VerificationStore>>,
    malformed_payload_policy: MalformedPayloadPolicy,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_persona_webhook(mut self, processor: Arc<PersonaWebhookProcessor>) -> Self {
        self.persona_webhook = Some(processor);
        self
    }

    pub fn with_verification_store(mut self, store: Arc<dyn VerificationStore>) -> Self {
        self.verifications = Some(store);
        self
    }

    pub fn with_malformed_payload_policy(mut self, policy: MalformedPayloadPolicy) -> Self {
        self.malformed_payload_policy = policy;
        self
    }

    pub fn build(self) -> AppContext {
        AppContext {
            persona_webhook: self.persona_webhook,
            verifications: self.verifications,
            malformed_payload_policy: self.malformed_payload_policy,
        }
    }
}
