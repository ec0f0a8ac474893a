use axum::Router;
use std::sync::Arc;

use crate::config::Config;
use crate::core::App;
use crate::app::AppContext;
use crate::notifications::test::RecordingNotificationDispatcher;
use crate::risk::test::RecordingRiskScorer;
use crate::verification::{InMemoryVerificationStore, VerificationStore};
use crate::webhooks::{
    MalformedPayloadPolicy, PersonaSignatureVerifier, PersonaWebhookModule, PersonaWebhookProcessor,
};

/// Webhook secret the harness verifies against.
pub const TEST_SECRET: &str = "wbhsec_test_harness";

/// Fully wired application backed by in-memory and recording collaborators.
pub struct TestHarness {
    pub store: InMemoryVerificationStore,
    pub notifications: RecordingNotificationDispatcher,
    pub risk: RecordingRiskScorer,
    policy: MalformedPayloadPolicy,
    store_override: Option<Arc<dyn VerificationStore>>,
    config: Config,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            store: InMemoryVerificationStore::new(),
            notifications: RecordingNotificationDispatcher::new(),
            risk: RecordingRiskScorer::new(),
            policy: MalformedPayloadPolicy::default(),
            store_override: None,
            config: Config::default(),
        }
    }

    pub fn with_policy(mut self, policy: MalformedPayloadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Persist through `store` instead of the in-memory store.
    pub fn with_store(mut self, store: Arc<dyn VerificationStore>) -> Self {
        self.store_override = Some(store);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> AppContext {
        let store: Arc<dyn VerificationStore> = self
            .store_override
            .clone()
            .unwrap_or_else(|| Arc::new(self.store.clone()));

        let processor = PersonaWebhookProcessor::new(
            PersonaSignatureVerifier::new(TEST_SECRET),
            store.clone(),
            Arc::new(self.notifications.clone()),
            Arc::new(self.risk.clone()),
        );

        AppContext::builder()
            .with_persona_webhook(Arc::new(processor))
            .with_verification_store(store)
            .with_malformed_payload_policy(self.policy)
            .build()
    }

    /// Router serving `/health` and the webhook at the configured path.
    ///
    /// Each call shares the same collaborators, so state persists across
    /// routers built from one harness.
    pub fn router(&self) -> Router {
        App::builder()
            .with_config(self.config.clone())
            .with_context(self.context())
            .register_module(PersonaWebhookModule::new(
                self.config.persona.webhook_path.clone(),
            ))
            .build()
            .into_test_router()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
