use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppContext;
use crate::verification::VerificationStore;

/// Health check status
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result for a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status_code, Json(self)).into_response()
    }
}

/// Trait for implementing health checks
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;
    fn check(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ComponentHealth> + Send + '_>>;
}

/// Reports whether the webhook pipeline is wired up.
struct WebhookConfiguredCheck {
    configured: bool,
}

impl HealthCheck for WebhookConfiguredCheck {
    fn name(&self) -> &str {
        "persona_webhook"
    }

    fn check(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ComponentHealth> + Send + '_>> {
        Box::pin(async {
            let (status, message) = if self.configured {
                (HealthStatus::Healthy, "Webhook processor configured")
            } else {
                (HealthStatus::Unhealthy, "Webhook processor not configured")
            };
            ComponentHealth {
                name: self.name().to_string(),
                status,
                message: Some(message.to_string()),
            }
        })
    }
}

/// Probes the verification store with a read.
pub struct VerificationStoreCheck {
    store: Arc<dyn VerificationStore>,
}

impl VerificationStoreCheck {
    pub fn new(store: Arc<dyn VerificationStore>) -> Self {
        Self { store }
    }
}

impl HealthCheck for VerificationStoreCheck {
    fn name(&self) -> &str {
        "verification_store"
    }

    fn check(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ComponentHealth> + Send + '_>> {
        Box::pin(async {
            match self.store.get("__health_check__").await {
                Ok(_) => ComponentHealth {
                    name: self.name().to_string(),
                    status: HealthStatus::Healthy,
                    message: None,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Verification store health check failed");
                    ComponentHealth {
                        name: self.name().to_string(),
                        status: HealthStatus::Unhealthy,
                        message: Some("Verification store unreachable".to_string()),
                    }
                }
            }
        })
    }
}

/// Health check manager that runs all registered checks
#[derive(Default)]
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks for everything the context provides.
    pub fn for_context(ctx: &AppContext) -> Self {
        let mut checker = Self::new().with_check(Arc::new(WebhookConfiguredCheck {
            configured: ctx.persona_webhook.is_some(),
        }));
        if let Some(store) = ctx.verifications_opt() {
            checker = checker.with_check(Arc::new(VerificationStoreCheck::new(store.clone())));
        }
        checker
    }

    pub fn with_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub async fn check_health(&self) -> HealthResponse {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        for check in &self.checks {
            let result = check.check().await;

            match result.status {
                HealthStatus::Unhealthy => overall_status = HealthStatus::Unhealthy,
                HealthStatus::Degraded if overall_status == HealthStatus::Healthy => {
                    overall_status = HealthStatus::Degraded
                }
                _ => {}
            }

            checks.push(result);
        }

        HealthResponse {
            status: overall_status,
            checks,
        }
    }
}

/// Handler for the health endpoint
pub async fn health_handler(State(ctx): State<AppContext>) -> HealthResponse {
    HealthChecker::for_context(&ctx).check_health().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IntakeError, Result};
    use crate::verification::{InMemoryVerificationStore, VerificationRecord, VerificationUpdate};
    use async_trait::async_trait;

    struct DownStore;

    #[async_trait]
    impl VerificationStore for DownStore {
        async fn upsert(&self, _update: &VerificationUpdate) -> Result<VerificationRecord> {
            Err(IntakeError::service_unavailable("down"))
        }

        async fn get(&self, _subject_id: &str) -> Result<Option<VerificationRecord>> {
            Err(IntakeError::service_unavailable("down"))
        }
    }

    #[tokio::test]
    async fn test_unconfigured_context_is_unhealthy() {
        let response = HealthChecker::for_context(&AppContext::new()).check_health().await;
        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert_eq!(response.checks.len(), 1);
    }

    #[tokio::test]
    async fn test_store_check() {
        let healthy = VerificationStoreCheck::new(Arc::new(InMemoryVerificationStore::new()));
        assert_eq!(healthy.check().await.status, HealthStatus::Healthy);

        let down = VerificationStoreCheck::new(Arc::new(DownStore));
        assert_eq!(down.check().await.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_unhealthy_maps_to_503() {
        let response = HealthResponse {
            status: HealthStatus::Unhealthy,
            checks: vec![],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
