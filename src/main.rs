use std::sync::Arc;

use anyhow::Context;
use idv_intake::notifications::LogNotificationDispatcher;
use idv_intake::risk::{NoopRiskScorer, RiskScorer, SiftRiskScorer};
use idv_intake::verification::{InMemoryVerificationStore, VerificationStore};
use idv_intake::webhooks::{PersonaSignatureVerifier, PersonaWebhookModule, PersonaWebhookProcessor};
use idv_intake::{App, AppContext, Config, ConfigBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigBuilder::new()
        .from_env()
        .build()
        .context("invalid configuration")?;

    idv_intake::init_tracing_with_config(&config);

    let store = verification_store(&config).await?;
    let risk: Arc<dyn RiskScorer> = match SiftRiskScorer::from_config(&config.risk) {
        Some(sift) => {
            tracing::info!(endpoint = %config.risk.sift_endpoint, "Sift risk scoring enabled");
            Arc::new(sift)
        }
        None => {
            tracing::warn!("No Sift API key configured, risk scoring disabled");
            Arc::new(NoopRiskScorer)
        }
    };

    let secret = config
        .persona
        .webhook_secret
        .clone()
        .context("Persona webhook secret is required")?;

    let processor = PersonaWebhookProcessor::new(
        PersonaSignatureVerifier::new(secret),
        store.clone(),
        Arc::new(LogNotificationDispatcher),
        risk,
    );

    let context = AppContext::builder()
        .with_persona_webhook(Arc::new(processor))
        .with_verification_store(store)
        .with_malformed_payload_policy(config.persona.malformed_policy)
        .build();

    tracing::info!(
        path = %config.persona.webhook_path,
        malformed_policy = %config.persona.malformed_policy,
        "Persona webhook endpoint registered"
    );

    App::builder()
        .with_config(config.clone())
        .with_context(context)
        .register_module(PersonaWebhookModule::new(config.persona.webhook_path.clone()))
        .build()
        .serve()
        .await?;

    Ok(())
}

#[cfg(feature = "database")]
async fn verification_store(config: &Config) -> anyhow::Result<Arc<dyn VerificationStore>> {
    use idv_intake::verification::SeaOrmVerificationStore;

    let Some(url) = config.database.url.as_deref() else {
        tracing::warn!("No DATABASE_URL configured, verifications are kept in memory");
        return Ok(Arc::new(InMemoryVerificationStore::new()));
    };

    let db = sea_orm::Database::connect(url)
        .await
        .context("failed to connect to database")?;
    let store = SeaOrmVerificationStore::new(db);
    store
        .create_table()
        .await
        .context("failed to create user_verifications table")?;

    tracing::info!("Using database verification store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "database"))]
async fn verification_store(_config: &Config) -> anyhow::Result<Arc<dyn VerificationStore>> {
    tracing::warn!("Built without database support, verifications are kept in memory");
    Ok(Arc::new(InMemoryVerificationStore::new()))
}
