//! idv-intake - Identity-verification webhook intake
//!
//! Receives Persona inquiry webhooks, authenticates them against the raw
//! body, and applies them as an idempotent upsert on the subject's
//! verification record. Notification and risk tracking run after the record
//! is persisted and never fail the acknowledgment.
//!
//! The [`feed`] module propagates purchase and grant application changes to
//! the feed read model as deferred refresh tasks.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use idv_intake::{App, AppContext, ConfigBuilder};
//! use idv_intake::webhooks::PersonaWebhookModule;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     idv_intake::init_tracing_with_config(&config);
//!
//!     let app = App::builder()
//!         .with_config(config.clone())
//!         .with_context(AppContext::new())
//!         .register_module(PersonaWebhookModule::new(config.persona.webhook_path.clone()))
//!         .build();
//!
//!     app.serve().await?;
//!     Ok(())
//! }
//! ```

mod app;
mod config;
mod core;
mod error;
pub mod feed;
pub mod health;
mod http;
mod middleware;
pub mod notifications;
pub mod risk;
pub mod testing;
mod utils;
pub mod verification;
pub mod webhooks;

// Re-exports for public API
pub use app::{AppContext, AppContextBuilder};
pub use config::{
    Config, ConfigBuilder, DatabaseConfig, LoggingConfig, PersonaConfig, RiskConfig, ServerConfig,
};
pub use core::{App, AppBuilder};
pub use error::{ErrorResponse, IntakeError, Result};
pub use health::{ComponentHealth, HealthCheck, HealthChecker, HealthStatus};
pub use http::{MessageResponse, RouteModule};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "idv_intake=debug")
/// - `IDV_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("IDV_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize tracing from the logging section of the config
///
/// `RUST_LOG`, when set, still overrides the configured level.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
