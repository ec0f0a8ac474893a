//! Configuration loading from the environment

use idv_intake::ConfigBuilder;
use idv_intake::webhooks::MalformedPayloadPolicy;
use secrecy::ExposeSecret;

// Single test: the process environment is shared across test threads.
#[test]
fn test_from_env() {
    unsafe {
        std::env::set_var("IDV_PORT", "9100");
        std::env::set_var("IDV_LOG_LEVEL", "debug");
        std::env::set_var("IDV_LOG_JSON", "true");
        std::env::set_var("IDV_PERSONA_WEBHOOK_SECRET", "wbhsec_env");
        std::env::set_var("IDV_PERSONA_WEBHOOK_PATH", "/hooks/persona");
        std::env::set_var("IDV_PERSONA_MALFORMED_POLICY", "reject");
        std::env::set_var("IDV_SIFT_API_KEY", "sift_env");
    }

    let config = ConfigBuilder::new().from_env().build().unwrap();

    assert_eq!(config.server.port, 9100);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert_eq!(
        config.persona.webhook_secret.as_ref().unwrap().expose_secret(),
        "wbhsec_env"
    );
    assert_eq!(config.persona.webhook_path, "/hooks/persona");
    assert_eq!(config.persona.malformed_policy, MalformedPayloadPolicy::Reject);
    assert_eq!(config.risk.sift_api_key.as_ref().unwrap().expose_secret(), "sift_env");

    // Secrets never leak through Debug
    let debug = format!("{:?}", config);
    assert!(!debug.contains("wbhsec_env"));
    assert!(!debug.contains("sift_env"));

    unsafe {
        std::env::set_var("IDV_PERSONA_MALFORMED_POLICY", "drop-it");
        std::env::remove_var("IDV_PERSONA_WEBHOOK_SECRET");
    }

    let err = ConfigBuilder::new().from_env().build().unwrap_err();
    assert!(err.to_string().contains("Persona webhook secret is required"));

    let config = ConfigBuilder::new()
        .from_env()
        .with_webhook_secret("explicit")
        .build()
        .unwrap();
    assert_eq!(config.persona.malformed_policy, MalformedPayloadPolicy::Retry);

    unsafe {
        for key in [
            "IDV_PORT",
            "IDV_LOG_LEVEL",
            "IDV_LOG_JSON",
            "IDV_PERSONA_WEBHOOK_PATH",
            "IDV_PERSONA_MALFORMED_POLICY",
            "IDV_SIFT_API_KEY",
        ] {
            std::env::remove_var(key);
        }
    }
}
