//! Persona identity-verification webhook intake.
//!
//! A delivery is authenticated against the raw body, normalized into a
//! [`VerificationUpdate`](crate::verification::VerificationUpdate) and
//! upserted. Notification and risk tracking run after the upsert commits and
//! cannot fail the acknowledgment.

mod error;
pub mod handler;
mod payload;
mod processor;
pub mod signature;

pub use error::{MalformedPayloadPolicy, WebhookError};
pub use handler::{PersonaWebhookModule, persona_webhook};
pub use payload::PersonaEvent;
pub use processor::{PersonaWebhookProcessor, ProcessedWebhook, SideEffects};
pub use signature::{PersonaSignatureVerifier, SIGNATURE_HEADER, create_digest, parse_signature_header};
