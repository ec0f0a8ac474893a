//! Persona webhook fixtures.

use serde_json::{Value, json};

use crate::webhooks::create_digest;

/// Timestamp used when a test does not care which one is signed.
pub const FIXED_TIMESTAMP: &str = "1700000000";

/// `Persona-Signature` value for `body`, signed at [`FIXED_TIMESTAMP`].
pub fn signature_header(secret: &str, body: &[u8]) -> String {
    signed_header(secret, FIXED_TIMESTAMP, body)
}

/// `Persona-Signature` value for `body`, signed at `timestamp`.
pub fn signed_header(secret: &str, timestamp: &str, body: &[u8]) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        create_digest(secret.as_bytes(), timestamp, body)
    )
}

/// Builder for Persona inquiry webhook bodies.
///
/// Fields left unset are omitted from the JSON, not sent as null.
#[derive(Debug, Clone, Default)]
pub struct InquiryEvent {
    inquiry_id: Option<String>,
    status: Option<String>,
    reference_id: Option<Value>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl InquiryEvent {
    pub fn new() -> Self {
        Self {
            inquiry_id: Some("inq_test".to_string()),
            ..Self::default()
        }
    }

    pub fn inquiry_id(mut self, id: impl Into<String>) -> Self {
        self.inquiry_id = Some(id.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn reference_id(mut self, id: impl Into<Value>) -> Self {
        self.reference_id = Some(id.into());
        self
    }

    pub fn name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut attributes = serde_json::Map::new();
        if let Some(status) = &self.status {
            attributes.insert("status".into(), json!(status));
        }
        if let Some(reference_id) = &self.reference_id {
            attributes.insert("reference-id".into(), reference_id.clone());
        }
        if let Some(first) = &self.first_name {
            attributes.insert("name-first".into(), json!(first));
        }
        if let Some(last) = &self.last_name {
            attributes.insert("name-last".into(), json!(last));
        }

        let mut inquiry = json!({"type": "inquiry", "attributes": attributes});
        if let Some(id) = &self.inquiry_id {
            inquiry["id"] = json!(id);
        }

        json!({
            "data": {
                "type": "event",
                "attributes": {
                    "name": format!("inquiry.{}", self.status.as_deref().unwrap_or("created")),
                    "payload": {"data": inquiry}
                }
            }
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.to_json()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhooks::{PersonaEvent, PersonaSignatureVerifier};

    #[test]
    fn test_inquiry_event_is_extractable() {
        let bytes = InquiryEvent::new()
            .status("approved")
            .reference_id("42")
            .name("Ada", "Lovelace")
            .to_bytes();

        let event = PersonaEvent::parse(&bytes).unwrap();
        assert_eq!(event.reference_id().as_deref(), Some("42"));
        assert_eq!(event.first_name(), Some("Ada"));
        assert_eq!(event.inquiry_id(), Some("inq_test"));
    }

    #[test]
    fn test_signature_header_verifies() {
        let body = InquiryEvent::new().to_bytes();
        let verifier = PersonaSignatureVerifier::new("secret");
        assert!(verifier.verify(&body, &signature_header("secret", &body)));
    }
}
