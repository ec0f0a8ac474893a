//! Persona inquiry webhook payload.
//!
//! Persona nests the inquiry under `data.attributes.payload.data`. Only the
//! fields below are read; everything else in the event is ignored. Any level
//! of the path may be missing, null, or the wrong JSON type, in which case
//! the field is absent.

use serde_json::Value;

use super::error::WebhookError;
use crate::verification::{VerificationMethod, VerificationStatus, VerificationUpdate};

const INQUIRY_PATH: [&str; 4] = ["data", "attributes", "payload", "data"];

/// Parsed Persona webhook event.
#[derive(Debug, Clone)]
pub struct PersonaEvent {
    body: Value,
}

impl PersonaEvent {
    /// Parse the raw request body.
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let body = serde_json::from_slice(body)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;
        Ok(Self { body })
    }

    pub fn from_value(body: Value) -> Self {
        Self { body }
    }

    /// The inquiry object the event is about.
    fn inquiry(&self) -> Option<&Value> {
        walk(&self.body, &INQUIRY_PATH)
    }

    fn inquiry_attribute(&self, key: &str) -> Option<&Value> {
        walk(self.inquiry()?, &["attributes", key])
    }

    /// Persona inquiry status (`approved`, `declined`, ...).
    pub fn status(&self) -> Option<&str> {
        self.inquiry_attribute("status").and_then(Value::as_str)
    }

    /// Local subject id echoed back by Persona.
    ///
    /// Integer ids are accepted and rendered in decimal. Blank strings count
    /// as absent.
    pub fn reference_id(&self) -> Option<String> {
        match self.inquiry_attribute("reference-id")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        self.inquiry_attribute("name-first").and_then(Value::as_str)
    }

    pub fn last_name(&self) -> Option<&str> {
        self.inquiry_attribute("name-last").and_then(Value::as_str)
    }

    /// Persona inquiry id, kept as the external correlation id.
    pub fn inquiry_id(&self) -> Option<&str> {
        self.inquiry()
            .and_then(|inquiry| inquiry.get("id"))
            .and_then(Value::as_str)
    }

    pub fn verification_status(&self) -> VerificationStatus {
        VerificationStatus::from_persona(self.status())
    }

    /// Build the record update this event describes.
    ///
    /// Fails only when there is no reference id to key the record on.
    pub fn to_update(&self) -> Result<VerificationUpdate, WebhookError> {
        let subject_id = self.reference_id().ok_or_else(|| WebhookError::MissingReferenceId {
            inquiry_id: self.inquiry_id().map(String::from),
        })?;

        Ok(VerificationUpdate {
            subject_id,
            first_name: self.first_name().map(String::from),
            last_name: self.last_name().map(String::from),
            method: VerificationMethod::Persona,
            external_id: self.inquiry_id().map(String::from),
            status: self.verification_status(),
        })
    }
}

/// Follow object keys, stopping at the first missing key or non-object.
fn walk<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
        .filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(attributes: Value) -> PersonaEvent {
        PersonaEvent::from_value(json!({
            "data": {
                "attributes": {
                    "name": "inquiry.approved",
                    "payload": {
                        "data": {
                            "type": "inquiry",
                            "id": "inq_1",
                            "attributes": attributes
                        }
                    }
                }
            }
        }))
    }

    #[test]
    fn test_extracts_all_fields() {
        let ev = event(json!({
            "status": "approved",
            "reference-id": "42",
            "name-first": "Ada",
            "name-last": "Lovelace"
        }));

        assert_eq!(ev.status(), Some("approved"));
        assert_eq!(ev.reference_id().as_deref(), Some("42"));
        assert_eq!(ev.first_name(), Some("Ada"));
        assert_eq!(ev.last_name(), Some("Lovelace"));
        assert_eq!(ev.inquiry_id(), Some("inq_1"));
        assert_eq!(ev.verification_status(), VerificationStatus::Approved);
    }

    #[test]
    fn test_to_update() {
        let ev = event(json!({
            "status": "declined",
            "reference-id": "42",
            "name-first": "Ada"
        }));

        let update = ev.to_update().unwrap();
        assert_eq!(update.subject_id, "42");
        assert_eq!(update.first_name.as_deref(), Some("Ada"));
        assert_eq!(update.last_name, None);
        assert_eq!(update.method, VerificationMethod::Persona);
        assert_eq!(update.external_id.as_deref(), Some("inq_1"));
        assert_eq!(update.status, VerificationStatus::Declined);
    }

    #[test]
    fn test_numeric_reference_id() {
        let ev = event(json!({"reference-id": 42}));
        assert_eq!(ev.reference_id().as_deref(), Some("42"));
    }

    #[test]
    fn test_unusable_reference_ids() {
        for value in [json!(null), json!(""), json!("   "), json!(4.2), json!(["42"]), json!({})] {
            let ev = event(json!({"reference-id": value}));
            assert_eq!(ev.reference_id(), None, "accepted {}", value);
        }
    }

    #[test]
    fn test_missing_reference_id_is_an_error() {
        let err = event(json!({"status": "approved"})).to_update().unwrap_err();
        assert!(matches!(
            err,
            WebhookError::MissingReferenceId { inquiry_id: Some(ref id) } if id == "inq_1"
        ));
    }

    #[test]
    fn test_missing_or_wrong_status_is_pending() {
        assert_eq!(event(json!({})).verification_status(), VerificationStatus::Pending);
        assert_eq!(event(json!({"status": null})).verification_status(), VerificationStatus::Pending);
        assert_eq!(event(json!({"status": 7})).verification_status(), VerificationStatus::Pending);
        assert_eq!(event(json!({"status": "completed"})).verification_status(), VerificationStatus::Pending);
    }

    #[test]
    fn test_wrong_types_along_path_are_absent() {
        let shapes = [
            json!({}),
            json!([]),
            json!("inquiry"),
            json!({"data": null}),
            json!({"data": {"attributes": "x"}}),
            json!({"data": {"attributes": {"payload": []}}}),
            json!({"data": {"attributes": {"payload": {"data": {"attributes": 5}}}}}),
        ];

        for body in shapes {
            let ev = PersonaEvent::from_value(body.clone());
            assert_eq!(ev.status(), None, "status from {}", body);
            assert_eq!(ev.reference_id(), None, "reference id from {}", body);
            assert_eq!(ev.first_name(), None);
            assert_eq!(ev.inquiry_id(), None);
        }
    }

    #[test]
    fn test_non_string_names_are_absent() {
        let ev = event(json!({"reference-id": "1", "name-first": 12, "name-last": false}));
        let update = ev.to_update().unwrap();
        assert_eq!(update.first_name, None);
        assert_eq!(update.last_name, None);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(
            PersonaEvent::parse(b"not json"),
            Err(WebhookError::MalformedPayload(_))
        ));
        assert!(PersonaEvent::parse(b"{}").is_ok());
    }
}
