//! Identity verification records.
//!
//! A [`VerificationRecord`] is keyed by the subject (local user) id the
//! provider echoes back. Stores apply a [`VerificationUpdate`] as a single
//! atomic create-or-update, so redelivered or reordered webhooks converge on
//! one record per subject.

mod store;
#[cfg(feature = "database")]
mod sea_orm_store;

pub use store::{InMemoryVerificationStore, VerificationStore};
#[cfg(feature = "database")]
pub use sea_orm_store::SeaOrmVerificationStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a verification, as last reported by the provider.
///
/// Every state can move to every other state; the provider is authoritative
/// and no state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Declined,
    Failed,
    MarkedForReview,
}

impl VerificationStatus {
    /// Map a Persona inquiry status to the internal status.
    ///
    /// Matching is exact after lowercasing. Anything unrecognised, and a
    /// missing status, is `Pending`: provider statuses such as `created`,
    /// `expired` or `completed` are not decisions.
    pub fn from_persona(status: Option<&str>) -> Self {
        match status.map(str::to_lowercase).as_deref() {
            Some("approved") => Self::Approved,
            Some("declined") => Self::Declined,
            Some("failed") => Self::Failed,
            Some("marked-for-review") => Self::MarkedForReview,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Declined => "DECLINED",
            Self::Failed => "FAILED",
            Self::MarkedForReview => "MARKED_FOR_REVIEW",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "DECLINED" => Ok(Self::Declined),
            "FAILED" => Ok(Self::Failed),
            "MARKED_FOR_REVIEW" => Ok(Self::MarkedForReview),
            other => Err(format!("unknown verification status: {}", other)),
        }
    }
}

/// Provider that performed the verification.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationMethod {
    Persona,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persona => "PERSONA",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSONA" => Ok(Self::Persona),
            other => Err(format!("unknown verification method: {}", other)),
        }
    }
}

/// The attributes written by one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationUpdate {
    pub subject_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub method: VerificationMethod,
    pub external_id: Option<String>,
    pub status: VerificationStatus,
}

/// Persisted verification state for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub subject_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub method: VerificationMethod,
    /// Provider correlation id (Persona inquiry id).
    pub external_id: Option<String>,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Overwrite every provider-controlled attribute with the update.
    pub(crate) fn apply(&mut self, update: &VerificationUpdate, now: DateTime<Utc>) {
        self.first_name = update.first_name.clone();
        self.last_name = update.last_name.clone();
        self.method = update.method;
        self.external_id = update.external_id.clone();
        self.status = update.status;
        self.updated_at = now;
    }

    pub(crate) fn from_update(update: &VerificationUpdate, now: DateTime<Utc>) -> Self {
        Self {
            subject_id: update.subject_id.clone(),
            first_name: update.first_name.clone(),
            last_name: update.last_name.clone(),
            method: update.method,
            external_id: update.external_id.clone(),
            status: update.status,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_persona_known_values() {
        assert_eq!(
            VerificationStatus::from_persona(Some("approved")),
            VerificationStatus::Approved
        );
        assert_eq!(
            VerificationStatus::from_persona(Some("declined")),
            VerificationStatus::Declined
        );
        assert_eq!(
            VerificationStatus::from_persona(Some("failed")),
            VerificationStatus::Failed
        );
        assert_eq!(
            VerificationStatus::from_persona(Some("marked-for-review")),
            VerificationStatus::MarkedForReview
        );
    }

    #[test]
    fn test_status_from_persona_is_case_insensitive() {
        assert_eq!(
            VerificationStatus::from_persona(Some("APPROVED")),
            VerificationStatus::Approved
        );
        assert_eq!(
            VerificationStatus::from_persona(Some("Marked-For-Review")),
            VerificationStatus::MarkedForReview
        );
    }

    #[test]
    fn test_status_from_persona_defaults_to_pending() {
        assert_eq!(
            VerificationStatus::from_persona(Some("expired")),
            VerificationStatus::Pending
        );
        assert_eq!(
            VerificationStatus::from_persona(Some("completed")),
            VerificationStatus::Pending
        );
        assert_eq!(
            VerificationStatus::from_persona(Some("marked_for_review")),
            VerificationStatus::Pending
        );
        assert_eq!(
            VerificationStatus::from_persona(Some("")),
            VerificationStatus::Pending
        );
        assert_eq!(VerificationStatus::from_persona(None), VerificationStatus::Pending);
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            VerificationStatus::Pending,
            VerificationStatus::Approved,
            VerificationStatus::Declined,
            VerificationStatus::Failed,
            VerificationStatus::MarkedForReview,
        ] {
            assert_eq!(status.as_str().parse::<VerificationStatus>(), Ok(status));
        }
        assert!("approved".parse::<VerificationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_like_display() {
        let json = serde_json::to_value(VerificationStatus::MarkedForReview).unwrap();
        assert_eq!(json, serde_json::json!("MARKED_FOR_REVIEW"));
    }

    #[test]
    fn test_apply_keeps_created_at() {
        let created = Utc::now();
        let update = VerificationUpdate {
            subject_id: "42".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            method: VerificationMethod::Persona,
            external_id: Some("inq_1".to_string()),
            status: VerificationStatus::Approved,
        };
        let mut record = VerificationRecord::from_update(&update, created);

        let later = created + chrono::Duration::seconds(5);
        let second = VerificationUpdate {
            status: VerificationStatus::Declined,
            last_name: Some("Lovelace".to_string()),
            ..update
        };
        record.apply(&second, later);

        assert_eq!(record.created_at, created);
        assert_eq!(record.updated_at, later);
        assert_eq!(record.status, VerificationStatus::Declined);
        assert_eq!(record.last_name.as_deref(), Some("Lovelace"));
    }
}
