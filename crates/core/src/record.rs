use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle action captured by an [`ArchiveRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArchiveAction {
    Archived,
    Restored,
    Deleted,
    LegalHoldSet,
    LegalHoldRemoved,
    RetentionExtended,
}

impl ArchiveAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Archived => "ARCHIVED",
            Self::Restored => "RESTORED",
            Self::Deleted => "DELETED",
            Self::LegalHoldSet => "LEGAL_HOLD_SET",
            Self::LegalHoldRemoved => "LEGAL_HOLD_REMOVED",
            Self::RetentionExtended => "RETENTION_EXTENDED",
        }
    }
}

impl std::fmt::Display for ArchiveAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable audit entry produced whenever an image transitions state.
///
/// Records are append-only; nothing in the system mutates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    /// Unique identifier for this record.
    pub id: String,
    /// The affected image.
    pub image_id: String,
    /// File name snapshot, so history stays readable after deletion.
    pub file_name: String,
    /// What happened.
    pub action: ArchiveAction,
    /// Identity of the acting user.
    pub actor: String,
    /// Free-text reason supplied with the action, if any.
    #[serde(default)]
    pub reason: Option<String>,
    /// When the action occurred.
    pub occurred_at: DateTime<Utc>,
}

impl ArchiveRecord {
    /// Create a record for an action happening now.
    #[must_use]
    pub fn new(
        image_id: impl Into<String>,
        file_name: impl Into<String>,
        action: ArchiveAction,
        actor: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            image_id: image_id.into(),
            file_name: file_name.into(),
            action,
            actor: actor.into(),
            reason,
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_screaming_snake() {
        let json = serde_json::to_string(&ArchiveAction::LegalHoldSet).unwrap();
        assert_eq!(json, "\"LEGAL_HOLD_SET\"");
        let back: ArchiveAction = serde_json::from_str("\"RETENTION_EXTENDED\"").unwrap();
        assert_eq!(back, ArchiveAction::RetentionExtended);
    }

    #[test]
    fn record_carries_reason_and_actor() {
        let record = ArchiveRecord::new(
            "img_123",
            "pan-001.dcm",
            ArchiveAction::Restored,
            "dr.wells",
            Some("Patient requested copies".into()),
        );
        assert_eq!(record.action, ArchiveAction::Restored);
        assert_eq!(record.actor, "dr.wells");
        assert_eq!(record.reason.as_deref(), Some("Patient requested copies"));
        assert!(!record.id.is_empty());
    }
}
