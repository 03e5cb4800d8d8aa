use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, FieldError};
use crate::image::ImageCategory;

/// Lower bound for a policy's retention period, in years.
pub const MIN_RETENTION_YEARS: u32 = 1;
/// Upper bound for a policy's retention period, in years.
pub const MAX_RETENTION_YEARS: u32 = 100;

/// A named retention rule set governing how long images are kept before
/// they become eligible for archival and eventual deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    /// Unique identifier (UUID v4, assigned on creation).
    pub id: String,
    /// Display name, unique across policies.
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether this is the practice-wide default policy.
    ///
    /// At most one policy may be default; the server clears the previous
    /// default when a new one is set.
    #[serde(default)]
    pub is_default: bool,
    /// Whether the policy is currently active.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Image categories this policy applies to. Empty means all categories.
    #[serde(default)]
    pub categories: Vec<ImageCategory>,
    /// Years an image must be retained after capture.
    pub retention_years: u32,
    /// Additional retention years when the patient was a minor at capture.
    #[serde(default)]
    pub minor_extension_years: Option<u32>,
    /// Years after capture at which an image becomes archive-eligible.
    ///
    /// Must be strictly less than `retention_years` when set.
    #[serde(default)]
    pub archive_after_years: Option<u32>,
    /// Days of advance notice before an image is archived (1..=365).
    #[serde(default)]
    pub notify_before_archive_days: Option<u32>,
    /// Push the retention window forward from the last access instead of
    /// the capture date.
    #[serde(default)]
    pub auto_extend_on_access: bool,
    /// When this policy was created.
    pub created_at: DateTime<Utc>,
    /// When this policy was last updated.
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl RetentionPolicy {
    /// Whether this policy covers the given category.
    ///
    /// An empty category list means the policy applies to every category.
    #[must_use]
    pub fn applies_to(&self, category: ImageCategory) -> bool {
        self.categories.is_empty() || self.categories.contains(&category)
    }

    /// Whether this policy covers all image categories.
    #[must_use]
    pub fn applies_to_all(&self) -> bool {
        self.categories.is_empty()
    }

    /// Validate the numeric invariants of this policy.
    ///
    /// Mirrors the client-side form validation so the server rejects a
    /// bad payload even when it bypassed the form.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if !(MIN_RETENTION_YEARS..=MAX_RETENTION_YEARS).contains(&self.retention_years) {
            errors.push(FieldError::new(
                "retentionYears",
                format!(
                    "Retention period must be between {MIN_RETENTION_YEARS} and {MAX_RETENTION_YEARS} years"
                ),
            ));
        }
        if let Some(archive_after) = self.archive_after_years
            && archive_after >= self.retention_years
        {
            errors.push(FieldError::new(
                "archiveAfterYears",
                "Archive threshold must be less than the retention period",
            ));
        }
        if let Some(days) = self.notify_before_archive_days
            && !(1..=365).contains(&days)
        {
            errors.push(FieldError::new(
                "notifyBeforeArchiveDays",
                "Notification lead time must be between 1 and 365 days",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }

    /// Effective retention period for an image, in years.
    #[must_use]
    pub fn effective_retention_years(&self, patient_minor: bool) -> u32 {
        let extension = if patient_minor {
            self.minor_extension_years.unwrap_or(0)
        } else {
            0
        };
        self.retention_years.saturating_add(extension)
    }
}
