use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chairside_core::{ImageCategory, StorageTier, WireArch, WireStatus};

/// Server-side filters for the image listing.
///
/// `None` fields are not applied. Filters combine with logical AND.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFilter {
    /// Filter by clinical category.
    #[serde(default)]
    pub category: Option<ImageCategory>,
    /// Filter by storage tier (`cold` selects archived images).
    #[serde(default)]
    pub storage_tier: Option<StorageTier>,
    /// Filter by legal-hold presence.
    #[serde(default)]
    pub legal_hold: Option<bool>,
    /// Filter by assigned policy ID.
    #[serde(default)]
    pub policy_id: Option<String>,
    /// Only images with (`true`) or without (`false`) an assigned policy.
    #[serde(default)]
    pub has_policy: Option<bool>,
    /// Captured on or after this instant.
    #[serde(default)]
    pub captured_from: Option<DateTime<Utc>>,
    /// Captured on or before this instant.
    #[serde(default)]
    pub captured_to: Option<DateTime<Utc>>,
}

/// Server-side filters for the policy listing.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyFilter {
    /// Filter by active flag.
    #[serde(default)]
    pub active: Option<bool>,
    /// Only policies applicable to this category.
    #[serde(default)]
    pub category: Option<ImageCategory>,
}

/// Server-side filters for the wire-record listing.
///
/// Patient-name search is deliberately absent: it is applied client-side
/// against the fetched page by the list controller.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFilter {
    #[serde(default)]
    pub arch: Option<WireArch>,
    #[serde(default)]
    pub status: Option<WireStatus>,
}
