use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a captured clinical asset.
///
/// The label mapping lives on the enum itself so that adding a category is a
/// compile-enforced exercise rather than a silently missing lookup-table
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCategory {
    ExtraoralPhoto,
    IntraoralPhoto,
    PanoramicXray,
    CephalometricXray,
    PeriapicalXray,
    Cbct,
    Model3d,
    Other,
}

impl ImageCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 8] = [
        Self::ExtraoralPhoto,
        Self::IntraoralPhoto,
        Self::PanoramicXray,
        Self::CephalometricXray,
        Self::PeriapicalXray,
        Self::Cbct,
        Self::Model3d,
        Self::Other,
    ];

    /// Wire string used in query parameters and JSON payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExtraoralPhoto => "extraoral_photo",
            Self::IntraoralPhoto => "intraoral_photo",
            Self::PanoramicXray => "panoramic_xray",
            Self::CephalometricXray => "cephalometric_xray",
            Self::PeriapicalXray => "periapical_xray",
            Self::Cbct => "cbct",
            Self::Model3d => "model_3d",
            Self::Other => "other",
        }
    }

    /// Human-readable display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ExtraoralPhoto => "Extraoral Photo",
            Self::IntraoralPhoto => "Intraoral Photo",
            Self::PanoramicXray => "Panoramic X-Ray",
            Self::CephalometricXray => "Cephalometric X-Ray",
            Self::PeriapicalXray => "Periapical X-Ray",
            Self::Cbct => "CBCT",
            Self::Model3d => "3D Scan",
            Self::Other => "Other",
        }
    }

    /// Parse a wire string back into a category.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage tier an image currently lives in.
///
/// Hot storage is immediately retrievable; cold storage is the archived
/// tier with slower, cheaper retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTier {
    Hot,
    Cold,
}

impl StorageTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Cold => "cold",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hot" => Some(Self::Hot),
            "cold" => Some(Self::Cold),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal hold details attached to an image.
///
/// Presence of this struct is the hold: an image with `legal_hold` set must
/// never be archived or deleted, regardless of policy expiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalHold {
    /// Why the hold was placed. Always non-empty.
    pub reason: String,
    /// Identity of the user who set the hold.
    pub set_by: String,
    /// When the hold was set.
    pub set_at: DateTime<Utc>,
}

/// A captured clinical asset (photo, radiograph, or scan).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Unique identifier (UUID v4, assigned on capture).
    pub id: String,
    /// Original file name.
    pub file_name: String,
    /// Clinical category.
    pub category: ImageCategory,
    /// When the asset was captured.
    pub captured_at: DateTime<Utc>,
    /// Size of the stored file in bytes.
    pub size_bytes: u64,
    /// Whether the patient was a minor at capture time.
    ///
    /// Drives the policy's optional minor retention extension.
    #[serde(default)]
    pub patient_minor: bool,
    /// Current storage tier. `Cold` means archived.
    pub storage_tier: StorageTier,
    /// Assigned retention policy, if any.
    #[serde(default)]
    pub policy_id: Option<String>,
    /// Active legal hold, if any.
    #[serde(default)]
    pub legal_hold: Option<LegalHold>,
    /// Last time the image was retrieved for viewing.
    ///
    /// Used by policies with auto-extend-on-access.
    #[serde(default)]
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Image {
    /// Returns `true` while a legal hold is active.
    #[must_use]
    pub fn legal_hold_active(&self) -> bool {
        self.legal_hold.is_some()
    }

    /// Returns `true` when the image sits in cold storage.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.storage_tier == StorageTier::Cold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_strings_round_trip() {
        for category in ImageCategory::ALL {
            assert_eq!(ImageCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(ImageCategory::parse("holograph"), None);
    }

    #[test]
    fn category_serde_uses_snake_case() {
        let json = serde_json::to_string(&ImageCategory::PanoramicXray).unwrap();
        assert_eq!(json, "\"panoramic_xray\"");
        let back: ImageCategory = serde_json::from_str("\"cbct\"").unwrap();
        assert_eq!(back, ImageCategory::Cbct);
    }

    #[test]
    fn image_serializes_camel_case() {
        let image = Image {
            id: "img_1".into(),
            file_name: "pan-001.dcm".into(),
            category: ImageCategory::PanoramicXray,
            captured_at: Utc::now(),
            size_bytes: 2_048,
            patient_minor: false,
            storage_tier: StorageTier::Hot,
            policy_id: None,
            legal_hold: None,
            last_accessed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&image).unwrap();
        assert!(value.get("fileName").is_some());
        assert!(value.get("storageTier").is_some());
        assert!(value.get("legalHold").is_some());
    }

    #[test]
    fn archived_means_cold_tier() {
        let mut image = Image {
            id: "img_2".into(),
            file_name: "ceph.dcm".into(),
            category: ImageCategory::CephalometricXray,
            captured_at: Utc::now(),
            size_bytes: 512,
            patient_minor: false,
            storage_tier: StorageTier::Cold,
            policy_id: None,
            legal_hold: None,
            last_accessed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(image.is_archived());
        image.storage_tier = StorageTier::Hot;
        assert!(!image.is_archived());
    }
}
