use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which arch an orthodontic wire was placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireArch {
    Upper,
    Lower,
}

impl WireArch {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upper" => Some(Self::Upper),
            "lower" => Some(Self::Lower),
            _ => None,
        }
    }
}

/// Status of a placed wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireStatus {
    Active,
    Replaced,
    Removed,
}

impl WireStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Replaced => "replaced",
            Self::Removed => "removed",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "replaced" => Some(Self::Replaced),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }
}

/// One entry in a patient's orthodontic wire sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    pub id: String,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub arch: WireArch,
    /// Wire description, e.g. `"016 NiTi"`.
    pub wire: String,
    /// 1-based position in the treatment sequence.
    pub sequence: u32,
    pub status: WireStatus,
    pub placed_at: DateTime<Utc>,
}

impl WireRecord {
    /// Case-insensitive substring match against the patient name.
    ///
    /// This is the filter the list controller applies locally to an
    /// already-fetched page, without a server round trip.
    #[must_use]
    pub fn matches_name(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.patient_last_name.to_lowercase().contains(&needle)
            || self.patient_first_name.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_search_is_case_insensitive_substring() {
        let record = WireRecord {
            id: "wire_1".into(),
            patient_first_name: "Maria".into(),
            patient_last_name: "Okonkwo".into(),
            arch: WireArch::Upper,
            wire: "016 NiTi".into(),
            sequence: 2,
            status: WireStatus::Active,
            placed_at: Utc::now(),
        };
        assert!(record.matches_name("okon"));
        assert!(record.matches_name("MARIA"));
        assert!(record.matches_name(""));
        assert!(!record.matches_name("smith"));
    }
}
