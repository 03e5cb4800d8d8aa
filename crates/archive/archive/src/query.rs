use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chairside_core::ArchiveAction;

/// Filters for querying archive history.
///
/// `None` fields are not applied; filters combine with logical AND.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveQuery {
    /// Filter by affected image.
    #[serde(default)]
    pub image_id: Option<String>,
    /// Filter by lifecycle action.
    #[serde(default)]
    pub action: Option<ArchiveAction>,
    /// Filter by acting user.
    #[serde(default)]
    pub actor: Option<String>,
    /// Records at or after this instant.
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Records at or before this instant.
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}
