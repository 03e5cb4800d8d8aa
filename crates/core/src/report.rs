//! Read-side aggregations for the retention dashboard.
//!
//! Both reports are pure functions over a snapshot of images; they have no
//! write behavior.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::image::{Image, ImageCategory, StorageTier};
use crate::policy::RetentionPolicy;
use crate::retention::{RetentionState, evaluate};

/// Compliance gauge numbers for the retention dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub total_images: u64,
    /// Images with an assigned policy (archived images counted separately).
    pub with_policy: u64,
    /// Hot-tier images with no assigned policy.
    pub needs_policy: u64,
    pub expiring_soon: u64,
    pub expired: u64,
    pub archived: u64,
    pub legal_holds: u64,
    /// `with_policy / total * 100`, rounded to one decimal place.
    pub compliance_rate: f64,
}

/// Byte and count usage for a single image category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsage {
    pub category: ImageCategory,
    pub label: String,
    pub count: u64,
    pub bytes: u64,
}

/// Storage split between hot and cold tiers, with a per-category breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReport {
    pub total_bytes: u64,
    pub hot_bytes: u64,
    pub cold_bytes: u64,
    pub hot_percent: f64,
    pub cold_percent: f64,
    pub by_category: Vec<CategoryUsage>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Build the compliance report from an image snapshot.
///
/// Archived images are excluded from the "needs policy" count: a record
/// already in cold storage is not non-compliant, it is simply archived.
pub fn compliance_report<'a>(
    images: impl IntoIterator<Item = &'a Image>,
    policy_for: impl Fn(&Image) -> Option<&'a RetentionPolicy>,
    now: DateTime<Utc>,
) -> ComplianceReport {
    let mut report = ComplianceReport {
        total_images: 0,
        with_policy: 0,
        needs_policy: 0,
        expiring_soon: 0,
        expired: 0,
        archived: 0,
        legal_holds: 0,
        compliance_rate: 0.0,
    };

    for image in images {
        report.total_images += 1;
        if image.legal_hold_active() {
            report.legal_holds += 1;
        }
        if image.policy_id.is_some() {
            report.with_policy += 1;
        }
        // Counted by assignment, not by whether the resolver found the
        // policy, so `with_policy + needs_policy + archived` always
        // covers the snapshot.
        if image.policy_id.is_none() && !image.is_archived() {
            report.needs_policy += 1;
        }

        match evaluate(image, policy_for(image), now).state {
            RetentionState::Archived => report.archived += 1,
            RetentionState::ExpiringSoon => report.expiring_soon += 1,
            RetentionState::Expired => report.expired += 1,
            RetentionState::NoPolicy | RetentionState::PolicyAssigned => {}
        }
    }

    if report.total_images > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            report.compliance_rate =
                round1(report.with_policy as f64 / report.total_images as f64 * 100.0);
        }
    }
    report
}

/// Build the storage report from an image snapshot.
pub fn storage_report<'a>(images: impl IntoIterator<Item = &'a Image>) -> StorageReport {
    let mut hot_bytes = 0u64;
    let mut cold_bytes = 0u64;
    let mut by_category: BTreeMap<&'static str, (ImageCategory, u64, u64)> = BTreeMap::new();

    for image in images {
        match image.storage_tier {
            StorageTier::Hot => hot_bytes += image.size_bytes,
            StorageTier::Cold => cold_bytes += image.size_bytes,
        }
        let entry = by_category
            .entry(image.category.as_str())
            .or_insert((image.category, 0, 0));
        entry.1 += 1;
        entry.2 += image.size_bytes;
    }

    let total_bytes = hot_bytes + cold_bytes;
    let (hot_percent, cold_percent) = if total_bytes == 0 {
        (0.0, 0.0)
    } else {
        #[allow(clippy::cast_precision_loss)]
        let hot = round1(hot_bytes as f64 / total_bytes as f64 * 100.0);
        (hot, round1(100.0 - hot))
    };

    StorageReport {
        total_bytes,
        hot_bytes,
        cold_bytes,
        hot_percent,
        cold_percent,
        by_category: by_category
            .into_values()
            .map(|(category, count, bytes)| CategoryUsage {
                category,
                label: category.label().to_owned(),
                count,
                bytes,
            })
            .collect(),
    }
}
