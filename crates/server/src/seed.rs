//! Development seed data, loaded behind the `--seed` flag.

use chrono::{Duration, Utc};
use uuid::Uuid;

use chairside_core::{
    Image, ImageCategory, RetentionPolicy, StorageTier, WireArch, WireRecord, WireStatus,
};

use crate::api::AppState;
use crate::error::ApiError;

/// Populate the stores with a small, representative data set.
pub async fn seed(state: &AppState) -> Result<(), ApiError> {
    let now = Utc::now();

    let default_policy = RetentionPolicy {
        id: Uuid::new_v4().to_string(),
        name: "Standard 7-Year".to_owned(),
        description: Some("Practice-wide default retention".to_owned()),
        is_default: true,
        active: true,
        categories: Vec::new(),
        retention_years: 7,
        minor_extension_years: Some(3),
        archive_after_years: Some(5),
        notify_before_archive_days: Some(60),
        auto_extend_on_access: false,
        created_at: now,
        updated_at: now,
    };
    let cbct_policy = RetentionPolicy {
        id: Uuid::new_v4().to_string(),
        name: "CBCT 10-Year".to_owned(),
        description: None,
        is_default: false,
        active: true,
        categories: vec![ImageCategory::Cbct],
        retention_years: 10,
        minor_extension_years: None,
        archive_after_years: Some(7),
        notify_before_archive_days: None,
        auto_extend_on_access: true,
        created_at: now,
        updated_at: now,
    };
    let default_id = default_policy.id.clone();
    state.policies.insert(default_policy).await?;
    state.policies.insert(cbct_policy).await?;

    let samples = [
        ("pan-1042.dcm", ImageCategory::PanoramicXray, 180, 4_800_000),
        ("ceph-0917.dcm", ImageCategory::CephalometricXray, 420, 2_100_000),
        ("intra-2231.jpg", ImageCategory::IntraoralPhoto, 30, 950_000),
        ("extra-0404.jpg", ImageCategory::ExtraoralPhoto, 12, 1_200_000),
    ];
    for (file_name, category, age_days, size_bytes) in samples {
        let captured = now - Duration::days(age_days);
        state
            .images
            .insert(Image {
                id: Uuid::new_v4().to_string(),
                file_name: file_name.to_owned(),
                category,
                captured_at: captured,
                size_bytes,
                patient_minor: false,
                storage_tier: StorageTier::Hot,
                policy_id: Some(default_id.clone()),
                legal_hold: None,
                last_accessed_at: None,
                created_at: captured,
                updated_at: captured,
            })
            .await?;
    }

    let wires = [
        ("Okonkwo", "Maria", WireArch::Upper, "014 NiTi", 1, WireStatus::Replaced, 90),
        ("Okonkwo", "Maria", WireArch::Upper, "016 NiTi", 2, WireStatus::Active, 30),
        ("Silva", "Joao", WireArch::Lower, "016x22 SS", 3, WireStatus::Active, 14),
    ];
    for (last, first, arch, wire, sequence, status, age_days) in wires {
        state
            .wires
            .insert(WireRecord {
                id: Uuid::new_v4().to_string(),
                patient_first_name: first.to_owned(),
                patient_last_name: last.to_owned(),
                arch,
                wire: wire.to_owned(),
                sequence,
                status,
                placed_at: now - Duration::days(age_days),
            })
            .await?;
    }

    tracing::info!("seed data loaded");
    Ok(())
}
