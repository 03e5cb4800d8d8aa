//! The retention / archival state machine.
//!
//! Every transition here is a pure function over an [`Image`]: it returns
//! the updated image together with the [`ArchiveRecord`] the caller must
//! append to the archive log. Nothing in this module touches storage.
//!
//! Legal hold is an overlay orthogonal to the retention states: it can be
//! entered and exited from any state and, while active, blocks archival
//! and deletion.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::image::{Image, LegalHold, StorageTier};
use crate::policy::RetentionPolicy;
use crate::record::{ArchiveAction, ArchiveRecord};

/// Warning window used when a policy does not set `notify_before_archive_days`.
const DEFAULT_NOTIFY_DAYS: u32 = 30;

/// Where an image currently sits in its retention lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetentionState {
    /// No retention policy assigned.
    NoPolicy,
    /// Covered by a policy, nothing due yet.
    PolicyAssigned,
    /// Within the notification window before the archive/expiry deadline.
    ExpiringSoon,
    /// Past the end of the retention period.
    Expired,
    /// Moved to cold storage.
    Archived,
}

/// Computed retention status for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionStatus {
    pub state: RetentionState,
    /// Overlay flag; when `true`, archive and delete are blocked.
    pub legal_hold: bool,
    /// End of the retention period, when a policy is assigned.
    pub retain_until: Option<DateTime<Utc>>,
    /// When the image becomes eligible for cold storage, if the policy
    /// sets an archive threshold.
    pub archive_eligible_at: Option<DateTime<Utc>>,
    /// Whether the archive threshold has already passed.
    pub archive_eligible: bool,
}

fn add_years(start: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    // Months::new saturates well below any plausible policy value; the
    // validation bounds keep years <= 100 anyway.
    start
        .checked_add_months(Months::new(years * 12))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Evaluate the retention state of `image` under `policy` at time `now`.
///
/// Pure read-side projection; the dashboard and report views are built
/// from this.
#[must_use]
pub fn evaluate(
    image: &Image,
    policy: Option<&RetentionPolicy>,
    now: DateTime<Utc>,
) -> RetentionStatus {
    let legal_hold = image.legal_hold_active();

    if image.is_archived() {
        return RetentionStatus {
            state: RetentionState::Archived,
            legal_hold,
            retain_until: None,
            archive_eligible_at: None,
            archive_eligible: false,
        };
    }

    let Some(policy) = policy.filter(|_| image.policy_id.is_some()) else {
        return RetentionStatus {
            state: RetentionState::NoPolicy,
            legal_hold,
            retain_until: None,
            archive_eligible_at: None,
            archive_eligible: false,
        };
    };

    // Auto-extend pushes the window forward from the last access rather
    // than the capture date.
    let anchor = if policy.auto_extend_on_access {
        image.last_accessed_at.unwrap_or(image.captured_at)
    } else {
        image.captured_at
    };

    let retain_until = add_years(anchor, policy.effective_retention_years(image.patient_minor));
    let archive_eligible_at = policy
        .archive_after_years
        .map(|years| add_years(image.captured_at, years));
    let archive_eligible = archive_eligible_at.is_some_and(|at| now >= at);

    let notify_days = policy
        .notify_before_archive_days
        .unwrap_or(DEFAULT_NOTIFY_DAYS);
    // The warning window leads up to the archive threshold when one is
    // set, otherwise to the end of retention.
    let warning_deadline = archive_eligible_at.unwrap_or(retain_until);

    let state = if now >= retain_until {
        RetentionState::Expired
    } else if now >= warning_deadline - Duration::days(i64::from(notify_days)) {
        RetentionState::ExpiringSoon
    } else {
        RetentionState::PolicyAssigned
    };

    RetentionStatus {
        state,
        legal_hold,
        retain_until: Some(retain_until),
        archive_eligible_at,
        archive_eligible,
    }
}

/// Move an image to cold storage.
///
/// Rejected while a legal hold is active or when the image is already
/// archived.
pub fn archive_image(
    mut image: Image,
    actor: &str,
    reason: Option<String>,
) -> Result<(Image, ArchiveRecord), DomainError> {
    if image.legal_hold_active() {
        return Err(DomainError::LegalHoldActive {
            image_id: image.id.clone(),
        });
    }
    if image.is_archived() {
        return Err(DomainError::InvalidTransition(format!(
            "image {} is already archived",
            image.id
        )));
    }

    image.storage_tier = StorageTier::Cold;
    image.updated_at = Utc::now();
    let record = ArchiveRecord::new(
        image.id.clone(),
        image.file_name.clone(),
        ArchiveAction::Archived,
        actor,
        reason,
    );
    Ok((image, record))
}

/// Bring an archived image back to hot storage, making it immediately
/// retrievable. Always permitted regardless of the current policy.
pub fn restore_image(
    mut image: Image,
    actor: &str,
    reason: Option<String>,
) -> Result<(Image, ArchiveRecord), DomainError> {
    if !image.is_archived() {
        return Err(DomainError::InvalidTransition(format!(
            "image {} is not archived",
            image.id
        )));
    }

    image.storage_tier = StorageTier::Hot;
    image.updated_at = Utc::now();
    let record = ArchiveRecord::new(
        image.id.clone(),
        image.file_name.clone(),
        ArchiveAction::Restored,
        actor,
        reason,
    );
    Ok((image, record))
}

/// Place a legal hold. The reason is mandatory and must be non-empty.
pub fn set_legal_hold(
    mut image: Image,
    actor: &str,
    reason: &str,
) -> Result<(Image, ArchiveRecord), DomainError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(DomainError::field("reason", "A reason is required"));
    }
    if image.legal_hold_active() {
        return Err(DomainError::InvalidTransition(format!(
            "image {} is already under legal hold",
            image.id
        )));
    }

    let now = Utc::now();
    image.legal_hold = Some(LegalHold {
        reason: reason.to_owned(),
        set_by: actor.to_owned(),
        set_at: now,
    });
    image.updated_at = now;
    let record = ArchiveRecord::new(
        image.id.clone(),
        image.file_name.clone(),
        ArchiveAction::LegalHoldSet,
        actor,
        Some(reason.to_owned()),
    );
    Ok((image, record))
}

/// Lift a legal hold. The image resumes whatever retention state its
/// policy and age dictate.
pub fn remove_legal_hold(
    mut image: Image,
    actor: &str,
    reason: Option<String>,
) -> Result<(Image, ArchiveRecord), DomainError> {
    if !image.legal_hold_active() {
        return Err(DomainError::InvalidTransition(format!(
            "image {} is not under legal hold",
            image.id
        )));
    }

    image.legal_hold = None;
    image.updated_at = Utc::now();
    let record = ArchiveRecord::new(
        image.id.clone(),
        image.file_name.clone(),
        ArchiveAction::LegalHoldRemoved,
        actor,
        reason,
    );
    Ok((image, record))
}

/// Mark an image as accessed.
///
/// When the governing policy auto-extends on access, the retention window
/// anchor moves and a `RETENTION_EXTENDED` record is emitted.
#[must_use]
pub fn record_access(
    mut image: Image,
    policy: Option<&RetentionPolicy>,
    actor: &str,
) -> (Image, Option<ArchiveRecord>) {
    let now = Utc::now();
    image.last_accessed_at = Some(now);
    image.updated_at = now;

    let extended = policy.is_some_and(|p| p.auto_extend_on_access && image.policy_id.is_some());
    let record = extended.then(|| {
        ArchiveRecord::new(
            image.id.clone(),
            image.file_name.clone(),
            ArchiveAction::RetentionExtended,
            actor,
            Some("Retention window extended on access".to_owned()),
        )
    });
    (image, record)
}

/// Guard for external delete operations: an image under legal hold must
/// never be deleted.
pub fn ensure_deletable(image: &Image) -> Result<(), DomainError> {
    if image.legal_hold_active() {
        return Err(DomainError::LegalHoldActive {
            image_id: image.id.clone(),
        });
    }
    Ok(())
}
