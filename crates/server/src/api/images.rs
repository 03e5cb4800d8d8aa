//! Image endpoints: listing, lifecycle transitions, and history.

use axum::{Extension, Json};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use chairside_core::{
    ArchiveAction, ArchiveRecord, Image, ImageCategory, PageQuery, StorageTier, ensure_deletable,
    evaluate, record_access as core_record_access,
};
use chairside_store::ImageFilter;

use super::envelope;
use super::AppState;
use crate::error::ApiError;
use crate::session::Session;

/// Query parameters for `GET /v1/images`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListImagesParams {
    #[serde(default)]
    pub category: Option<ImageCategory>,
    #[serde(default)]
    pub storage_tier: Option<StorageTier>,
    #[serde(default)]
    pub legal_hold: Option<bool>,
    #[serde(default)]
    pub policy_id: Option<String>,
    #[serde(default)]
    pub has_policy: Option<bool>,
    // Flattening PageQuery here trips serde_urlencoded's string-only
    // deserialization, so the paging fields are spelled out.
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl ListImagesParams {
    fn page_query(&self) -> PageQuery {
        let defaults = PageQuery::default();
        PageQuery {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }

    fn filter(&self) -> ImageFilter {
        ImageFilter {
            category: self.category,
            storage_tier: self.storage_tier,
            legal_hold: self.legal_hold,
            policy_id: self.policy_id.clone(),
            has_policy: self.has_policy,
            captured_from: None,
            captured_to: None,
        }
    }
}

/// Request body for `POST /v1/images`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub file_name: String,
    pub category: ImageCategory,
    pub captured_at: DateTime<Utc>,
    pub size_bytes: u64,
    #[serde(default)]
    pub patient_minor: bool,
    /// Explicit policy assignment; when absent, the applicable default
    /// policy is assigned automatically.
    #[serde(default)]
    pub policy_id: Option<String>,
}

/// Request body carrying an optional reason (archive, restore, remove
/// hold).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for setting a legal hold; the reason is mandatory.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetHoldRequest {
    pub reason: String,
}

/// Request body for `PUT /v1/images/{id}/policy`. A null `policyId`
/// clears the assignment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPolicyRequest {
    #[serde(default)]
    pub policy_id: Option<String>,
}

/// Append an audit record for a state change that has already been
/// persisted. A failure here leaves the change in place with no audit
/// trail, so it is logged loudly before surfacing to the caller.
async fn append_audit(state: &AppState, record: ArchiveRecord) -> Result<(), ApiError> {
    let image_id = record.image_id.clone();
    let action = record.action;
    if let Err(e) = state.archive.append(record).await {
        tracing::error!(
            image_id = %image_id,
            ?action,
            error = %e,
            "audit record lost: append failed after the image change was persisted"
        );
        return Err(e.into());
    }
    Ok(())
}

async fn load_image(state: &AppState, id: &str) -> Result<Image, ApiError> {
    state
        .images
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            kind: "image",
            id: id.to_owned(),
        })
}

/// `GET /v1/images` -- filtered, paginated listing with the computed
/// retention status attached to each item.
pub async fn list_images(
    State(state): State<AppState>,
    Query(params): Query<ListImagesParams>,
) -> Result<Response, ApiError> {
    let page = state
        .images
        .list(&params.filter(), params.page_query())
        .await?;

    let now = Utc::now();
    let mut items = Vec::with_capacity(page.items.len());
    for image in &page.items {
        let policy = match &image.policy_id {
            Some(id) => state.policies.get(id).await?,
            None => None,
        };
        let status = evaluate(image, policy.as_ref(), now);
        items.push(serde_json::json!({
            "image": image,
            "retention": status,
        }));
    }

    let body = serde_json::json!({
        "items": items,
        "total": page.total,
        "page": page.page,
        "pageSize": page.page_size,
        "totalPages": page.total_pages,
    });
    Ok(envelope::ok(body))
}

/// `GET /v1/images/{id}`.
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = load_image(&state, &id).await?;
    let policy = match &image.policy_id {
        Some(policy_id) => state.policies.get(policy_id).await?,
        None => None,
    };
    let status = evaluate(&image, policy.as_ref(), Utc::now());
    Ok(envelope::ok(serde_json::json!({
        "image": image,
        "retention": status,
    })))
}

/// `POST /v1/images` -- register a captured image.
pub async fn create_image(
    State(state): State<AppState>,
    Json(req): Json<CreateImageRequest>,
) -> Result<Response, ApiError> {
    if req.file_name.trim().is_empty() {
        return Err(ApiError::Validation(vec![chairside_core::FieldError::new(
            "fileName",
            "File name is required",
        )]));
    }

    let policy_id = match req.policy_id {
        Some(id) => {
            let policy = state
                .policies
                .get(&id)
                .await?
                .ok_or_else(|| ApiError::NotFound {
                    kind: "policy",
                    id: id.clone(),
                })?;
            if !policy.applies_to(req.category) {
                return Err(ApiError::InvalidTransition(format!(
                    "policy {} does not cover category {}",
                    policy.name, req.category
                )));
            }
            Some(id)
        }
        // Fall back to the practice default when it covers this category.
        None => state
            .policies
            .get_default()
            .await?
            .filter(|p| p.active && p.applies_to(req.category))
            .map(|p| p.id),
    };

    let now = Utc::now();
    let image = Image {
        id: Uuid::new_v4().to_string(),
        file_name: req.file_name,
        category: req.category,
        captured_at: req.captured_at,
        size_bytes: req.size_bytes,
        patient_minor: req.patient_minor,
        storage_tier: StorageTier::Hot,
        policy_id,
        legal_hold: None,
        last_accessed_at: None,
        created_at: now,
        updated_at: now,
    };
    state.images.insert(image.clone()).await?;

    tracing::info!(image_id = %image.id, category = %image.category, "image registered");
    Ok(envelope::created(image))
}

/// `DELETE /v1/images/{id}` -- external delete, gated by the
/// no-legal-hold invariant.
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = load_image(&state, &id).await?;
    ensure_deletable(&image)?;

    state.images.delete(&id).await?;
    append_audit(
        &state,
        ArchiveRecord::new(
            &image.id,
            &image.file_name,
            ArchiveAction::Deleted,
            &session.user_id,
            None,
        ),
    )
    .await?;

    tracing::info!(image_id = %id, actor = %session.user_id, "image deleted");
    Ok(envelope::no_data())
}

/// `PUT /v1/images/{id}/policy` -- assign or clear the retention policy.
pub async fn assign_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignPolicyRequest>,
) -> Result<Response, ApiError> {
    let mut image = load_image(&state, &id).await?;

    if let Some(ref policy_id) = req.policy_id {
        let policy = state
            .policies
            .get(policy_id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                kind: "policy",
                id: policy_id.clone(),
            })?;
        if !policy.applies_to(image.category) {
            return Err(ApiError::InvalidTransition(format!(
                "policy {} does not cover category {}",
                policy.name, image.category
            )));
        }
    }

    image.policy_id = req.policy_id;
    image.updated_at = Utc::now();
    state.images.update(image.clone()).await?;
    Ok(envelope::ok(image))
}

/// `POST /v1/images/{id}/archive` -- move to cold storage.
pub async fn archive(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> Result<Response, ApiError> {
    let image = load_image(&state, &id).await?;
    let (image, record) = chairside_core::archive_image(image, &session.user_id, req.reason)?;

    state.images.update(image.clone()).await?;
    append_audit(&state, record).await?;

    tracing::info!(image_id = %id, actor = %session.user_id, "image archived");
    Ok(envelope::ok(image))
}

/// `POST /v1/images/{id}/restore` -- bring an archived image back to hot
/// storage.
pub async fn restore(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> Result<Response, ApiError> {
    let image = load_image(&state, &id).await?;
    let (image, record) = chairside_core::restore_image(image, &session.user_id, req.reason)?;

    state.images.update(image.clone()).await?;
    append_audit(&state, record).await?;

    tracing::info!(image_id = %id, actor = %session.user_id, "image restored");
    Ok(envelope::ok(image))
}

/// `POST /v1/images/{id}/legal-hold` -- place a legal hold.
pub async fn set_legal_hold(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(req): Json<SetHoldRequest>,
) -> Result<Response, ApiError> {
    let image = load_image(&state, &id).await?;
    let (image, record) =
        chairside_core::set_legal_hold(image, &session.user_id, &req.reason)?;

    state.images.update(image.clone()).await?;
    append_audit(&state, record).await?;

    tracing::info!(image_id = %id, actor = %session.user_id, "legal hold set");
    Ok(envelope::ok(image))
}

/// `DELETE /v1/images/{id}/legal-hold` -- lift a legal hold.
pub async fn remove_legal_hold(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> Result<Response, ApiError> {
    let image = load_image(&state, &id).await?;
    let (image, record) =
        chairside_core::remove_legal_hold(image, &session.user_id, req.reason)?;

    state.images.update(image.clone()).await?;
    append_audit(&state, record).await?;

    tracing::info!(image_id = %id, actor = %session.user_id, "legal hold removed");
    Ok(envelope::ok(image))
}

/// `POST /v1/images/{id}/access` -- mark the image as viewed, extending
/// retention under auto-extend policies.
pub async fn record_access(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = load_image(&state, &id).await?;
    let policy = match &image.policy_id {
        Some(policy_id) => state.policies.get(policy_id).await?,
        None => None,
    };

    let (image, record) = core_record_access(image, policy.as_ref(), &session.user_id);
    state.images.update(image.clone()).await?;
    if let Some(record) = record {
        append_audit(&state, record).await?;
    }
    Ok(envelope::ok(image))
}

/// `GET /v1/images/{id}/history` -- full archive history for one image.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    // 404 for unknown images rather than an empty history.
    load_image(&state, &id).await?;
    let records = state.archive.for_image(&id).await?;
    Ok(envelope::ok(records))
}
