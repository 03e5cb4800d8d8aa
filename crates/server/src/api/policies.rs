//! Retention policy CRUD.
//!
//! Invariants enforced here, defensively, rather than trusted to the
//! caller: a single default policy, no deleting a referenced or default
//! policy, and the numeric bounds validated in core.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use chairside_core::{ImageCategory, PageQuery, RetentionPolicy};
use chairside_store::PolicyFilter;

use super::envelope;
use super::AppState;
use crate::error::ApiError;

/// Query parameters for `GET /v1/retention/policies`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPoliciesParams {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub category: Option<ImageCategory>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Request body for `POST /v1/retention/policies`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Empty means the policy applies to all categories.
    #[serde(default)]
    pub categories: Vec<ImageCategory>,
    pub retention_years: u32,
    #[serde(default)]
    pub minor_extension_years: Option<u32>,
    #[serde(default)]
    pub archive_after_years: Option<u32>,
    #[serde(default)]
    pub notify_before_archive_days: Option<u32>,
    #[serde(default)]
    pub auto_extend_on_access: bool,
    #[serde(default)]
    pub is_default: bool,
}

/// Request body for `PUT /v1/retention/policies/{id}`. Absent fields are
/// left unchanged; `categories` replaces the whole list when present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<ImageCategory>>,
    #[serde(default)]
    pub retention_years: Option<u32>,
    #[serde(default)]
    pub minor_extension_years: Option<Option<u32>>,
    #[serde(default)]
    pub archive_after_years: Option<Option<u32>>,
    #[serde(default)]
    pub notify_before_archive_days: Option<Option<u32>>,
    #[serde(default)]
    pub auto_extend_on_access: Option<bool>,
}

/// Request body for `PUT /v1/retention/policies/{id}/active`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub active: bool,
}

async fn load_policy(state: &AppState, id: &str) -> Result<RetentionPolicy, ApiError> {
    state
        .policies
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            kind: "policy",
            id: id.to_owned(),
        })
}

/// Clear the default flag on whichever policy currently holds it.
async fn clear_existing_default(state: &AppState, keep_id: &str) -> Result<(), ApiError> {
    if let Some(mut current) = state.policies.get_default().await?
        && current.id != keep_id
    {
        current.is_default = false;
        current.updated_at = Utc::now();
        state.policies.update(current).await?;
    }
    Ok(())
}

/// `GET /v1/retention/policies` -- filtered, paginated listing with the
/// per-policy image count attached.
pub async fn list_policies(
    State(state): State<AppState>,
    Query(params): Query<ListPoliciesParams>,
) -> Result<Response, ApiError> {
    let defaults = PageQuery::default();
    let page_query = PageQuery {
        page: params.page.unwrap_or(defaults.page),
        page_size: params.page_size.unwrap_or(defaults.page_size),
    };
    let filter = PolicyFilter {
        active: params.active,
        category: params.category,
    };
    let page = state.policies.list(&filter, page_query).await?;

    let mut items = Vec::with_capacity(page.items.len());
    for policy in &page.items {
        let image_count = state.images.count_by_policy(&policy.id).await?;
        items.push(serde_json::json!({
            "policy": policy,
            "imageCount": image_count,
            "appliesToAll": policy.applies_to_all(),
        }));
    }

    Ok(envelope::ok(serde_json::json!({
        "items": items,
        "total": page.total,
        "page": page.page,
        "pageSize": page.page_size,
        "totalPages": page.total_pages,
    })))
}

/// `GET /v1/retention/policies/{id}`.
pub async fn get_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let policy = load_policy(&state, &id).await?;
    Ok(envelope::ok(policy))
}

/// `POST /v1/retention/policies`.
pub async fn create_policy(
    State(state): State<AppState>,
    Json(req): Json<CreatePolicyRequest>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let policy = RetentionPolicy {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_owned(),
        description: req.description,
        is_default: req.is_default,
        active: true,
        categories: req.categories,
        retention_years: req.retention_years,
        minor_extension_years: req.minor_extension_years,
        archive_after_years: req.archive_after_years,
        notify_before_archive_days: req.notify_before_archive_days,
        auto_extend_on_access: req.auto_extend_on_access,
        created_at: now,
        updated_at: now,
    };
    policy.validate()?;

    if state.policies.get_by_name(&policy.name).await?.is_some() {
        return Err(ApiError::DuplicateName(format!(
            "a policy named {} already exists",
            policy.name
        )));
    }

    if policy.is_default {
        clear_existing_default(&state, &policy.id).await?;
    }
    state.policies.insert(policy.clone()).await?;

    tracing::info!(policy_id = %policy.id, name = %policy.name, "retention policy created");
    Ok(envelope::created(policy))
}

/// `PUT /v1/retention/policies/{id}` -- partial update.
pub async fn update_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePolicyRequest>,
) -> Result<Response, ApiError> {
    let mut policy = load_policy(&state, &id).await?;

    if let Some(name) = req.name {
        policy.name = name.trim().to_owned();
    }
    if let Some(description) = req.description {
        policy.description = Some(description);
    }
    if let Some(categories) = req.categories {
        policy.categories = categories;
    }
    if let Some(years) = req.retention_years {
        policy.retention_years = years;
    }
    if let Some(value) = req.minor_extension_years {
        policy.minor_extension_years = value;
    }
    if let Some(value) = req.archive_after_years {
        policy.archive_after_years = value;
    }
    if let Some(value) = req.notify_before_archive_days {
        policy.notify_before_archive_days = value;
    }
    if let Some(flag) = req.auto_extend_on_access {
        policy.auto_extend_on_access = flag;
    }
    policy.updated_at = Utc::now();

    policy.validate()?;
    if let Some(existing) = state.policies.get_by_name(&policy.name).await?
        && existing.id != policy.id
    {
        return Err(ApiError::DuplicateName(format!(
            "a policy named {} already exists",
            policy.name
        )));
    }
    state.policies.update(policy.clone()).await?;
    Ok(envelope::ok(policy))
}

/// `DELETE /v1/retention/policies/{id}`.
///
/// Blocked while the policy is the default or any image references it.
pub async fn delete_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let policy = load_policy(&state, &id).await?;
    if policy.is_default {
        return Err(ApiError::DefaultPolicy(policy.id));
    }

    let count = state.images.count_by_policy(&id).await?;
    if count > 0 {
        return Err(ApiError::PolicyInUse { id, count });
    }

    state.policies.delete(&id).await?;
    tracing::info!(policy_id = %id, "retention policy deleted");
    Ok(envelope::no_data())
}

/// `PUT /v1/retention/policies/{id}/default` -- make this policy the
/// single practice default.
pub async fn set_default(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let mut policy = load_policy(&state, &id).await?;

    clear_existing_default(&state, &id).await?;
    policy.is_default = true;
    policy.updated_at = Utc::now();
    state.policies.update(policy.clone()).await?;

    tracing::info!(policy_id = %id, "default retention policy changed");
    Ok(envelope::ok(policy))
}

/// `PUT /v1/retention/policies/{id}/active` -- enable or disable.
pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Response, ApiError> {
    let mut policy = load_policy(&state, &id).await?;
    policy.active = req.active;
    policy.updated_at = Utc::now();
    state.policies.update(policy.clone()).await?;
    Ok(envelope::ok(policy))
}
