//! Retention dashboard projections: compliance gauge, storage split,
//! archive history, and the legal-hold table. All read-only.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;

use chairside_archive::ArchiveQuery;
use chairside_core::{
    ArchiveAction, PageQuery, RetentionPolicy, compliance_report, storage_report,
};
use chairside_store::ImageFilter;

use super::envelope;
use super::AppState;
use crate::error::ApiError;

/// Query parameters for `GET /v1/retention/archive`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveHistoryParams {
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub action: Option<ArchiveAction>,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Query parameters for the paginated legal-hold table.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalHoldParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn page_query(page: Option<u32>, page_size: Option<u32>) -> PageQuery {
    let defaults = PageQuery::default();
    PageQuery {
        page: page.unwrap_or(defaults.page),
        page_size: page_size.unwrap_or(defaults.page_size),
    }
}

/// `GET /v1/retention/report` -- the compliance gauge.
pub async fn report(State(state): State<AppState>) -> Result<Response, ApiError> {
    let images = state.images.snapshot().await?;

    // Resolve each referenced policy once; the snapshot may share a
    // handful of policies across thousands of images.
    let mut policies: HashMap<String, RetentionPolicy> = HashMap::new();
    for image in &images {
        if let Some(id) = &image.policy_id
            && !policies.contains_key(id)
            && let Some(policy) = state.policies.get(id).await?
        {
            policies.insert(id.clone(), policy);
        }
    }

    let report = compliance_report(
        &images,
        |image| {
            image
                .policy_id
                .as_ref()
                .and_then(|id| policies.get(id.as_str()))
        },
        Utc::now(),
    );
    Ok(envelope::ok(report))
}

/// `GET /v1/retention/storage` -- hot/cold byte split and category
/// breakdown.
pub async fn storage(State(state): State<AppState>) -> Result<Response, ApiError> {
    let images = state.images.snapshot().await?;
    Ok(envelope::ok(storage_report(&images)))
}

/// `GET /v1/retention/archive` -- paginated archive history.
pub async fn archive_history(
    State(state): State<AppState>,
    Query(params): Query<ArchiveHistoryParams>,
) -> Result<Response, ApiError> {
    let query = ArchiveQuery {
        image_id: params.image_id.clone(),
        action: params.action,
        actor: params.actor.clone(),
        from: None,
        to: None,
    };
    let page = state
        .archive
        .query(&query, page_query(params.page, params.page_size))
        .await?;
    Ok(envelope::ok(page))
}

/// `GET /v1/retention/legal-holds` -- images currently under hold.
///
/// Legal holds are a projection over images, not a table of their own.
pub async fn legal_holds(
    State(state): State<AppState>,
    Query(params): Query<LegalHoldParams>,
) -> Result<Response, ApiError> {
    let filter = ImageFilter {
        legal_hold: Some(true),
        ..ImageFilter::default()
    };
    let page = state
        .images
        .list(&filter, page_query(params.page, params.page_size))
        .await?;
    Ok(envelope::ok(page))
}
