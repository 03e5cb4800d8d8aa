//! Wire-record listing.
//!
//! Arch and status are server-side filters; patient-name search is
//! applied client-side by the list controller against the fetched page.

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use chairside_core::{PageQuery, WireArch, WireStatus};
use chairside_store::WireFilter;

use super::envelope;
use super::AppState;
use crate::error::ApiError;

/// Query parameters for `GET /v1/wires`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWiresParams {
    #[serde(default)]
    pub arch: Option<WireArch>,
    #[serde(default)]
    pub status: Option<WireStatus>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// `GET /v1/wires` -- filtered, paginated wire sequence listing.
pub async fn list_wires(
    State(state): State<AppState>,
    Query(params): Query<ListWiresParams>,
) -> Result<Response, ApiError> {
    let defaults = PageQuery::default();
    let page_query = PageQuery {
        page: params.page.unwrap_or(defaults.page),
        page_size: params.page_size.unwrap_or(defaults.page_size),
    };
    let filter = WireFilter {
        arch: params.arch,
        status: params.status,
    };
    let page = state.wires.list(&filter, page_query).await?;
    Ok(envelope::ok(page))
}
