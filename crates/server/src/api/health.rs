use axum::Json;
use axum::response::IntoResponse;
use serde_json::json;

/// `GET /health` -- liveness probe, no session required.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
