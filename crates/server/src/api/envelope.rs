use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

/// Wrap a payload in the `{success: true, data}` envelope with `200 OK`.
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

/// Wrap a freshly created payload with `201 Created`.
pub fn created<T: Serialize>(data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": data })),
    )
        .into_response()
}

/// Bodyless success, used by delete endpoints.
pub fn no_data() -> Response {
    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}
