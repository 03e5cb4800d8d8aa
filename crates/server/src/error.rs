use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use chairside_archive::ArchiveLogError;
use chairside_core::{DomainError, FieldError};
use chairside_store::StoreError;

/// Errors surfaced through the API.
///
/// Every variant renders the `{success: false, error: {code, message}}`
/// envelope the clients expect; nothing is allowed to escape as a bare
/// 500 with an opaque body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid `portal_session` cookie.
    #[error("no active session")]
    NoSession,

    /// The addressed entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Field-level validation failures.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// A uniqueness conflict on a policy name.
    #[error("{0}")]
    DuplicateName(String),

    /// The policy still has images assigned to it.
    #[error("policy {id} is assigned to {count} image(s) and cannot be deleted")]
    PolicyInUse { id: String, count: u64 },

    /// The policy is the practice default and cannot be deleted.
    #[error("policy {0} is the default policy and cannot be deleted")]
    DefaultPolicy(String),

    /// The image is under legal hold; archival and deletion are blocked.
    #[error("image {image_id} is under legal hold")]
    LegalHoldActive { image_id: String },

    /// The requested state transition is not allowed.
    #[error("{0}")]
    InvalidTransition(String),

    /// Anything unexpected from the storage layer or below.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable error code for the envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSession => "NO_SESSION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateName(_) => "DUPLICATE_NAME",
            Self::PolicyInUse { .. } => "POLICY_IN_USE",
            Self::DefaultPolicy(_) => "DEFAULT_POLICY",
            Self::LegalHoldActive { .. } => "LEGAL_HOLD_ACTIVE",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::Internal(_) => "SERVER_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NoSession => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DuplicateName(_)
            | Self::PolicyInUse { .. }
            | Self::DefaultPolicy(_)
            | Self::LegalHoldActive { .. }
            | Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Never leak backend details to the client.
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "An unexpected error occurred".to_owned()
            }
            other => other.to_string(),
        };

        let mut error = json!({
            "code": self.code(),
            "message": message,
        });
        if let Self::Validation(fields) = &self {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => Self::Validation(fields),
            DomainError::LegalHoldActive { image_id } => Self::LegalHoldActive { image_id },
            DomainError::InvalidTransition(msg) => Self::InvalidTransition(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::Conflict(msg) => Self::DuplicateName(msg),
            StoreError::Backend(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<ArchiveLogError> for ApiError {
    fn from(err: ArchiveLogError) -> Self {
        match err {
            ArchiveLogError::Storage(msg) | ArchiveLogError::Serialization(msg) => {
                Self::Internal(msg)
            }
        }
    }
}
