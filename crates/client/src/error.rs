use thiserror::Error;

use chairside_core::FieldError;

/// Errors returned by the Chairside client.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The request never reached the server, or the connection dropped.
    #[error("connection error: {0}")]
    Connection(String),

    /// The response body could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The client was misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server rejected the request because no live session was
    /// presented. Callers should redirect to sign-in.
    #[error("no live session")]
    NoSession,

    /// The server returned an error envelope.
    #[error("API error {code}: {message}")]
    Api {
        /// Stable machine-readable code, e.g. `DUPLICATE_NAME`.
        code: String,
        /// Human-readable message for display.
        message: String,
        /// Per-field validation errors, when the code is
        /// `VALIDATION_ERROR`.
        fields: Vec<FieldError>,
    },
}

impl Error {
    /// The error code when the server returned an envelope, or a
    /// client-side pseudo-code otherwise.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::Deserialization(_) => "DESERIALIZATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::NoSession => "NO_SESSION",
            Self::Api { code, .. } => code,
        }
    }

    /// Validation errors keyed by field, empty for every other variant.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Api { fields, .. } => fields,
            _ => &[],
        }
    }
}
