//! Session boundary.
//!
//! Session issuance and validation live in an external service; this
//! module only reads the `portal_session` cookie, asks a
//! [`SessionValidator`] whether it is live, and short-circuits with
//! `NO_SESSION` when it is not. The resolved session is stashed in
//! request extensions so handlers can stamp the acting user onto archive
//! records.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;

/// Name of the session cookie issued by the portal.
pub const SESSION_COOKIE: &str = "portal_session";

/// A validated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Stable user identifier, used as the actor on archive records.
    pub user_id: String,
    /// Display name for UI purposes.
    pub display_name: String,
}

/// External collaborator that decides whether a session token is live.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Resolve a cookie value into a session, or `None` when invalid or
    /// expired.
    async fn validate(&self, token: &str) -> Option<Session>;
}

/// Validator with a fixed token -> user mapping, for development and
/// tests.
#[derive(Debug, Default)]
pub struct StaticSessionValidator {
    sessions: Vec<(String, Session)>,
}

impl StaticSessionValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token that resolves to the given user.
    #[must_use]
    pub fn with_token(
        mut self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        self.sessions.push((
            token.into(),
            Session {
                user_id: user_id.into(),
                display_name: display_name.into(),
            },
        ));
        self
    }
}

#[async_trait]
impl SessionValidator for StaticSessionValidator {
    async fn validate(&self, token: &str) -> Option<Session> {
        self.sessions
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, session)| session.clone())
    }
}

/// Pull the named cookie out of the `Cookie` header, if present.
fn cookie_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    let header = request.headers().get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Middleware enforcing a live session on every protected route.
pub async fn require_session(
    State(validator): State<Arc<dyn SessionValidator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = cookie_value(&request, SESSION_COOKIE).ok_or(ApiError::NoSession)?;
    let session = validator.validate(token).await.ok_or(ApiError::NoSession)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
