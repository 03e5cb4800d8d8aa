pub mod envelope;
pub mod health;
pub mod images;
pub mod policies;
pub mod retention;
pub mod wires;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use chairside_archive::ArchiveLog;
use chairside_store::{ImageStore, PolicyStore, WireStore};

use crate::session::{self, SessionValidator};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Image record storage.
    pub images: Arc<dyn ImageStore>,
    /// Retention policy storage.
    pub policies: Arc<dyn PolicyStore>,
    /// Wire record storage.
    pub wires: Arc<dyn WireStore>,
    /// Append-only archive history log.
    pub archive: Arc<dyn ArchiveLog>,
    /// External session validator.
    pub sessions: Arc<dyn SessionValidator>,
}

/// Build the Axum router with all API routes and middleware.
pub fn router(state: AppState) -> Router {
    let public = Router::new().route("/health", get(health::health));

    let protected = Router::new()
        // Images
        .route(
            "/v1/images",
            get(images::list_images).post(images::create_image),
        )
        .route(
            "/v1/images/{id}",
            get(images::get_image).delete(images::delete_image),
        )
        .route("/v1/images/{id}/policy", put(images::assign_policy))
        .route("/v1/images/{id}/archive", post(images::archive))
        .route("/v1/images/{id}/restore", post(images::restore))
        .route(
            "/v1/images/{id}/legal-hold",
            post(images::set_legal_hold).delete(images::remove_legal_hold),
        )
        .route("/v1/images/{id}/access", post(images::record_access))
        .route("/v1/images/{id}/history", get(images::history))
        // Retention policies
        .route(
            "/v1/retention/policies",
            get(policies::list_policies).post(policies::create_policy),
        )
        .route(
            "/v1/retention/policies/{id}",
            get(policies::get_policy)
                .put(policies::update_policy)
                .delete(policies::delete_policy),
        )
        .route(
            "/v1/retention/policies/{id}/default",
            put(policies::set_default),
        )
        .route(
            "/v1/retention/policies/{id}/active",
            put(policies::set_active),
        )
        // Retention dashboard projections
        .route("/v1/retention/report", get(retention::report))
        .route("/v1/retention/storage", get(retention::storage))
        .route("/v1/retention/archive", get(retention::archive_history))
        .route("/v1/retention/legal-holds", get(retention::legal_holds))
        // Wire records
        .route("/v1/wires", get(wires::list_wires))
        // Session gate runs before any protected handler.
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.sessions),
            session::require_session,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
