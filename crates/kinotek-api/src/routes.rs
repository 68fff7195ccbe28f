//! Route configuration.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{files, health, repair, upload, videos};
use crate::state::AppState;

/// Assemble the full router: the `/api` surface, public file read-back, and
/// the health probe.
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes();

    let api = Router::new()
        .route(
            "/videos",
            post(videos::create_video).get(videos::list_videos),
        )
        .route("/videos/upload", post(upload::upload_video))
        .route(
            "/videos/{id}",
            get(videos::get_video).delete(videos::delete_video),
        )
        .route("/videos/{id}/status", patch(videos::update_status))
        .route("/videos/{id}/visibility", patch(videos::update_visibility))
        .route("/admin/repair/reconcile", post(repair::reconcile))
        .route("/admin/repair/force-visible", post(repair::force_visible))
        .route("/admin/repair/status", get(repair::repair_status));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .route("/videos/{filename}", get(files::serve_video))
        .route("/thumbnails/{filename}", get(files::serve_thumbnail))
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Uploads are bounded by the configured limit, not axum's default.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}
