//! Admin endpoints for the consistency repair job.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use kinotek_services::{CatalogSnapshot, RepairReport};

use crate::error::HttpAppError;
use crate::state::AppState;

/// Targeted repair: restore status/visibility agreement per the configured
/// policy. Safe to call repeatedly; a clean catalog reports zero fixes.
pub async fn reconcile(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RepairReport>, HttpAppError> {
    let report = state.repair.reconcile().await?;
    Ok(Json(report))
}

/// Blunt recovery: make every record visible regardless of status.
pub async fn force_visible(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RepairReport>, HttpAppError> {
    let report = state.repair.force_visible().await?;
    Ok(Json(report))
}

/// Read-only per-record status/visibility snapshot for diagnostics.
pub async fn repair_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogSnapshot>, HttpAppError> {
    let snapshot = state.repair.snapshot().await?;
    Ok(Json(snapshot))
}
