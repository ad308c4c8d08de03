//! Design-request triage.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::Deserialize;
use tracing::instrument;

use aurelle_core::{DesignRequestId, DesignRequestStatus};

use crate::db::design_requests::{DesignRequest, DesignRequestRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/design-requests", get(list))
        .route("/api/admin/design-requests/{id}/status", put(set_status))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<DesignRequestStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: DesignRequestStatus,
}

/// Requests, newest first, optionally by status.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DesignRequest>>> {
    Ok(Json(
        DesignRequestRepository::new(state.pool())
            .list(query.status)
            .await?,
    ))
}

/// Move a request through triage.
#[instrument(skip(state))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<DesignRequest>> {
    DesignRequestRepository::new(state.pool())
        .set_status(&DesignRequestId::new(id), request.status)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("design request".to_owned()))
}
