//! Marketing email templates.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use aurelle_core::EmailTemplateId;

use crate::db::email_templates::{EmailTemplate, EmailTemplateInput, EmailTemplateRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::email::render_template;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/marketing/templates", get(list).post(create))
        .route(
            "/api/admin/marketing/templates/{id}",
            get(detail).put(update).delete(remove),
        )
        .route(
            "/api/admin/marketing/templates/{id}/test-send",
            post(test_send),
        )
}

#[derive(Debug, Deserialize)]
pub struct TestSendRequest {
    pub to: String,
    /// Placeholder values, e.g. `{"name": "Ada"}`.
    #[serde(default)]
    pub values: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct Sent {
    pub sent: bool,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// All templates.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<EmailTemplate>>> {
    Ok(Json(EmailTemplateRepository::new(state.pool()).list().await?))
}

/// Create a template.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<EmailTemplateInput>,
) -> Result<Json<EmailTemplate>> {
    validate(&input)?;
    let created = EmailTemplateRepository::new(state.pool())
        .create(&input)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::Database(other),
        })?;
    Ok(Json(created))
}

/// One template.
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<EmailTemplate>> {
    EmailTemplateRepository::new(state.pool())
        .get(&EmailTemplateId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("template".to_owned()))
}

/// Update a template.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<EmailTemplateInput>,
) -> Result<Json<EmailTemplate>> {
    validate(&input)?;
    EmailTemplateRepository::new(state.pool())
        .update(&EmailTemplateId::new(id), &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("template".to_owned()))
}

/// Delete a template.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let deleted = EmailTemplateRepository::new(state.pool())
        .delete(&EmailTemplateId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound("template".to_owned()));
    }
    Ok(Json(Deleted { deleted }))
}

/// Render a template with sample values and send it to one address.
#[instrument(skip(state, request))]
pub async fn test_send(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(request): Json<TestSendRequest>,
) -> Result<Json<Sent>> {
    let template = EmailTemplateRepository::new(state.pool())
        .get(&EmailTemplateId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("template".to_owned()))?;

    let values: HashMap<&str, String> = request
        .values
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();

    let subject = render_template(&template.subject, &values);
    let body = render_template(&template.body, &values);

    state.email().send(&request.to, &subject, body).await?;

    Ok(Json(Sent { sent: true }))
}

fn validate(input: &EmailTemplateInput) -> Result<()> {
    if input.name.trim().is_empty() || input.subject.trim().is_empty() {
        return Err(AppError::BadRequest("name and subject are required".into()));
    }
    Ok(())
}
