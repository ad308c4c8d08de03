//! Custom-design request intake.
//!
//! The form arrives as multipart so a reference image can ride along. The
//! one hard validation is local: at least one jewelry type must be
//! selected before anything touches the network.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, post},
};
use tracing::instrument;

use aurelle_core::Email;

use crate::db::{DesignRequest, DesignRequestRepository, NewDesignRequest};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

const REFERENCE_FOLDER: &str = "design-references";

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/design-requests", post(create).get(list_own))
}

#[derive(Debug, Default)]
struct IntakeForm {
    name: String,
    email: String,
    jewelry_types: Vec<String>,
    description: Option<String>,
    budget: Option<String>,
    reference_image_url: Option<String>,
}

/// Submit a design request. Login is optional; a logged-in submitter can
/// later see the request under their account.
#[instrument(skip(state, multipart))]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    mut multipart: Multipart,
) -> Result<Json<DesignRequest>> {
    let mut form = IntakeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed form: {e}")))?
    {
        let read_text = |e| AppError::BadRequest(format!("malformed form: {e}"));
        let name = field.name().map(ToOwned::to_owned);
        match name.as_deref() {
            Some("name") => form.name = field.text().await.map_err(read_text)?,
            Some("email") => form.email = field.text().await.map_err(read_text)?,
            Some("jewelry_types") => {
                // Sent as a JSON array of type names.
                let raw = field.text().await.map_err(read_text)?;
                form.jewelry_types = serde_json::from_str(&raw).map_err(|e| {
                    AppError::BadRequest(format!("jewelry_types must be a JSON array: {e}"))
                })?;
            }
            Some("description") => {
                form.description = Some(field.text().await.map_err(read_text)?);
            }
            Some("budget") => form.budget = Some(field.text().await.map_err(read_text)?),
            Some("reference_image") => {
                let filename = field.file_name().unwrap_or("reference").to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("malformed form: {e}"))
                })?;

                let uploaded = state
                    .media()
                    .upload(&filename, &content_type, bytes.to_vec(), REFERENCE_FOLDER)
                    .await?;
                form.reference_image_url = Some(uploaded.url);
            }
            _ => {}
        }
    }

    if form.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    let email = Email::parse(form.email.trim())
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    if form.jewelry_types.iter().all(|t| t.trim().is_empty()) || form.jewelry_types.is_empty() {
        return Err(AppError::BadRequest(
            "select at least one jewelry type".into(),
        ));
    }

    let request = DesignRequestRepository::new(state.pool())
        .create(NewDesignRequest {
            user_id: user.map(|u| u.id),
            name: form.name.trim().to_owned(),
            email: email.into_inner(),
            jewelry_types: form.jewelry_types,
            description: form.description,
            budget: form.budget,
            reference_image_url: form.reference_image_url,
        })
        .await?;

    Ok(Json(request))
}

/// List the logged-in user's own requests.
#[instrument(skip(state))]
pub async fn list_own(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<DesignRequest>>> {
    let requests = DesignRequestRepository::new(state.pool())
        .list_for_user(&user.id)
        .await?;
    Ok(Json(requests))
}
