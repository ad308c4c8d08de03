//! Media library: single and bulk uploads, listing, deletion.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use aurelle_core::MediaAssetId;

use crate::db::media::{MediaAsset, MediaRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::bulk::upload_in_chunks;
use crate::services::media::{MediaUploader, UploadFile};
use crate::state::AppState;

const DEFAULT_FOLDER: &str = "library";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/media", get(list))
        .route("/api/admin/media/upload", post(upload))
        .route("/api/admin/media/bulk-upload", post(bulk_upload))
        .route("/api/admin/media/{id}", delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub folder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkView {
    pub uploaded: Vec<MediaAsset>,
    pub failed: Vec<FailedUpload>,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct FailedUpload {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// Registered assets, optionally by folder.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MediaAsset>>> {
    Ok(Json(
        MediaRepository::new(state.pool())
            .list(query.folder.as_deref())
            .await?,
    ))
}

async fn collect_files(multipart: &mut Multipart) -> Result<(Vec<UploadFile>, String)> {
    let mut files = Vec::new();
    let mut folder = DEFAULT_FOLDER.to_owned();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?
    {
        let name = field.name().map(ToOwned::to_owned);
        match name.as_deref() {
            Some("folder") => {
                folder = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?;
            }
            Some("file") | Some("files") => {
                let filename = field.file_name().unwrap_or("upload").to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?;

                files.push(UploadFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok((files, folder))
}

/// Upload one file and register it.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<MediaAsset>> {
    let (files, folder) = collect_files(&mut multipart).await?;
    let file = files
        .into_iter()
        .next()
        .ok_or_else(|| AppError::BadRequest("missing \"file\" field".into()))?;

    let uploaded = state.media().upload(&file, &folder).await?;

    let asset = MediaRepository::new(state.pool())
        .register(
            &uploaded.id,
            &uploaded.url,
            &folder,
            &file.filename,
            &file.content_type,
        )
        .await?;

    Ok(Json(asset))
}

/// Upload a batch in chunks of five; per-file failures are reported in
/// aggregate without aborting the rest.
#[instrument(skip(state, multipart))]
pub async fn bulk_upload(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<BulkView>> {
    let (files, folder) = collect_files(&mut multipart).await?;
    if files.is_empty() {
        return Err(AppError::BadRequest("no files in upload".into()));
    }

    let report = upload_in_chunks(state.media(), files, &folder, |done, total| {
        tracing::info!(done, total, "bulk upload progress");
    })
    .await;

    let repo = MediaRepository::new(state.pool());
    let mut uploaded = Vec::with_capacity(report.uploaded.len());
    for (file, media) in &report.uploaded {
        let asset = repo
            .register(
                &media.id,
                &media.url,
                &folder,
                &file.filename,
                &file.content_type,
            )
            .await?;
        uploaded.push(asset);
    }

    Ok(Json(BulkView {
        summary: report.summary(),
        uploaded,
        failed: report
            .failed
            .into_iter()
            .map(|(filename, error)| FailedUpload { filename, error })
            .collect(),
    }))
}

/// Delete an asset remotely and drop it from the registry.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let id = MediaAssetId::new(id);
    let repo = MediaRepository::new(state.pool());

    let asset = repo
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("media asset".to_owned()))?;

    state.media().delete(&asset.remote_id).await?;
    let deleted = repo.delete(&id).await?;

    Ok(Json(Deleted { deleted }))
}
