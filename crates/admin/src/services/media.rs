//! Client for the external media host (admin side).
//!
//! Same wire contract as the storefront's client (multipart upload
//! returning `{success, url, id}`), plus remote deletion for the media
//! library.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::MediaConfig;

/// Errors that can occur when talking to the media host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The host answered but refused the operation; message is user-facing.
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// The host returned a non-success status.
    #[error("media host error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A successfully uploaded asset.
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub url: String,
    pub id: String,
}

/// A file staged for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// The upload seam the bulk engine runs over; the real client implements
/// it, tests substitute their own.
pub trait MediaUploader: Send + Sync {
    fn upload(
        &self,
        file: &UploadFile,
        folder: &str,
    ) -> impl Future<Output = Result<UploadedMedia, MediaError>> + Send;
}

#[derive(Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Media host API client.
#[derive(Clone)]
pub struct MediaClient {
    client: reqwest::Client,
    base_url: String,
}

impl MediaClient {
    /// Create a new media host client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| MediaError::Parse(format!("invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Delete an asset on the host by its remote id.
    ///
    /// # Errors
    ///
    /// `Api` for a non-success status, `Http` for transport failures.
    #[instrument(skip(self))]
    pub async fn delete(&self, remote_id: &str) -> Result<(), MediaError> {
        let response = self
            .client
            .delete(format!("{}/media/{remote_id}", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

impl MediaUploader for MediaClient {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<UploadedMedia, MediaError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)
            .map_err(|e| MediaError::Parse(format!("invalid content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_owned());

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        if !body.success {
            return Err(MediaError::Rejected(
                body.error
                    .unwrap_or_else(|| "media host rejected the upload".to_owned()),
            ));
        }

        match (body.url, body.id) {
            (Some(url), Some(id)) => Ok(UploadedMedia { url, id }),
            _ => Err(MediaError::Parse(
                "successful response missing url or id".to_owned(),
            )),
        }
    }
}
