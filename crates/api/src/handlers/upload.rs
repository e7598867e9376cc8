//! Handler for raw media uploads to blob storage.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use reelsmith_blob::DEFAULT_CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

/// Query parameters of `POST /upload`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadParams {
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/upload?filename=...&contentType=...
///
/// Streams the raw request body into blob storage with public access and
/// returns the object's URL.
pub async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> AppResult<Json<UploadResponse>> {
    let store = state.blob_store()?;

    let filename = non_blank(params.filename).unwrap_or_else(default_filename);
    let content_type =
        non_blank(params.content_type).unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    tracing::info!(
        filename = %filename,
        content_type = %content_type,
        bytes = body.len(),
        "Uploading blob",
    );

    let stored = store.put(&filename, &content_type, body).await?;

    Ok(Json(UploadResponse { url: stored.url }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `upload-<unix millis>`.
fn default_filename() -> String {
    format!("upload-{}", chrono::Utc::now().timestamp_millis())
}
