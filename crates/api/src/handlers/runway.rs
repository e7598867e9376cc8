//! Handlers relaying generation requests to Runway.
//!
//! Routes:
//! - `POST /runway/text_to_image`  -- generate an image and wait for it
//! - `POST /runway/image_to_video` -- start a video task (seed image generated if absent)
//! - `GET  /runway/task`           -- relay a task status lookup

use axum::extract::{Query, State};
use axum::Json;
use reelsmith_core::normalize::{self, clamp_duration, normalize_model, normalize_ratio};
use reelsmith_core::poll::PollOutcome;
use reelsmith_core::task::TaskStatus;
use reelsmith_runway::{
    wait_for_output, GenerationProvider, ImageToVideoRequest, TextToImageRequest,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::LenientJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body accepted by both generation endpoints.
///
/// Older clients send `prompt` and `aspect`; both spellings are read, the
/// canonical one first.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationBody {
    pub prompt_text: Option<String>,
    pub prompt: Option<String>,
    pub prompt_image: Option<String>,
    pub ratio: Option<String>,
    pub aspect: Option<String>,
    /// Number or numeric string.
    pub duration: Option<serde_json::Value>,
    pub model: Option<String>,
}

impl GenerationBody {
    /// Prompt text, or `""` when neither spelling is set.
    pub fn prompt_text(&self) -> &str {
        first_non_empty(&[&self.prompt_text, &self.prompt]).unwrap_or("")
    }

    /// Allow-listed ratio token derived from `ratio` / `aspect`.
    pub fn ratio(&self) -> &'static str {
        normalize_ratio(first_non_empty(&[&self.ratio, &self.aspect]).unwrap_or(""))
    }

    /// Caller-supplied seed image URL, if any.
    pub fn prompt_image(&self) -> Option<&str> {
        first_non_empty(&[&self.prompt_image])
    }
}

fn first_non_empty<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Response of `POST /runway/text_to_image`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_url: String,
    pub task_id: String,
    pub status: TaskStatus,
}

/// Response of `POST /runway/image_to_video`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoTaskResponse {
    pub task_id: String,
}

/// Query of `GET /runway/task`. `taskId` is accepted as an alias.
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub id: Option<String>,
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
}

/// Response of `GET /runway/task`.
///
/// `status` and `output` are copied from the provider payload as sent, so
/// statuses this build does not model still reach the caller.
#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
    /// `[]` when the provider sends `null` or nothing.
    pub output: serde_json::Value,
    /// The provider's full payload.
    pub raw: serde_json::Value,
}

impl TaskStatusResponse {
    fn from_raw(raw: serde_json::Value) -> Self {
        let status = raw.get("status").filter(|s| !s.is_null()).cloned();
        let output = raw
            .get("output")
            .filter(|o| !o.is_null())
            .cloned()
            .unwrap_or_else(|| serde_json::json!([]));
        Self { status, output, raw }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/runway/text_to_image
///
/// Creates a text-to-image task and waits for it on the configured poll
/// loop. A failed task answers 500, a task still running when the loop
/// gives up answers 504.
pub async fn text_to_image(
    State(state): State<AppState>,
    LenientJson(body): LenientJson<GenerationBody>,
) -> AppResult<Json<ImageResponse>> {
    let provider = state.generation()?;

    let prompt_text = body.prompt_text();
    normalize::validate_image_prompt(prompt_text)?;
    let ratio = body.ratio();

    let created = provider
        .text_to_image(&TextToImageRequest::new(prompt_text, ratio))
        .await?;
    tracing::info!(task_id = %created.id, ratio, "Started text_to_image task");

    match wait_for_output(provider, &created.id, &state.config.poll).await? {
        PollOutcome::Succeeded { value, .. } => Ok(Json(ImageResponse {
            image_url: value,
            task_id: created.id,
            status: TaskStatus::Succeeded,
        })),
        PollOutcome::Failed { reason, .. } => Err(AppError::TaskFailed(reason)),
        PollOutcome::TimedOut { .. } => Err(AppError::Timeout(
            "Timeout waiting for text_to_image".to_string(),
        )),
    }
}

/// POST /api/runway/image_to_video
///
/// Normalizes ratio, model and duration, generates a seed image from the
/// prompt when no `promptImage` is given, then starts the video task and
/// returns its id without waiting for it.
pub async fn image_to_video(
    State(state): State<AppState>,
    LenientJson(body): LenientJson<GenerationBody>,
) -> AppResult<Json<VideoTaskResponse>> {
    let provider = state.generation()?;

    let prompt_text = body.prompt_text();
    let ratio = body.ratio();
    let model = normalize_model(body.model.as_deref().unwrap_or(""));
    let duration = clamp_duration(body.duration.as_ref());
    normalize::validate_video_inputs(prompt_text, body.prompt_image())?;

    let prompt_image = match body.prompt_image() {
        Some(url) => url.to_string(),
        None => generate_seed_image(&state, provider, prompt_text, ratio).await?,
    };

    let created = provider
        .image_to_video(&ImageToVideoRequest {
            model: model.to_string(),
            prompt_image,
            prompt_text: prompt_text.to_string(),
            ratio: ratio.to_string(),
            duration,
        })
        .await?;
    tracing::info!(task_id = %created.id, model, ratio, duration, "Started image_to_video task");

    Ok(Json(VideoTaskResponse {
        task_id: created.id,
    }))
}

/// GET /api/runway/task?id=...
///
/// Relays the provider's view of a task. Never polls; callers re-request.
pub async fn get_task(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> AppResult<Json<TaskStatusResponse>> {
    let provider = state.generation()?;

    let task_id = first_non_empty(&[&query.id, &query.task_id])
        .ok_or_else(|| reelsmith_core::error::CoreError::Validation("Missing id".to_string()))?;

    let record = provider.get_task(task_id).await?;
    tracing::debug!(task_id, status = %record.snapshot.status, "Relaying task status");

    Ok(Json(TaskStatusResponse::from_raw(record.raw)))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Generate a seed image for a video request and wait for its URL.
async fn generate_seed_image(
    state: &AppState,
    provider: &dyn GenerationProvider,
    prompt_text: &str,
    ratio: &str,
) -> AppResult<String> {
    let created = provider
        .text_to_image(&TextToImageRequest::new(prompt_text, ratio))
        .await?;
    tracing::info!(task_id = %created.id, ratio, "Generating seed image");

    match wait_for_output(provider, &created.id, &state.config.poll).await? {
        PollOutcome::Succeeded { value, .. } => Ok(value),
        PollOutcome::Failed { .. } => Err(AppError::TaskFailed("text_to_image failed".to_string())),
        PollOutcome::TimedOut { .. } => Err(AppError::Timeout(
            "Timeout waiting for seed image".to_string(),
        )),
    }
}
