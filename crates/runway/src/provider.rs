//! Provider abstraction used by the HTTP handlers.
//!
//! Handlers talk to [`GenerationProvider`] rather than [`RunwayApi`]
//! directly so the relay logic can be exercised without network access.

use async_trait::async_trait;
use reelsmith_core::poll::{poll_until, PollConfig, PollOutcome};
use reelsmith_core::task::classify_task;

use crate::api::{
    CreatedTask, ImageToVideoRequest, RunwayApi, RunwayApiError, TaskRecord, TextToImageRequest,
};

/// Task-based media generation backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Start generating an image from text.
    async fn text_to_image(
        &self,
        request: &TextToImageRequest,
    ) -> Result<CreatedTask, RunwayApiError>;

    /// Start generating a video from a seed image and prompt.
    async fn image_to_video(
        &self,
        request: &ImageToVideoRequest,
    ) -> Result<CreatedTask, RunwayApiError>;

    /// Fetch the current state of a task.
    async fn get_task(&self, task_id: &str) -> Result<TaskRecord, RunwayApiError>;
}

#[async_trait]
impl GenerationProvider for RunwayApi {
    async fn text_to_image(
        &self,
        request: &TextToImageRequest,
    ) -> Result<CreatedTask, RunwayApiError> {
        self.create_text_to_image(request).await
    }

    async fn image_to_video(
        &self,
        request: &ImageToVideoRequest,
    ) -> Result<CreatedTask, RunwayApiError> {
        self.create_image_to_video(request).await
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskRecord, RunwayApiError> {
        RunwayApi::get_task(self, task_id).await
    }
}

/// Poll `task_id` until it yields an output URL, fails, or `config` runs out.
///
/// A status lookup that fails (transport or non-2xx) aborts the wait and is
/// returned unchanged so the caller can relay it.
pub async fn wait_for_output(
    provider: &dyn GenerationProvider,
    task_id: &str,
    config: &PollConfig,
) -> Result<PollOutcome<String>, RunwayApiError> {
    let outcome = poll_until(
        config,
        |_attempt| provider.get_task(task_id),
        |record: &TaskRecord| classify_task(&record.snapshot),
    )
    .await?;

    match &outcome {
        PollOutcome::Succeeded { attempts, .. } => {
            tracing::info!(task_id, attempts, "Task succeeded");
        }
        PollOutcome::Failed { reason, attempts } => {
            tracing::warn!(task_id, attempts, reason = %reason, "Task failed");
        }
        PollOutcome::TimedOut { attempts } => {
            tracing::warn!(task_id, attempts, "Gave up waiting for task");
        }
    }

    Ok(outcome)
}
