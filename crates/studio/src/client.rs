//! HTTP client for a running Reelsmith service.
//!
//! Mirrors the ad studio form: build a script, voice it, optionally upload a
//! seed image, start the video and poll until it is ready.

use bytes::Bytes;
use reelsmith_core::poll::{poll_until, PollConfig, PollOutcome};
use reelsmith_core::script::{build_script, AdBrief};
use reelsmith_core::task::{classify_task, TaskSnapshot, TaskStatus};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// Service URL used when none is configured.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3000";

/// Body of `POST /api/runway/image_to_video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub prompt_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_image: Option<String>,
    pub ratio: String,
    /// Sent as a string, like a form field.
    pub duration: String,
    pub model: String,
}

impl VideoRequest {
    /// Request with the form's defaults: portrait, 5 seconds, `gen4_turbo`.
    pub fn new(prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            prompt_image: None,
            ratio: reelsmith_core::normalize::RATIO_PORTRAIT.to_string(),
            duration: reelsmith_core::normalize::DEFAULT_DURATION_SECS.to_string(),
            model: reelsmith_core::normalize::VIDEO_MODEL.to_string(),
        }
    }
}

/// Pick the seed image for a video: an uploaded image wins over a
/// reference URL. Blank values count as absent.
pub fn choose_prompt_image(uploaded: Option<&str>, reference: Option<&str>) -> Option<String> {
    [uploaded, reference]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStarted {
    task_id: String,
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    voice: &'a str,
}

/// Client for the Reelsmith HTTP service.
pub struct StudioClient {
    http: reqwest::Client,
    base_url: Url,
    poll: PollConfig,
}

impl StudioClient {
    /// Client for the service at `base_url`, polling with the client preset.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| StudioError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StudioError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            poll: PollConfig::client(),
        })
    }

    /// Replace the poll loop used by [`Self::wait_for_video`].
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Build the voiceover script locally.
    pub fn script(&self, brief: &AdBrief) -> String {
        build_script(brief)
    }

    /// Synthesize `text` and return the MP3 bytes.
    pub async fn voiceover(&self, text: &str, voice: &str) -> Result<Bytes> {
        let response = self
            .http
            .post(self.endpoint(&["api", "tts"]))
            .json(&SpeechBody { text, voice })
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?)
    }

    /// Upload a file to blob storage and return its public URL.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint(&["api", "upload"]))
            .query(&[("filename", filename), ("contentType", content_type)])
            .body(body)
            .send()
            .await?;
        let uploaded: UploadResponse = ensure_success(response).await?.json().await?;
        tracing::info!(url = %uploaded.url, "Image uploaded");
        Ok(uploaded.url)
    }

    /// Start a video task and return its id.
    pub async fn start_video(&self, request: &VideoRequest) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint(&["api", "runway", "image_to_video"]))
            .json(request)
            .send()
            .await?;
        let started: VideoStarted = ensure_success(response).await?.json().await?;
        tracing::info!(task_id = %started.task_id, "Video task started");
        Ok(started.task_id)
    }

    /// One status lookup.
    pub async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot> {
        let response = self
            .http
            .get(self.endpoint(&["api", "runway", "task"]))
            .query(&[("id", task_id)])
            .send()
            .await?;
        let mut snapshot: TaskSnapshot = ensure_success(response).await?.json().await?;
        if snapshot.id.is_empty() {
            snapshot.id = task_id.to_string();
        }
        Ok(snapshot)
    }

    /// Poll a video task until it has an output URL.
    ///
    /// `on_status` sees every observed status, in order.
    pub async fn wait_for_video(
        &self,
        task_id: &str,
        mut on_status: impl FnMut(TaskStatus),
    ) -> Result<String> {
        let mut last = TaskStatus::Pending;

        let outcome = poll_until(
            &self.poll,
            |_attempt| self.task_status(task_id),
            |snapshot: &TaskSnapshot| {
                last = snapshot.status;
                on_status(snapshot.status);
                classify_task(snapshot)
            },
        )
        .await?;

        match outcome {
            PollOutcome::Succeeded { value, .. } => Ok(value),
            PollOutcome::Failed { .. } => Err(StudioError::VideoFailed(last)),
            PollOutcome::TimedOut { attempts } => {
                Err(StudioError::VideoTimedOut { last, attempts })
            }
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %body, "Service rejected request");
    Err(StudioError::Server {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploaded_image_wins_over_reference() {
        assert_eq!(
            choose_prompt_image(Some("https://blob/a.png"), Some("https://ref/b.png")).as_deref(),
            Some("https://blob/a.png")
        );
    }

    #[test]
    fn reference_is_used_when_nothing_uploaded() {
        assert_eq!(
            choose_prompt_image(None, Some(" https://ref/b.png ")).as_deref(),
            Some("https://ref/b.png")
        );
        assert_eq!(
            choose_prompt_image(Some(""), Some("https://ref/b.png")).as_deref(),
            Some("https://ref/b.png")
        );
        assert_eq!(choose_prompt_image(None, Some("  ")), None);
    }

    #[test]
    fn video_request_omits_absent_image() {
        let json = serde_json::to_value(VideoRequest::new("hello")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "promptText": "hello",
                "ratio": "720:1280",
                "duration": "5",
                "model": "gen4_turbo",
            })
        );
    }

    #[test]
    fn endpoints_keep_base_path() {
        let client = StudioClient::new("http://host:3000/studio/").unwrap();
        assert_eq!(
            client.endpoint(&["api", "tts"]).as_str(),
            "http://host:3000/studio/api/tts"
        );
        let root = StudioClient::new("http://host:3000").unwrap();
        assert_eq!(
            root.endpoint(&["api", "runway", "task"]).as_str(),
            "http://host:3000/api/runway/task"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(StudioClient::new("mailto:someone@example.com").is_err());
        assert!(StudioClient::new("not a url").is_err());
    }
}
