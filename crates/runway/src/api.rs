//! REST client for the Runway generation API.
//!
//! Wraps task creation (`/text_to_image`, `/image_to_video`) and task
//! status lookup (`/tasks/{id}`) using [`reqwest`]. Every request carries
//! the bearer token and the pinned `X-Runway-Version` header.

use reelsmith_core::normalize::IMAGE_MODEL;
use reelsmith_core::task::TaskSnapshot;
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Production API base URL.
pub const DEFAULT_API_URL: &str = "https://api.dev.runwayml.com/v1";

/// API version the request shapes below are written against.
pub const DEFAULT_API_VERSION: &str = "2024-11-06";

const VERSION_HEADER: &str = "X-Runway-Version";

/// Connection settings for [`RunwayApi`].
#[derive(Debug, Clone)]
pub struct RunwayConfig {
    pub api_key: String,
    pub api_url: String,
    pub api_version: String,
}

impl RunwayConfig {
    /// Settings for the production API with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// Body of `POST /text_to_image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToImageRequest {
    pub model: String,
    pub prompt_text: String,
    pub ratio: String,
}

impl TextToImageRequest {
    /// Seed-image request using the fixed image model.
    pub fn new(prompt_text: impl Into<String>, ratio: impl Into<String>) -> Self {
        Self {
            model: IMAGE_MODEL.to_string(),
            prompt_text: prompt_text.into(),
            ratio: ratio.into(),
        }
    }
}

/// Body of `POST /image_to_video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageToVideoRequest {
    pub model: String,
    pub prompt_image: String,
    pub prompt_text: String,
    pub ratio: String,
    pub duration: u32,
}

/// Response of the task-creation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedTask {
    /// Provider-assigned task identifier.
    pub id: String,
}

/// A task status lookup: the typed snapshot plus the provider's full JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub snapshot: TaskSnapshot,
    pub raw: serde_json::Value,
}

impl TaskRecord {
    /// Parse a status payload, keeping the raw JSON alongside.
    pub fn from_raw(raw: serde_json::Value) -> Result<Self, RunwayApiError> {
        let snapshot = serde_json::from_value(raw.clone())?;
        Ok(Self { snapshot, raw })
    }
}

/// Errors from the Runway REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum RunwayApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Runway returned a non-2xx status code.
    #[error("Runway API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, relayed to callers unchanged.
        body: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected Runway response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot be used to build endpoint URLs.
    #[error("Invalid Runway API URL: {0}")]
    InvalidUrl(String),
}

/// HTTP client for the Runway API.
pub struct RunwayApi {
    client: reqwest::Client,
    api_url: Url,
    api_key: String,
    api_version: String,
}

impl RunwayApi {
    /// Create a new API client.
    pub fn new(config: RunwayConfig) -> Result<Self, RunwayApiError> {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        config: RunwayConfig,
    ) -> Result<Self, RunwayApiError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| RunwayApiError::InvalidUrl(format!("{}: {e}", config.api_url)))?;
        if api_url.cannot_be_a_base() {
            return Err(RunwayApiError::InvalidUrl(config.api_url));
        }
        Ok(Self {
            client,
            api_url,
            api_key: config.api_key,
            api_version: config.api_version,
        })
    }

    /// Start a text-to-image task. Returns the new task id.
    pub async fn create_text_to_image(
        &self,
        request: &TextToImageRequest,
    ) -> Result<CreatedTask, RunwayApiError> {
        let response = self
            .authorized(self.client.post(self.endpoint(&["text_to_image"])))
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Start an image-to-video task. Returns the new task id.
    pub async fn create_image_to_video(
        &self,
        request: &ImageToVideoRequest,
    ) -> Result<CreatedTask, RunwayApiError> {
        let response = self
            .authorized(self.client.post(self.endpoint(&["image_to_video"])))
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Look up the current status and output of a task.
    pub async fn get_task(&self, task_id: &str) -> Result<TaskRecord, RunwayApiError> {
        let response = self
            .authorized(self.client.get(self.endpoint(&["tasks", task_id])))
            .send()
            .await?;

        let raw: serde_json::Value = Self::parse_response(response).await?;
        TaskRecord::from_raw(raw)
    }

    // ---- private helpers ----

    /// Append path segments (percent-encoded) to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(VERSION_HEADER, &self.api_version)
    }

    /// Ensure the response has a success status code, or capture the status
    /// and body text as [`RunwayApiError::Api`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RunwayApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Runway request rejected");
            return Err(RunwayApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RunwayApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
