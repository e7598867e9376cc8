//! Text-to-speech client.
//!
//! Sends voiceover text to the OpenAI speech endpoint and returns the MP3
//! bytes as-is.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::Serialize;

/// Production API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Speech model used for every request.
pub const SPEECH_MODEL: &str = "tts-1";

/// Voice used when the caller does not pick one.
pub const DEFAULT_VOICE: &str = "alloy";

/// Content type of synthesized audio.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Body of `POST /audio/speech`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub voice: &'a str,
    pub response_format: &'a str,
}

impl<'a> SpeechRequest<'a> {
    /// MP3 request for `text` spoken by `voice`.
    pub fn mp3(input: &'a str, voice: &'a str) -> Self {
        Self {
            model: SPEECH_MODEL,
            input,
            voice,
            response_format: "mp3",
        }
    }
}

/// Errors from the speech API.
#[derive(Debug, thiserror::Error)]
pub enum SpeechApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Speech API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The configured base URL cannot be used to build endpoint URLs.
    #[error("Invalid speech API URL: {0}")]
    InvalidUrl(String),
}

/// Something that can turn text into spoken audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice`, returning MP3 bytes.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, SpeechApiError>;
}

/// HTTP client for the OpenAI speech endpoint.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl OpenAiSpeech {
    /// Create a client for the API rooted at `api_url`.
    pub fn new(api_url: &str, api_key: impl Into<String>) -> Result<Self, SpeechApiError> {
        let mut endpoint = Url::parse(api_url)
            .map_err(|e| SpeechApiError::InvalidUrl(format!("{api_url}: {e}")))?;
        endpoint
            .path_segments_mut()
            .map_err(|()| SpeechApiError::InvalidUrl(api_url.to_string()))?
            .pop_if_empty()
            .extend(["audio", "speech"]);

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, SpeechApiError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&SpeechRequest::mp3(text, voice))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), voice, "Speech request rejected");
            return Err(SpeechApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?;
        tracing::info!(
            voice,
            chars = text.chars().count(),
            bytes = audio.len(),
            "Synthesized voiceover"
        );
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_rooted_at_api_url() {
        let speech = OpenAiSpeech::new(DEFAULT_API_URL, "key").unwrap();
        assert_eq!(
            speech.endpoint.as_str(),
            "https://api.openai.com/v1/audio/speech"
        );

        let local = OpenAiSpeech::new("http://localhost:4010/v1/", "key").unwrap();
        assert_eq!(local.endpoint.as_str(), "http://localhost:4010/v1/audio/speech");
    }

    #[test]
    fn request_asks_for_mp3() {
        let body = serde_json::to_value(SpeechRequest::mp3("Hello there", "nova")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "tts-1",
                "input": "Hello there",
                "voice": "nova",
                "response_format": "mp3",
            })
        );
    }
}
