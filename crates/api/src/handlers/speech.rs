//! Handler for voiceover synthesis.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use reelsmith_core::error::CoreError;
use reelsmith_speech::{AUDIO_CONTENT_TYPE, DEFAULT_VOICE};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::LenientJson;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SpeechBody {
    pub text: String,
    pub voice: Option<String>,
}

/// POST /api/tts
///
/// Returns the synthesized MP3 as the response body.
pub async fn tts(
    State(state): State<AppState>,
    LenientJson(body): LenientJson<SpeechBody>,
) -> AppResult<impl IntoResponse> {
    let synthesizer = state.speech()?;

    let text = body.text.trim();
    if text.is_empty() {
        return Err(CoreError::Validation("Missing text".to_string()).into());
    }
    let voice = body
        .voice
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VOICE);

    let audio = synthesizer.synthesize(text, voice).await?;
    tracing::info!(voice, chars = text.len(), bytes = audio.len(), "Synthesized voiceover");

    Ok(([(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)], audio))
}
