//! Routes for uploads, voiceover and scripts, mounted at the `/api` root.

use axum::routing::post;
use axum::Router;

use super::method_not_allowed;
use crate::handlers::{script, speech, upload};
use crate::state::AppState;

/// ```text
/// POST /upload    -> upload
/// POST /tts       -> tts
/// POST /script    -> script
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload::upload).fallback(method_not_allowed))
        .route("/tts", post(speech::tts).fallback(method_not_allowed))
        .route("/script", post(script::script).fallback(method_not_allowed))
}
