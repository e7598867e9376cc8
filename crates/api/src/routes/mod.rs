pub mod health;
pub mod media;
pub mod runway;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /runway/text_to_image          generate image and wait (POST)
/// /runway/image_to_video         start video task (POST)
/// /runway/task                   task status (GET)
///
/// /upload                        raw body to blob storage (POST)
/// /tts                           voiceover synthesis (POST)
/// /script                        script from ad brief (POST)
/// ```
///
/// Every route answers other methods with [`method_not_allowed`]. `OPTIONS`
/// never reaches a route; the CORS layer answers it.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/runway", runway::router())
        .merge(media::router())
}

/// Method fallback shared by every route.
pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
