//! Route definitions for Runway generation, mounted at `/runway`.

use axum::routing::{get, post};
use axum::Router;

use super::method_not_allowed;
use crate::handlers::runway;
use crate::state::AppState;

/// ```text
/// POST /text_to_image     -> text_to_image
/// POST /image_to_video    -> image_to_video
/// GET  /task              -> get_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/text_to_image",
            post(runway::text_to_image).fallback(method_not_allowed),
        )
        .route(
            "/image_to_video",
            post(runway::image_to_video).fallback(method_not_allowed),
        )
        .route("/task", get(runway::get_task).fallback(method_not_allowed))
}
