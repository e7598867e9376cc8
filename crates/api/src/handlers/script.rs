use axum::Json;
use reelsmith_core::script::{build_script, AdBrief};
use serde::Serialize;

use crate::extract::LenientJson;

#[derive(Debug, Serialize)]
pub struct ScriptResponse {
    pub script: String,
}

/// POST /api/script
///
/// Assembles a voiceover script from the brief. Needs no provider.
pub async fn script(LenientJson(brief): LenientJson<AdBrief>) -> Json<ScriptResponse> {
    Json(ScriptResponse {
        script: build_script(&brief),
    })
}
