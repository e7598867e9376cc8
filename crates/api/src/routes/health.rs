use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use super::method_not_allowed;
use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every provider is configured, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub providers: ProviderHealth,
}

/// Which upstream credentials are configured.
#[derive(Serialize)]
pub struct ProviderHealth {
    pub runway: bool,
    pub blob: bool,
    pub speech: bool,
}

/// GET /health -- returns service status and provider configuration.
///
/// Reports configuration only; upstreams are not contacted.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers = ProviderHealth {
        runway: state.generation.is_some(),
        blob: state.blob_store.is_some(),
        speech: state.speech.is_some(),
    };

    let status = if providers.runway && providers.blob && providers.speech {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        providers,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check).fallback(method_not_allowed))
}
