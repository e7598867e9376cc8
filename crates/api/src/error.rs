use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reelsmith_blob::BlobApiError;
use reelsmith_core::error::CoreError;
use reelsmith_runway::RunwayApiError;
use reelsmith_speech::SpeechApiError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Errors raised by this service render as `{ "error", "code" }` JSON.
/// Non-2xx answers from an upstream provider are relayed verbatim: same
/// status, same body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `reelsmith_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A provider credential was not configured. Carries the env var name.
    #[error("Missing {0}")]
    MissingConfig(&'static str),

    /// Error talking to the generation provider.
    #[error(transparent)]
    Runway(#[from] RunwayApiError),

    /// Error talking to blob storage.
    #[error(transparent)]
    Blob(#[from] BlobApiError),

    /// Error talking to the speech provider.
    #[error(transparent)]
    Speech(#[from] SpeechApiError),

    /// A provider task reached a failure state.
    #[error("{0}")]
    TaskFailed(String),

    /// The poll loop ran out of attempts before the task finished.
    #[error("{0}")]
    Timeout(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }

            AppError::MissingConfig(var) => {
                tracing::error!(var, "Provider credential not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MISSING_CONFIG",
                    format!("Missing {var}"),
                )
            }

            // --- Upstream errors ---
            AppError::Runway(err) => match err {
                RunwayApiError::Api { status, body } => return relay(status, body),
                RunwayApiError::Request(e) => unreachable_upstream("Runway", &e),
                RunwayApiError::Decode(e) => {
                    tracing::error!(error = %e, "Unexpected Runway response");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_INVALID",
                        "Unexpected response from Runway".to_string(),
                    )
                }
                RunwayApiError::InvalidUrl(url) => {
                    tracing::error!(url = %url, "Invalid Runway API URL");
                    internal()
                }
            },
            AppError::Blob(err) => match err {
                BlobApiError::Api { status, body } => return relay(status, body),
                BlobApiError::Request(e) => unreachable_upstream("blob storage", &e),
                BlobApiError::InvalidUrl(url) => {
                    tracing::error!(url = %url, "Invalid blob API URL");
                    internal()
                }
            },
            AppError::Speech(err) => match err {
                SpeechApiError::Api { status, body } => return relay(status, body),
                SpeechApiError::Request(e) => unreachable_upstream("speech provider", &e),
                SpeechApiError::InvalidUrl(url) => {
                    tracing::error!(url = %url, "Invalid speech API URL");
                    internal()
                }
            },

            // --- Task outcomes ---
            AppError::TaskFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "TASK_FAILED", msg),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Pass an upstream rejection through unchanged.
fn relay(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, body).into_response()
}

fn unreachable_upstream(
    upstream: &'static str,
    err: &reqwest::Error,
) -> (StatusCode, &'static str, String) {
    tracing::error!(upstream, error = %err, "Upstream request failed");
    (
        StatusCode::BAD_GATEWAY,
        "UPSTREAM_UNAVAILABLE",
        format!("Could not reach {upstream}"),
    )
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
