//! Request extractors shared by the handlers.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

/// JSON body extractor that never rejects on content.
///
/// Browser forms post with assorted content types and sometimes with no
/// body at all. An empty or malformed body yields `T::default()`, and the
/// handler's own field validation decides what is missing. Only failures to
/// read the body (e.g. over the size limit) are rejected.
#[derive(Debug, Clone, Default)]
pub struct LenientJson<T>(pub T);

impl<S, T> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(Self(parse_lenient(&bytes)))
    }
}

/// Parse `bytes` as JSON, falling back to `T::default()`.
pub fn parse_lenient<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring malformed JSON body");
        T::default()
    })
}
