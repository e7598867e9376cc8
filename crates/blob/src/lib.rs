//! Blob storage upload client.
//!
//! Uploads raw bytes to Vercel Blob and returns the public URL. Objects are
//! written with a one-year immutable cache policy, since every upload gets a
//! fresh URL.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::Deserialize;

/// Production blob API base URL.
pub const DEFAULT_API_URL: &str = "https://blob.vercel-storage.com";

/// Cache policy applied to every stored object.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Content type used when the caller does not supply one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const BLOB_CONTENT_TYPE_HEADER: &str = "X-Blob-Content-Type";
const BLOB_CACHE_CONTROL_HEADER: &str = "X-Blob-Cache-Control";

/// A successfully stored object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredBlob {
    /// Public URL of the object.
    pub url: String,
}

/// Errors from the blob storage API.
#[derive(Debug, thiserror::Error)]
pub enum BlobApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-2xx status code.
    #[error("Blob API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The configured base URL cannot be used to build object URLs.
    #[error("Invalid blob API URL: {0}")]
    InvalidUrl(String),
}

/// Somewhere uploaded media can be put and served from.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` under `filename` and return its public URL.
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredBlob, BlobApiError>;
}

/// HTTP client for the Vercel Blob API.
pub struct VercelBlobApi {
    client: reqwest::Client,
    api_url: Url,
    token: String,
}

impl VercelBlobApi {
    /// Create a client for `api_url` authenticated with a read-write token.
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self, BlobApiError> {
        let api_url =
            Url::parse(api_url).map_err(|e| BlobApiError::InvalidUrl(format!("{api_url}: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(BlobApiError::InvalidUrl(api_url.to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_url,
            token: token.into(),
        })
    }

    /// Object URL for `filename`, percent-encoded as a single path segment.
    fn object_url(&self, filename: &str) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(filename);
        }
        url
    }
}

#[async_trait]
impl BlobStore for VercelBlobApi {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredBlob, BlobApiError> {
        let size = body.len();
        let response = self
            .client
            .post(self.object_url(filename))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, content_type)
            .header(BLOB_CONTENT_TYPE_HEADER, content_type)
            .header(BLOB_CACHE_CONTROL_HEADER, CACHE_CONTROL)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), filename, "Blob upload rejected");
            return Err(BlobApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let stored: StoredBlob = response.json().await?;
        tracing::info!(filename, size, url = %stored.url, "Uploaded blob");
        Ok(stored)
    }
}
