use std::time::Duration;

use reelsmith_core::poll::PollConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). Must cover a full
    /// seed-image wait.
    pub request_timeout_secs: u64,
    /// Largest accepted request body in bytes (default: 25 MiB).
    pub max_upload_bytes: usize,
    /// Poll loop used while waiting on provider tasks.
    pub poll: PollConfig,
    /// Upstream credentials and endpoints.
    pub providers: ProviderConfig,
}

/// Upstream credentials and endpoints.
///
/// A missing credential is not a startup error: the corresponding endpoints
/// answer with a configuration error instead.
#[derive(Clone)]
pub struct ProviderConfig {
    pub runway_api_key: Option<String>,
    pub runway_api_url: String,
    pub runway_api_version: String,
    pub blob_token: Option<String>,
    pub blob_api_url: String,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("runway_api_key", &self.runway_api_key.as_ref().map(|_| "<redacted>"))
            .field("runway_api_url", &self.runway_api_url)
            .field("runway_api_version", &self.runway_api_version)
            .field("blob_token", &self.blob_token.as_ref().map(|_| "<redacted>"))
            .field("blob_api_url", &self.blob_api_url)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_api_url", &self.openai_api_url)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `*`                        |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                      |
    /// | `MAX_UPLOAD_BYTES`     | `26214400`                 |
    /// | `POLL_INTERVAL_MS`     | `5000`                     |
    /// | `POLL_JITTER_MS`       | `800`                      |
    /// | `POLL_MAX_ATTEMPTS`    | `36`                       |
    ///
    /// Provider settings are documented on [`ProviderConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "26214400".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let defaults = PollConfig::server();
        let poll = PollConfig {
            interval: Duration::from_millis(
                env_parse("POLL_INTERVAL_MS", defaults.interval.as_millis() as u64),
            ),
            jitter: Duration::from_millis(
                env_parse("POLL_JITTER_MS", defaults.jitter.as_millis() as u64),
            ),
            max_attempts: env_parse("POLL_MAX_ATTEMPTS", defaults.max_attempts),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            poll,
            providers: ProviderConfig::from_env(),
        }
    }
}

impl ProviderConfig {
    /// Load provider settings from environment variables.
    ///
    /// | Env Var                 | Default                           |
    /// |-------------------------|-----------------------------------|
    /// | `RUNWAY_API_KEY`        | unset                             |
    /// | `RUNWAY_API_URL`        | `https://api.dev.runwayml.com/v1` |
    /// | `RUNWAY_API_VERSION`    | `2024-11-06`                      |
    /// | `BLOB_READ_WRITE_TOKEN` | unset                             |
    /// | `BLOB_API_URL`          | `https://blob.vercel-storage.com` |
    /// | `OPENAI_API_KEY`        | unset                             |
    /// | `OPENAI_API_URL`        | `https://api.openai.com/v1`       |
    pub fn from_env() -> Self {
        Self {
            runway_api_key: optional_env("RUNWAY_API_KEY"),
            runway_api_url: std::env::var("RUNWAY_API_URL")
                .unwrap_or_else(|_| reelsmith_runway::api::DEFAULT_API_URL.into()),
            runway_api_version: std::env::var("RUNWAY_API_VERSION")
                .unwrap_or_else(|_| reelsmith_runway::api::DEFAULT_API_VERSION.into()),
            blob_token: optional_env("BLOB_READ_WRITE_TOKEN"),
            blob_api_url: std::env::var("BLOB_API_URL")
                .unwrap_or_else(|_| reelsmith_blob::DEFAULT_API_URL.into()),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| reelsmith_speech::DEFAULT_API_URL.into()),
        }
    }

    /// No credentials, default endpoints.
    pub fn unconfigured() -> Self {
        Self {
            runway_api_key: None,
            runway_api_url: reelsmith_runway::api::DEFAULT_API_URL.into(),
            runway_api_version: reelsmith_runway::api::DEFAULT_API_VERSION.into(),
            blob_token: None,
            blob_api_url: reelsmith_blob::DEFAULT_API_URL.into(),
            openai_api_key: None,
            openai_api_url: reelsmith_speech::DEFAULT_API_URL.into(),
        }
    }
}

/// Read a variable, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid number")),
        Err(_) => default,
    }
}
