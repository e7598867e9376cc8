use reelsmith_core::task::TaskStatus;

/// Errors surfaced by [`crate::client::StudioClient`] and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status. `body` is shown as-is.
    #[error("{body} (HTTP {status})")]
    Server { status: u16, body: String },

    /// The service base URL is unusable.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The video task ended in a failure state.
    #[error("Video failed: {0}")]
    VideoFailed(TaskStatus),

    /// The video task was still running when polling gave up.
    #[error("Video failed: still {last} after {attempts} checks")]
    VideoTimedOut { last: TaskStatus, attempts: u32 },
}

pub type Result<T> = std::result::Result<T, StudioError>;
