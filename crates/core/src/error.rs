/// Errors raised by domain rules, before any provider is contacted.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Caller input is missing or unusable. The message is user-facing.
    #[error("Validation failed: {0}")]
    Validation(String),
}
