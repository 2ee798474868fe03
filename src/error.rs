#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid session")]
    InvalidSession,

    #[error("Rate limit exceeded. Please wait before trying again.")]
    RateLimitExceeded,

    /// Carries the first validation error.
    #[error("{0}")]
    ValidationFailed(String),

    #[error("Invalid data format")]
    InvalidData,

    #[error("CEAC website window is not open")]
    TargetWindowNotOpen,

    #[error("Window error: {0}")]
    Window(String),

    #[error("Failed to {0}")]
    Crypto(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}
