use super::types::Reply;
use crate::error::Error;

impl Error {
    /// Converts a request failure into the reply sent to the control window.
    ///
    /// Internal failures are logged and replaced with a generic message.
    #[must_use]
    pub fn into_reply(self) -> Reply {
        match self {
            Self::InvalidSession
            | Self::RateLimitExceeded
            | Self::ValidationFailed(_)
            | Self::InvalidData
            | Self::TargetWindowNotOpen => Reply::failed(self.to_string()),
            Self::Window(_) | Self::Crypto(_) | Self::Config(_) => {
                tracing::error!(error = %self, "Coordinator internal error");
                Reply::failed("An error occurred while processing your request")
            }
        }
    }
}

impl From<Error> for Reply {
    fn from(e: Error) -> Self {
        e.into_reply()
    }
}
