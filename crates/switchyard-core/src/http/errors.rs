use thiserror::Error;

/// Failures of a dispatched API request.
///
/// Messages are already localized for the active locale and can be shown to
/// users as they are.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The backend reported that the session is gone; the host should log out.
    #[error("{0}")]
    SessionExpired(String),

    /// Non-2xx response carrying a backend `message`.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// Non-2xx response without a usable message.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request build failed: {0}")]
    Build(String),
}

impl RequestError {
    /// HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }
}
