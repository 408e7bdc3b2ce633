use thiserror::Error;

use crate::failover::SelectionError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// One provider failed. Recoverable while other providers remain.
    #[error("{provider} upload failed: {message}")]
    UploadFailed { provider: String, status: Option<u16>, message: String },

    /// Every provider tried in this pass failed; `message` is the last failure.
    #[error("all upload providers failed after {attempts} attempt(s): {message}")]
    AllProvidersFailed { attempts: usize, message: String },

    #[error("image upload is disabled")]
    Disabled,

    #[error("only image files can be uploaded")]
    NotAnImage,

    #[error("file size cannot exceed {limit}")]
    TooLarge { limit: String },

    #[error("incomplete upload configuration: {0}")]
    IncompleteConfig(String),

    #[error("no image hosts configured")]
    NoProviders,

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

impl UploadError {
    pub(crate) fn failed(provider: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UploadFailed { provider: provider.to_string(), status, message: message.into() }
    }

    /// True for failures a different provider might not have.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UploadFailed { .. })
    }
}
