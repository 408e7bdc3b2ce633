use thiserror::Error;

/// Errors raised while ordering candidates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Nothing to select from: every candidate is disabled or the set is empty.
    /// This is a configuration error and is fatal to the pass.
    #[error("no enabled candidates to select from")]
    EmptyCandidateSet,
}

/// Reasons a single probe attempt failed.
///
/// These never leave the probe: [`HttpProbe`](super::probe::HttpProbe) folds
/// them into `reachable = false` and logs them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,

    #[error("probe network error: {0}")]
    Network(String),

    #[error("invalid probe url: {0}")]
    InvalidUrl(String),

    #[error("server answered with status {0}")]
    ServerStatus(u16),

    #[error("probe client build failed: {0}")]
    ClientBuild(String),
}
