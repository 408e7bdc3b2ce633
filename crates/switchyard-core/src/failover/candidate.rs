use serde::{Deserialize, Serialize};

/// Anything the selector can order: API endpoints, upload providers.
pub trait Ranked {
    /// Lower values are tried first.
    fn priority(&self) -> u32;

    /// Only enabled items take part in selection.
    fn is_enabled(&self) -> bool;
}

/// One interchangeable endpoint eligible for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// URL or endpoint name.
    pub id: String,
    #[serde(default)]
    pub priority: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Candidate {
    #[must_use]
    pub fn new(id: impl Into<String>, priority: u32) -> Self {
        Self { id: id.into(), priority, enabled: true }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Builds candidates from an ordered URL list; list position becomes the priority.
    #[must_use]
    pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> Vec<Self> {
        urls.iter()
            .enumerate()
            .map(|(index, url)| Self::new(url.as_ref(), u32::try_from(index).unwrap_or(u32::MAX)))
            .collect()
    }
}

impl Ranked for Candidate {
    fn priority(&self) -> u32 {
        self.priority
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
