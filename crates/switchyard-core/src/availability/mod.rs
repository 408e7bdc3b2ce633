//! API base URL availability checking.
//!
//! With more than one static base URL configured, the checker probes them in
//! failover order and mirrors the winner into the session store under
//! [`API_AVAILABLE_URL_KEY`]. The time-boxed [`API_CACHE_DATA_KEY`] entry stays
//! authoritative: once it expires the mirrored URL is dropped as well.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    config::{ApiConfig, UrlMode},
    failover::{
        Candidate, EndpointProbe, FailoverOrchestrator, OrchestratorConfig, Resolution,
        ResolutionSource,
    },
    store::{SelectionCache, SessionStore, API_AVAILABLE_URL_KEY, API_CACHE_DATA_KEY},
};

/// Path of the view that runs an interactive check.
pub const VALIDATION_PATH: &str = "/api-validation";

/// Route name of the validation view.
pub const VALIDATION_ROUTE_NAME: &str = "ApiValidation";

/// A navigation target handed back to the host router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub path: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

impl RouteLocation {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { name: None, path: path.into(), query: BTreeMap::new() }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_validation_view(&self) -> bool {
        match &self.name {
            Some(name) => name == VALIDATION_ROUTE_NAME,
            None => self.path == VALIDATION_PATH,
        }
    }

    /// Location of the validation view that returns to `current` afterwards.
    ///
    /// Keys already present in the current query take precedence over `redirect`.
    #[must_use]
    pub fn validation_for(current: &Self) -> Self {
        let back = if current.path == VALIDATION_PATH { "/" } else { current.path.as_str() };

        let mut query = BTreeMap::new();
        query.insert("redirect".to_string(), back.to_string());
        query.extend(current.query.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self { name: None, path: VALIDATION_PATH.to_string(), query }
    }
}

/// Result of [`ApiAvailabilityChecker::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Checking does not apply to this configuration.
    Skipped,
    /// A base URL is known.
    Resolved { url: String, source: ResolutionSource },
    /// The host should navigate here to run the check interactively.
    Redirect(RouteLocation),
    /// Nothing decided yet; the caller is already on the validation view or
    /// did not ask for a redirect.
    Pending,
}

pub struct ApiAvailabilityChecker {
    api: ApiConfig,
    session: Arc<SessionStore>,
    orchestrator: FailoverOrchestrator,
}

impl ApiAvailabilityChecker {
    #[must_use]
    pub fn new(api: ApiConfig, session: Arc<SessionStore>, probe: Arc<dyn EndpointProbe>) -> Self {
        let cache = SelectionCache::new(session.clone(), API_CACHE_DATA_KEY, api.selection_ttl());
        let orchestrator = FailoverOrchestrator::new(
            Candidate::from_urls(&api.static_base_urls),
            probe,
            cache,
            OrchestratorConfig {
                policy: api.selection_policy,
                strategy: api.probe_strategy,
                probe_timeout: api.probe_timeout(),
                failover_delay: api.failover_delay(),
            },
        );

        Self { api, session, orchestrator }
    }

    #[must_use]
    pub fn orchestrator(&self) -> &FailoverOrchestrator {
        &self.orchestrator
    }

    /// True iff middleware mode is off, URLs are static and there is more than one.
    #[must_use]
    pub fn should_check(&self) -> bool {
        !self.api.middleware_enabled
            && self.api.url_mode == UrlMode::Static
            && self.api.static_base_urls.len() > 1
    }

    fn first_static_url(&self) -> String {
        self.api.static_base_urls.first().cloned().unwrap_or_default()
    }

    /// The committed selection while it is inside the validity window and
    /// still a candidate. Otherwise the mirrored URL key is dropped.
    fn fresh_selection(&self) -> Option<String> {
        let candidates = self.orchestrator.candidates();
        let fresh = self.orchestrator.cache().read().filter(|selection| {
            candidates.iter().any(|c| c.enabled && c.id == selection.url)
        });

        if let Some(selection) = fresh {
            return Some(selection.url);
        }

        if let Some(stale) = self.session.remove(API_AVAILABLE_URL_KEY) {
            tracing::debug!(url = %stale, "stored API URL outlived its selection, dropped");
        }
        None
    }

    /// Base URL to use right now. Never blocks and never probes.
    ///
    /// Falls back to the first configured URL once the selection has expired.
    #[must_use]
    pub fn available_url(&self) -> String {
        if !self.should_check() {
            return self.first_static_url();
        }

        self.fresh_selection().unwrap_or_else(|| self.first_static_url())
    }

    /// Resolves the base URL without any navigation.
    ///
    /// Returns `None` when checking does not apply or nothing is configured.
    /// A committed result is mirrored into [`API_AVAILABLE_URL_KEY`]; a
    /// fallback is returned but not stored.
    pub async fn silent_check(&self) -> Option<Resolution> {
        if !self.should_check() {
            return None;
        }

        match self.orchestrator.resolve().await {
            Ok(resolution) => {
                if resolution.source == ResolutionSource::Fallback {
                    self.session.remove(API_AVAILABLE_URL_KEY);
                } else {
                    self.session.set(API_AVAILABLE_URL_KEY, resolution.url.clone());
                }
                Some(resolution)
            }
            Err(e) => {
                tracing::error!(error = %e, "API availability check failed");
                None
            }
        }
    }

    /// Drops any cached selection and checks again.
    pub async fn recheck(&self) -> Option<Resolution> {
        self.orchestrator.invalidate();
        self.session.remove(API_AVAILABLE_URL_KEY);
        self.silent_check().await
    }

    /// Startup entry point.
    ///
    /// A selection still inside its validity window wins. Silent mode resolves
    /// in place. Otherwise the caller is sent to the validation view unless it
    /// is already there.
    pub async fn init(&self, redirect: bool, current: &RouteLocation) -> CheckOutcome {
        if !self.should_check() {
            return CheckOutcome::Skipped;
        }

        if let Some(url) = self.fresh_selection() {
            self.session.set(API_AVAILABLE_URL_KEY, url.clone());
            return CheckOutcome::Resolved { url, source: ResolutionSource::Cached };
        }

        if self.api.silent_check {
            return match self.silent_check().await {
                Some(resolution) => {
                    CheckOutcome::Resolved { url: resolution.url, source: resolution.source }
                }
                None => CheckOutcome::Pending,
            };
        }

        if redirect && !current.is_validation_view() {
            let target = RouteLocation::validation_for(current);
            tracing::info!(from = %current.path, "redirecting to API validation view");
            return CheckOutcome::Redirect(target);
        }

        CheckOutcome::Pending
    }
}
