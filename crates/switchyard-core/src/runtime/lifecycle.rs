//! Runtime container and shutdown handling.

use crate::{
    availability::ApiAvailabilityChecker,
    config::AppConfig,
    http::ApiClient,
    store::{SessionStore, StoreError},
    upload::UploadService,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{info, warn};

use super::{builder::SwitchyardRuntimeBuilder, SwitchyardComponents};

/// Owns the initialized components and writes the stores back on shutdown.
pub struct SwitchyardRuntime {
    components: SwitchyardComponents,
    config: AppConfig,
    shutdown_initiated: AtomicBool,
}

impl SwitchyardRuntime {
    #[must_use]
    pub fn builder() -> SwitchyardRuntimeBuilder {
        SwitchyardRuntimeBuilder::new()
    }

    pub(super) fn new(components: SwitchyardComponents, config: AppConfig) -> Self {
        Self { components, config, shutdown_initiated: AtomicBool::new(false) }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn components(&self) -> &SwitchyardComponents {
        &self.components
    }

    #[must_use]
    pub fn checker(&self) -> &Arc<ApiAvailabilityChecker> {
        self.components.checker()
    }

    #[must_use]
    pub fn api_client(&self) -> &Arc<ApiClient> {
        self.components.api_client()
    }

    #[must_use]
    pub fn upload_service(&self) -> &Arc<UploadService> {
        self.components.upload_service()
    }

    #[must_use]
    pub fn session_store(&self) -> &Arc<SessionStore> {
        self.components.session()
    }

    #[must_use]
    pub fn local_store(&self) -> &Arc<SessionStore> {
        self.components.local()
    }

    /// Replaces the `Cookie` header the cookie credential reads from.
    pub fn set_cookie_header(&self, header: Option<String>) {
        self.components.cookie().set_header(header);
    }

    /// Replaces the host-provided token.
    pub fn set_token(&self, token: Option<String>) {
        self.components.token().set(token);
    }

    /// True when any credential source currently yields a token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.components.credentials().resolve().is_some()
    }

    /// Name of the credential source that would be used right now.
    #[must_use]
    pub fn active_credential(&self) -> Option<&'static str> {
        self.components.credentials().resolve_with_source().map(|(source, _)| source)
    }

    /// Writes both stores to their configured snapshot files.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a snapshot cannot be written.
    pub fn persist(&self) -> Result<(), StoreError> {
        let session = &self.config.session;
        if let Some(path) = &session.cache_file {
            self.session_store().persist(path)?;
        }
        if let Some(path) = &session.state_file {
            self.local_store().persist(path)?;
        }
        Ok(())
    }

    /// Persists the stores once. Later calls are no-ops.
    pub fn shutdown(&self) {
        if self.shutdown_initiated.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("Shutting down switchyard runtime");
        if let Err(e) = self.persist() {
            warn!(error = %e, "failed to persist session state");
        }
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }
}
