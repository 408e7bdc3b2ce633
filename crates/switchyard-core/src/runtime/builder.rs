//! Builder for [`SwitchyardRuntime`].

use crate::{
    auth::{CookieCredential, CredentialChain, StaticCredential},
    availability::ApiAvailabilityChecker,
    config::AppConfig,
    failover::{EndpointProbe, HttpProbe, HttpProbeConfig, ProbeError},
    http::{ApiClient, RequestError},
    store::{SessionStore, StoreError},
    upload::{UploadError, UploadService},
};
use std::{path::Path, sync::Arc};
use thiserror::Error;
use tracing::{debug, info};

use super::{SwitchyardComponents, SwitchyardRuntime};

/// Errors that can occur during runtime initialization.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    #[error("Failed to load session state: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to initialize endpoint probe: {0}")]
    Probe(#[from] ProbeError),

    #[error("Failed to initialize API client: {0}")]
    Client(#[from] RequestError),

    #[error("Failed to initialize upload service: {0}")]
    Upload(#[from] UploadError),
}

/// Builder for constructing a [`SwitchyardRuntime`].
///
/// Stores are loaded from the configured snapshot files unless supplied
/// directly. The probe defaults to an [`HttpProbe`] built from the `[api]`
/// probe settings.
///
/// ```no_run
/// # use switchyard_core::{config::AppConfig, runtime::SwitchyardRuntime};
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let runtime = SwitchyardRuntime::builder()
///     .with_config(AppConfig::load()?)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SwitchyardRuntimeBuilder {
    config: Option<AppConfig>,
    probe: Option<Arc<dyn EndpointProbe>>,
    session: Option<Arc<SessionStore>>,
    local: Option<Arc<SessionStore>>,
}

impl SwitchyardRuntimeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the HTTP probe, e.g. with a scripted one in tests.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn EndpointProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub fn with_session_store(mut self, store: Arc<SessionStore>) -> Self {
        self.session = Some(store);
        self
    }

    #[must_use]
    pub fn with_local_store(mut self, store: Arc<SessionStore>) -> Self {
        self.local = Some(store);
        self
    }

    /// Validates the configuration and wires every component.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] if the configuration is missing or invalid, a
    /// snapshot file cannot be read, or an HTTP client cannot be built.
    pub fn build(self) -> Result<SwitchyardRuntime, RuntimeError> {
        let config = self.config.ok_or_else(|| {
            RuntimeError::ConfigValidation("No configuration provided".to_string())
        })?;

        config.validate().map_err(RuntimeError::ConfigValidation)?;

        info!(
            url_mode = ?config.api.url_mode,
            endpoints = config.api.static_base_urls.len(),
            strategy = ?config.api.probe_strategy,
            upload_enabled = config.upload.enabled,
            "Initializing switchyard runtime"
        );

        let session = match self.session {
            Some(store) => store,
            None => Arc::new(load_store(config.session.cache_file.as_deref())?),
        };
        let local = match self.local {
            Some(store) => store,
            None => Arc::new(load_store(config.session.state_file.as_deref())?),
        };
        debug!(session_entries = session.len(), local_entries = local.len(), "Stores ready");

        let probe: Arc<dyn EndpointProbe> = match self.probe {
            Some(probe) => probe,
            None => Arc::new(HttpProbe::new(HttpProbeConfig {
                path: config.api.probe_path.clone(),
                attempts: config.api.probe_attempts,
                connect_timeout_ms: config.api.probe_timeout_ms,
            })?),
        };

        let checker =
            Arc::new(ApiAvailabilityChecker::new(config.api.clone(), session.clone(), probe));
        debug!("Availability checker initialized");

        let site_name = config.session.site_name.as_str();
        let mut cookie = CookieCredential::new(site_name);
        if let Some(header) = &config.session.cookie {
            cookie = cookie.with_header(header.clone());
        }
        let cookie = Arc::new(cookie);
        let token = Arc::new(StaticCredential::new(config.session.token.clone()));
        let credentials = Arc::new(CredentialChain::standard(
            local.clone(),
            cookie.clone(),
            token.clone(),
            site_name,
        ));
        debug!(sources = credentials.len(), "Credential chain initialized");

        let api_client = Arc::new(ApiClient::new(
            config.api.clone(),
            config.request.clone(),
            config.session.language.clone(),
            checker.clone(),
            credentials.clone(),
            local.clone(),
        )?);
        debug!("API client initialized");

        let upload_service = Arc::new(UploadService::new(config.upload.clone())?);
        debug!(valid = upload_service.is_config_valid(), "Upload service initialized");

        let components = SwitchyardComponents::new(
            session,
            local,
            checker,
            cookie,
            token,
            credentials,
            api_client,
            upload_service,
        );

        info!("Switchyard runtime initialized");
        Ok(SwitchyardRuntime::new(components, config))
    }
}

fn load_store(path: Option<&Path>) -> Result<SessionStore, StoreError> {
    match path {
        Some(path) => SessionStore::load(path),
        None => Ok(SessionStore::new()),
    }
}
