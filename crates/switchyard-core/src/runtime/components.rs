//! Component container for the runtime.

use crate::{
    auth::{CookieCredential, CredentialChain, StaticCredential},
    availability::ApiAvailabilityChecker,
    http::ApiClient,
    store::SessionStore,
    upload::UploadService,
};
use std::sync::Arc;

/// Every initialized component, shared behind `Arc`.
#[derive(Clone)]
pub struct SwitchyardComponents {
    session: Arc<SessionStore>,
    local: Arc<SessionStore>,
    checker: Arc<ApiAvailabilityChecker>,
    cookie: Arc<CookieCredential>,
    token: Arc<StaticCredential>,
    credentials: Arc<CredentialChain>,
    api_client: Arc<ApiClient>,
    upload_service: Arc<UploadService>,
}

impl SwitchyardComponents {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        session: Arc<SessionStore>,
        local: Arc<SessionStore>,
        checker: Arc<ApiAvailabilityChecker>,
        cookie: Arc<CookieCredential>,
        token: Arc<StaticCredential>,
        credentials: Arc<CredentialChain>,
        api_client: Arc<ApiClient>,
        upload_service: Arc<UploadService>,
    ) -> Self {
        Self { session, local, checker, cookie, token, credentials, api_client, upload_service }
    }

    /// Store for per-session data: the selected endpoint and its cache record.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Store for long-lived data: credentials and the language preference.
    #[must_use]
    pub fn local(&self) -> &Arc<SessionStore> {
        &self.local
    }

    #[must_use]
    pub fn checker(&self) -> &Arc<ApiAvailabilityChecker> {
        &self.checker
    }

    /// Cookie source of the credential chain; its header can be swapped at runtime.
    #[must_use]
    pub fn cookie(&self) -> &Arc<CookieCredential> {
        &self.cookie
    }

    /// Host-provided token source of the credential chain.
    #[must_use]
    pub fn token(&self) -> &Arc<StaticCredential> {
        &self.token
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialChain> {
        &self.credentials
    }

    #[must_use]
    pub fn api_client(&self) -> &Arc<ApiClient> {
        &self.api_client
    }

    #[must_use]
    pub fn upload_service(&self) -> &Arc<UploadService> {
        &self.upload_service
    }
}
