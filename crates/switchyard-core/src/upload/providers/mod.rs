//! Upload provider adapters.
//!
//! Every adapter owns only its envelope translation: how the file is sent and
//! how success and the public URL are read back. Ordering and failover live
//! in [`UploadService`](super::UploadService).

mod custom;
mod envelope;
mod webdav;

pub use custom::CustomProvider;
pub use envelope::{EnvelopeProvider, EnvelopeFormat};
pub use webdav::{unique_file_name, WebDavProvider};

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use super::{
    errors::UploadError,
    types::{FilePayload, UploadOutcome},
};
use crate::{
    config::{ImageBedConfig, ImageBedKind},
    failover::Ranked,
};

/// Capability every upload target implements.
#[async_trait]
pub trait UploadProvider: Send + Sync {
    /// Display name used in logs and errors.
    fn name(&self) -> &str;

    /// Envelope family, e.g. `imgbb` or `webdav`.
    fn kind(&self) -> &'static str;

    async fn upload(&self, file: &FilePayload) -> Result<UploadOutcome, UploadError>;
}

/// A provider with its place in the failover order.
#[derive(Clone)]
pub struct RankedProvider {
    pub provider: Arc<dyn UploadProvider>,
    pub priority: u32,
    pub enabled: bool,
}

impl RankedProvider {
    #[must_use]
    pub fn new(provider: Arc<dyn UploadProvider>, priority: u32) -> Self {
        Self { provider, priority, enabled: true }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.provider.name()
    }
}

impl std::fmt::Debug for RankedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankedProvider")
            .field("name", &self.provider.name())
            .field("kind", &self.provider.kind())
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Ranked for RankedProvider {
    fn priority(&self) -> u32 {
        self.priority
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Builds the adapter for one configured image host.
#[must_use]
pub fn build_image_bed(config: &ImageBedConfig, client: Client) -> Arc<dyn UploadProvider> {
    let name = config.display_name().to_string();
    match config.kind {
        ImageBedKind::Imgbb => Arc::new(EnvelopeProvider::new(
            EnvelopeFormat::imgbb(&config.api_key),
            name,
            config.api_url.clone(),
            config.headers.clone(),
            client,
        )),
        ImageBedKind::Smms => Arc::new(EnvelopeProvider::new(
            EnvelopeFormat::smms(),
            name,
            config.api_url.clone(),
            config.headers.clone(),
            client,
        )),
        ImageBedKind::Chevereto => Arc::new(EnvelopeProvider::new(
            EnvelopeFormat::chevereto(),
            name,
            config.api_url.clone(),
            config.headers.clone(),
            client,
        )),
        ImageBedKind::Lsky => Arc::new(EnvelopeProvider::new(
            EnvelopeFormat::lsky(),
            name,
            config.api_url.clone(),
            config.headers.clone(),
            client,
        )),
        ImageBedKind::Custom => Arc::new(CustomProvider::new(config, client)),
    }
}

/// Builds ranked adapters for every configured host, disabled ones included.
#[must_use]
pub fn build_image_beds(configs: &[ImageBedConfig], client: &Client) -> Vec<RankedProvider> {
    configs
        .iter()
        .map(|config| RankedProvider {
            provider: build_image_bed(config, client.clone()),
            priority: config.priority,
            enabled: config.enabled,
        })
        .collect()
}

/// Shared transport for multipart image hosts.
pub(crate) mod transport {
    use reqwest::{
        multipart::{Form, Part},
        Client, StatusCode,
    };
    use serde_json::Value;
    use std::collections::BTreeMap;

    use crate::upload::{errors::UploadError, types::FilePayload};

    pub(crate) fn file_part(provider: &str, file: &FilePayload) -> Result<Part, UploadError> {
        Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| UploadError::failed(provider, None, format!("invalid content type: {e}")))
    }

    pub(crate) fn status_line(status: StatusCode) -> String {
        match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_u16()),
            None => status.as_u16().to_string(),
        }
    }

    pub(crate) fn transport_message(error: &reqwest::Error) -> String {
        if error.is_timeout() {
            "upload timed out".to_string()
        } else if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// POSTs `form` and returns the decoded JSON body of a 2xx response.
    pub(crate) async fn post_form(
        client: &Client,
        provider: &str,
        api_url: &str,
        headers: &BTreeMap<String, String>,
        form: Form,
    ) -> Result<Value, UploadError> {
        let mut request = client.post(api_url).multipart(form);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(provider, error = %e, "upload request failed");
            UploadError::failed(provider, None, transport_message(&e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::failed(provider, Some(status.as_u16()), status_line(status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|_| UploadError::failed(provider, None, "response parse failed"))
    }

    /// String at a nested object path, e.g. `["data", "url"]`.
    pub(crate) fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
        path.iter().try_fold(value, |node, key| node.get(key))?.as_str()
    }
}
