use reqwest::{Client, ClientBuilder};
use std::{sync::Arc, time::Duration};

use super::{
    errors::UploadError,
    providers::{build_image_bed, build_image_beds, RankedProvider, UploadProvider, WebDavProvider},
    types::{FilePayload, UploadConfigInfo, UploadOutcome, UploadedImage},
};
use crate::{
    config::{UploadConfig, UploadMethod},
    failover::{attempt_in_order, select, AttemptOutcome, AttemptPolicy},
};

/// Human-readable size with units Bytes/KB/MB/GB and at most two decimals.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && unit < UNITS.len() - 1 {
        scaled /= 1024;
        unit += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// `![alt](url)`, with `image` as the alt text when none is given.
#[must_use]
pub fn markdown_image(url: &str, alt: &str) -> String {
    let alt = if alt.trim().is_empty() { "image" } else { alt };
    format!("![{alt}]({url})")
}

/// Validates files and sends them to the configured upload target.
///
/// With `method = "imagebed"` and several hosts configured, hosts are ranked
/// by the strategy policy and tried one after another until one accepts the
/// file.
pub struct UploadService {
    config: UploadConfig,
    webdav: Arc<dyn UploadProvider>,
    image_beds: Vec<RankedProvider>,
    legacy: Arc<dyn UploadProvider>,
}

impl UploadService {
    /// # Errors
    ///
    /// Returns [`UploadError::IncompleteConfig`] if the HTTP client cannot be built.
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .use_rustls_tls()
            .user_agent(concat!("switchyard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build upload client");
                UploadError::IncompleteConfig(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self::with_client(config, &client))
    }

    #[must_use]
    pub fn with_client(config: UploadConfig, client: &Client) -> Self {
        let webdav = Arc::new(WebDavProvider::new(config.webdav.clone(), client.clone()));
        let image_beds = build_image_beds(&config.image_beds, client);
        let legacy = build_image_bed(&config.image_bed, client.clone());

        Self { config, webdav, image_beds, legacy }
    }

    /// Replaces the multi-host list, e.g. with custom [`UploadProvider`]s.
    #[must_use]
    pub fn with_image_beds(mut self, image_beds: Vec<RankedProvider>) -> Self {
        self.image_beds = image_beds;
        self
    }

    #[must_use]
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Uploads `file` with its own name as alt text.
    ///
    /// # Errors
    ///
    /// See [`upload_image_with_alt`](Self::upload_image_with_alt).
    pub async fn upload_image(&self, file: &FilePayload) -> Result<UploadedImage, UploadError> {
        self.upload_image_with_alt(file, None).await
    }

    /// Validates and uploads `file`, returning its public URL and markdown.
    ///
    /// # Errors
    ///
    /// - [`UploadError::Disabled`], [`UploadError::NotAnImage`], [`UploadError::TooLarge`]
    ///   before anything is sent
    /// - [`UploadError::IncompleteConfig`] / [`UploadError::NoProviders`] for unusable config
    /// - [`UploadError::UploadFailed`] from a single target
    /// - [`UploadError::AllProvidersFailed`] once every image host was tried
    pub async fn upload_image_with_alt(
        &self,
        file: &FilePayload,
        alt: Option<&str>,
    ) -> Result<UploadedImage, UploadError> {
        self.check_file(file)?;

        let (outcome, provider, attempts) = match self.config.method {
            UploadMethod::Webdav => {
                let outcome = self.webdav.upload(file).await?;
                (outcome, self.webdav.name().to_string(), 1)
            }
            UploadMethod::Imagebed if !self.image_beds.is_empty() => {
                self.upload_with_failover(file).await?
            }
            UploadMethod::Imagebed => {
                if !self.config.image_bed.is_complete() {
                    return Err(UploadError::IncompleteConfig(
                        "image bed requires api_url and api_key".to_string(),
                    ));
                }
                let outcome = self.legacy.upload(file).await?;
                (outcome, self.legacy.name().to_string(), 1)
            }
        };

        let alt = alt.unwrap_or(&file.name);
        let markdown = markdown_image(&outcome.url, alt);

        tracing::info!(provider = %provider, url = %outcome.url, attempts, "image uploaded");

        Ok(UploadedImage { outcome, markdown, provider, attempts })
    }

    fn check_file(&self, file: &FilePayload) -> Result<(), UploadError> {
        if !self.config.enabled {
            return Err(UploadError::Disabled);
        }
        if !file.is_image() {
            return Err(UploadError::NotAnImage);
        }
        if file.size() > self.config.max_size {
            return Err(UploadError::TooLarge { limit: format_file_size(self.config.max_size) });
        }
        Ok(())
    }

    async fn upload_with_failover(
        &self,
        file: &FilePayload,
    ) -> Result<(UploadOutcome, String, usize), UploadError> {
        let strategy = &self.config.strategy;
        let ordered = select(&self.image_beds, strategy.method)?;

        let policy = if strategy.enable_failover {
            AttemptPolicy::failover(strategy.retry_delay())
        } else {
            AttemptPolicy::single_shot()
        };

        let outcome = attempt_in_order(&ordered, policy, |index, ranked| async move {
            tracing::debug!(provider = %ranked.name(), position = index, "trying image host");
            ranked.provider.upload(file).await.map_err(|e| {
                tracing::warn!(provider = %ranked.name(), error = %e, "image host failed");
                e
            })
        })
        .await;

        match outcome {
            AttemptOutcome::Succeeded { index, value, attempts } => {
                Ok((value, ordered[index].name().to_string(), attempts))
            }
            AttemptOutcome::Exhausted { attempts, last_error } => {
                Err(UploadError::AllProvidersFailed {
                    attempts,
                    message: last_error.map(|e| e.to_string()).unwrap_or_default(),
                })
            }
        }
    }

    /// Whether the active method has everything it needs.
    #[must_use]
    pub fn is_config_valid(&self) -> bool {
        if !self.config.enabled {
            return false;
        }

        match self.config.method {
            UploadMethod::Webdav => {
                self.config.webdav.is_complete() && !self.config.webdav.public_url.is_empty()
            }
            UploadMethod::Imagebed if !self.config.image_beds.is_empty() => {
                self.config.image_beds.iter().any(|bed| bed.enabled && bed.is_complete())
            }
            UploadMethod::Imagebed => self.config.image_bed.is_complete(),
        }
    }

    #[must_use]
    pub fn config_info(&self) -> UploadConfigInfo {
        UploadConfigInfo {
            enabled: self.config.enabled,
            method: self.config.method.as_str().to_string(),
            max_files: self.config.max_files,
            max_size: self.config.max_size,
            config_valid: self.is_config_valid(),
        }
    }
}
