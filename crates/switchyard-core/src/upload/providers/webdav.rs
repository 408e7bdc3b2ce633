use async_trait::async_trait;
use rand::Rng;
use reqwest::{header::CONTENT_TYPE, Client};

use super::{
    transport::{status_line, transport_message},
    UploadProvider,
};
use crate::{
    config::WebDavConfig,
    upload::{
        errors::UploadError,
        types::{FilePayload, UploadOutcome},
    },
};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `{epoch_ms}_{6 random base36 chars}.{ext}`
#[must_use]
pub fn unique_file_name(file: &FilePayload, epoch_ms: i64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("{epoch_ms}_{suffix}.{}", file.extension())
}

/// Stores files with an authenticated `PUT` and serves them from `public_url`.
pub struct WebDavProvider {
    config: WebDavConfig,
    client: Client,
}

impl WebDavProvider {
    #[must_use]
    pub fn new(config: WebDavConfig, client: Client) -> Self {
        Self { config, client }
    }

    #[must_use]
    pub fn target_url(&self, file_name: &str) -> String {
        format!("{}{}/{file_name}", self.config.server_url, self.config.upload_path)
    }

    #[must_use]
    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.config.public_url)
    }
}

#[async_trait]
impl UploadProvider for WebDavProvider {
    fn name(&self) -> &str {
        "webdav"
    }

    fn kind(&self) -> &'static str {
        "webdav"
    }

    async fn upload(&self, file: &FilePayload) -> Result<UploadOutcome, UploadError> {
        if !self.config.is_complete() {
            return Err(UploadError::IncompleteConfig(
                "WebDAV requires server_url, username and password".to_string(),
            ));
        }

        let file_name = unique_file_name(file, crate::store::now_ms());
        let target = self.target_url(&file_name);

        tracing::debug!(target = %target, size = file.size(), "uploading to WebDAV");

        let response = self
            .client
            .put(&target)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(CONTENT_TYPE, file.content_type.as_str())
            .body(file.data.clone())
            .send()
            .await
            .map_err(|e| UploadError::failed("webdav", None, transport_message(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::failed("webdav", Some(status.as_u16()), status_line(status)));
        }

        Ok(UploadOutcome::stored_as(self.public_url(&file_name), file_name, file))
    }
}
