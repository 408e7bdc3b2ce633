use async_trait::async_trait;
use reqwest::{multipart::Form, Client};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{
    transport::{file_part, post_form, str_at},
    UploadProvider,
};
use crate::{
    config::ImageBedConfig,
    upload::{
        errors::UploadError,
        types::{FilePayload, UploadOutcome},
    },
};

/// Locations probed for the image URL, in order.
const URL_PATHS: &[&[&str]] = &[&["url"], &["data", "url"], &["link"], &["src"]];

/// Generic host: `image` form field plus configured params.
pub struct CustomProvider {
    name: String,
    api_url: String,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
    client: Client,
}

impl CustomProvider {
    #[must_use]
    pub fn new(config: &ImageBedConfig, client: Client) -> Self {
        Self {
            name: config.display_name().to_string(),
            api_url: config.api_url.clone(),
            headers: config.headers.clone(),
            params: config.params.clone(),
            client,
        }
    }

    fn extract_url(body: &Value) -> Option<&str> {
        URL_PATHS.iter().find_map(|path| str_at(body, path).filter(|url| !url.is_empty()))
    }
}

#[async_trait]
impl UploadProvider for CustomProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "custom"
    }

    async fn upload(&self, file: &FilePayload) -> Result<UploadOutcome, UploadError> {
        let mut form = Form::new().part("image", file_part(&self.name, file)?);
        for (key, value) in &self.params {
            form = form.text(key.clone(), value.clone());
        }

        let body = post_form(&self.client, &self.name, &self.api_url, &self.headers, form).await?;

        Self::extract_url(&body)
            .map(|url| UploadOutcome::hosted(url, file))
            .ok_or_else(|| UploadError::failed(&self.name, None, "no image url in response"))
    }
}
