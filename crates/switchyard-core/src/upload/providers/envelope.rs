use async_trait::async_trait;
use reqwest::{multipart::Form, Client};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{
    transport::{file_part, post_form, str_at},
    UploadProvider,
};
use crate::upload::{
    errors::UploadError,
    types::{FilePayload, UploadOutcome},
};

/// How a host signals acceptance in its JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessCheck {
    /// The named field is truthy.
    Flag(&'static str),
    /// `status_code == 200`.
    StatusCode200,
}

/// Wire shape of a JSON image host: form field, success flag, error location.
#[derive(Debug, Clone)]
pub struct EnvelopeFormat {
    pub kind: &'static str,
    pub file_field: &'static str,
    pub extra_fields: Vec<(String, String)>,
    /// Whether configured headers are sent; imgbb authenticates with a form field instead.
    pub send_headers: bool,
    pub success: SuccessCheck,
    pub error_path: &'static [&'static str],
}

impl EnvelopeFormat {
    #[must_use]
    pub fn imgbb(api_key: &str) -> Self {
        Self {
            kind: "imgbb",
            file_field: "image",
            extra_fields: vec![("key".to_string(), api_key.to_string())],
            send_headers: false,
            success: SuccessCheck::Flag("success"),
            error_path: &["error", "message"],
        }
    }

    #[must_use]
    pub fn smms() -> Self {
        Self {
            kind: "smms",
            file_field: "smfile",
            extra_fields: Vec::new(),
            send_headers: true,
            success: SuccessCheck::Flag("success"),
            error_path: &["message"],
        }
    }

    #[must_use]
    pub fn chevereto() -> Self {
        Self {
            kind: "chevereto",
            file_field: "source",
            extra_fields: Vec::new(),
            send_headers: true,
            success: SuccessCheck::StatusCode200,
            error_path: &["error", "message"],
        }
    }

    #[must_use]
    pub fn lsky() -> Self {
        Self {
            kind: "lsky",
            file_field: "file",
            extra_fields: Vec::new(),
            send_headers: true,
            success: SuccessCheck::Flag("status"),
            error_path: &["message"],
        }
    }

    fn accepted(&self, body: &Value) -> bool {
        match self.success {
            SuccessCheck::Flag(field) => body.get(field).is_some_and(is_truthy),
            SuccessCheck::StatusCode200 => {
                body.get("status_code").and_then(Value::as_u64) == Some(200)
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Multipart POST host whose reply is `{<flag>, data: {url}}`.
pub struct EnvelopeProvider {
    format: EnvelopeFormat,
    name: String,
    api_url: String,
    headers: BTreeMap<String, String>,
    client: Client,
}

impl EnvelopeProvider {
    #[must_use]
    pub fn new(
        format: EnvelopeFormat,
        name: String,
        api_url: String,
        headers: BTreeMap<String, String>,
        client: Client,
    ) -> Self {
        Self { format, name, api_url, headers, client }
    }

    /// Reads the public URL or the host's rejection message out of `body`.
    fn interpret(&self, body: &Value, file: &FilePayload) -> Result<UploadOutcome, UploadError> {
        if !self.format.accepted(body) {
            let message = str_at(body, self.format.error_path)
                .map_or_else(|| format!("{} rejected the upload", self.format.kind), str::to_string);
            return Err(UploadError::failed(&self.name, None, message));
        }

        str_at(body, &["data", "url"])
            .map(|url| UploadOutcome::hosted(url, file))
            .ok_or_else(|| UploadError::failed(&self.name, None, "no image url in response"))
    }
}

#[async_trait]
impl UploadProvider for EnvelopeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        self.format.kind
    }

    async fn upload(&self, file: &FilePayload) -> Result<UploadOutcome, UploadError> {
        let mut form = Form::new().part(self.format.file_field, file_part(&self.name, file)?);
        for (key, value) in &self.format.extra_fields {
            form = form.text(key.clone(), value.clone());
        }

        let no_headers = BTreeMap::new();
        let headers = if self.format.send_headers { &self.headers } else { &no_headers };

        let body = post_form(&self.client, &self.name, &self.api_url, headers, form).await?;
        self.interpret(&body, file)
    }
}
