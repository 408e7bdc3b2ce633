use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client, ClientBuilder, Method,
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};

use super::{
    errors::RequestError,
    localize::{self, Locale, SESSION_EXPIRED_MARKER},
    path_mapper::PathMapper,
};
use crate::{
    auth::CredentialChain,
    availability::ApiAvailabilityChecker,
    config::{ApiConfig, RequestConfig, UrlMode},
    store::{SessionStore, LANGUAGE_KEY},
};

/// One API call relative to the selected base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Encodes the top-level fields of a JSON object as a urlencoded form.
///
/// Strings are sent as-is; other values use their JSON text.
#[must_use]
pub fn form_encode(body: &Value) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    if let Value::Object(fields) = body {
        for (key, value) in fields {
            match value {
                Value::String(s) => serializer.append_pair(key, s),
                other => serializer.append_pair(key, &other.to_string()),
            };
        }
    }
    serializer.finish()
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Dispatches API calls against the currently selected base URL.
///
/// Attaches the first available credential, applies configured custom
/// headers, and turns failures into localized [`RequestError`]s.
pub struct ApiClient {
    client: Client,
    api: ApiConfig,
    request: RequestConfig,
    default_language: String,
    checker: Arc<ApiAvailabilityChecker>,
    credentials: Arc<CredentialChain>,
    local: Arc<SessionStore>,
    path_mapper: PathMapper,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`RequestError::Build`] if the reqwest client cannot be built.
    pub fn new(
        api: ApiConfig,
        request: RequestConfig,
        default_language: impl Into<String>,
        checker: Arc<ApiAvailabilityChecker>,
        credentials: Arc<CredentialChain>,
        local: Arc<SessionStore>,
    ) -> Result<Self, RequestError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .timeout(request.timeout())
            .use_rustls_tls()
            .user_agent(concat!("switchyard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build api client");
                RequestError::Build(e.to_string())
            })?;

        let path_mapper = PathMapper::new(&api.path_mappings);

        Ok(Self {
            client,
            api,
            request,
            default_language: default_language.into(),
            checker,
            credentials,
            local,
            path_mapper,
        })
    }

    /// Base URL for the next request.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.api.middleware_enabled || self.api.url_mode == UrlMode::Auto {
            return self.api.base_url.clone();
        }

        if self.api.static_base_urls.len() > 1 {
            return self.checker.available_url();
        }

        self.api.static_base_urls.first().cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        let tag = self.local.get(LANGUAGE_KEY).unwrap_or_else(|| self.default_language.clone());
        Locale::from_tag(&tag)
    }

    /// Full URL for `path`, after gateway path mapping.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        if self.api.middleware_enabled {
            let mapped = self.path_mapper.map(path);
            if mapped != path {
                tracing::debug!(from = %path, to = %mapped, "api path mapped");
            }
            return join_url(&self.base_url(), &mapped);
        }
        join_url(&self.base_url(), path)
    }

    /// Sends `request` and returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// - [`RequestError::SessionExpired`] when the backend reports an expired login
    /// - [`RequestError::Backend`] / [`RequestError::Status`] for non-2xx responses
    /// - [`RequestError::Timeout`] / [`RequestError::Network`] for transport failures
    /// - [`RequestError::InvalidResponse`] when a 2xx body is not JSON
    pub async fn request(&self, request: ApiRequest) -> Result<Value, RequestError> {
        let locale = self.locale();
        let url = self.endpoint_url(&request.path);

        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            if request.method == Method::POST && self.api.backend.form_encoded_posts() {
                builder = builder
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(form_encode(body));
            } else {
                builder = builder.json(body);
            }
        }

        if let Some(token) = self.credentials.resolve() {
            builder = builder.header(AUTHORIZATION, token.as_str());
        }

        if self.request.custom_headers.enabled {
            for (name, value) in &self.request.custom_headers.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        tracing::debug!(method = %request.method, url = %url, "dispatching api request");

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "api request failed");
            if e.is_timeout() {
                RequestError::Timeout(localize::timeout_message(locale))
            } else if e.is_builder() {
                RequestError::Build(e.to_string())
            } else {
                RequestError::Network(localize::network_message(locale))
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                RequestError::Timeout(localize::timeout_message(locale))
            } else {
                RequestError::Network(localize::network_message(locale))
            }
        })?;

        let body: Option<Value> =
            if text.trim().is_empty() { Some(Value::Null) } else { serde_json::from_str(&text).ok() };
        let message = body.as_ref().and_then(|b| b.get("message")).and_then(Value::as_str);

        if message == Some(SESSION_EXPIRED_MARKER) {
            tracing::info!(url = %url, "session expired");
            return Err(RequestError::SessionExpired(SESSION_EXPIRED_MARKER.to_string()));
        }

        if status.is_success() {
            return body.ok_or_else(|| {
                RequestError::InvalidResponse(format!("non-JSON body from {}", request.path))
            });
        }

        let status = status.as_u16();
        tracing::warn!(url = %url, status, "api request returned error status");

        Err(match message {
            Some(message) => {
                RequestError::Backend { status, message: localize::backend_message(locale, message) }
            }
            None => RequestError::Status { status, message: localize::status_message(locale, status) },
        })
    }

    /// Convenience for `GET`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, path: &str) -> Result<Value, RequestError> {
        self.request(ApiRequest::get(path)).await
    }

    /// Convenience for `POST` with a JSON (or form, per backend) body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(&self, path: &str, body: Value) -> Result<Value, RequestError> {
        self.request(ApiRequest::post(path, body)).await
    }
}
