use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::CONTENT_TYPE, Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use url::Url;

use super::{candidate::Candidate, errors::ProbeError};

/// Outcome of probing one candidate. Not persisted beyond the current pass.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub candidate: Candidate,
    pub reachable: bool,
    pub checked_at: DateTime<Utc>,
    /// Time until the last attempt finished, when a response was received.
    pub latency: Option<Duration>,
}

impl ProbeResult {
    #[must_use]
    pub fn reachable(candidate: Candidate, latency: Duration) -> Self {
        Self { candidate, reachable: true, checked_at: Utc::now(), latency: Some(latency) }
    }

    #[must_use]
    pub fn unreachable(candidate: Candidate) -> Self {
        Self { candidate, reachable: false, checked_at: Utc::now(), latency: None }
    }
}

/// Bounded-timeout reachability check against a single candidate.
///
/// Implementations must not mutate shared state and must abandon the check
/// once `timeout` elapses. `timeout` bounds the whole call, retries included.
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    async fn probe(&self, candidate: &Candidate, timeout: Duration) -> ProbeResult;
}

/// Settings for [`HttpProbe`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpProbeConfig {
    /// Unauthenticated path appended to the candidate base URL.
    #[serde(default = "default_probe_path")]
    pub path: String,

    /// Attempts per probe call. All attempts share the caller's timeout.
    #[serde(default = "default_probe_attempts")]
    pub attempts: u32,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_probe_path() -> String {
    "/guest/comm/config".to_string()
}

fn default_probe_attempts() -> u32 {
    2
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

impl Default for HttpProbeConfig {
    fn default() -> Self {
        Self {
            path: default_probe_path(),
            attempts: default_probe_attempts(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Probes a candidate with an unauthenticated `GET {base}{path}`.
///
/// Any status in `[200, 500)` means the server is reachable (a 401 still
/// proves the API is up). 5xx, transport errors, unparseable URLs and
/// timeouts all mean unreachable.
pub struct HttpProbe {
    client: Client,
    config: HttpProbeConfig,
}

impl HttpProbe {
    /// # Errors
    ///
    /// Returns [`ProbeError::ClientBuild`] if the reqwest client cannot be built.
    pub fn new(config: HttpProbeConfig) -> Result<Self, ProbeError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("switchyard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build probe client");
                ProbeError::ClientBuild(e.to_string())
            })?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &HttpProbeConfig {
        &self.config
    }

    /// Joins the candidate base URL and the probe path.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidUrl`] if the result is not an absolute http(s) URL.
    pub fn probe_url(base: &str, path: &str) -> Result<Url, ProbeError> {
        let base = base.trim().trim_end_matches('/');
        let joined = if path.is_empty() || path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };

        let url = Url::parse(&joined).map_err(|e| ProbeError::InvalidUrl(format!("{joined}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ProbeError::InvalidUrl(format!("unsupported scheme {other}"))),
        }
    }

    #[must_use]
    pub fn is_reachable_status(status: u16) -> bool {
        (200..500).contains(&status)
    }

    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// One bounded attempt. Dropping the request future on timeout aborts the connection.
    async fn attempt(&self, url: &Url, timeout: Duration) -> Result<u16, ProbeError> {
        let request = self
            .client
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .send();

        match tokio::time::timeout(timeout, request).await {
            Err(_elapsed) => Err(ProbeError::Timeout),
            Ok(Err(e)) if e.is_timeout() => Err(ProbeError::Timeout),
            Ok(Err(e)) => Err(ProbeError::Network(Self::sanitize_network_error(&e))),
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                if Self::is_reachable_status(status) {
                    Ok(status)
                } else {
                    Err(ProbeError::ServerStatus(status))
                }
            }
        }
    }
}

#[async_trait]
impl EndpointProbe for HttpProbe {
    async fn probe(&self, candidate: &Candidate, timeout: Duration) -> ProbeResult {
        let url = match Self::probe_url(&candidate.id, &self.config.path) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(candidate = %candidate.id, error = %e, "probe skipped");
                return ProbeResult::unreachable(candidate.clone());
            }
        };

        let deadline = tokio::time::Instant::now() + timeout;
        let attempts = self.config.attempts.max(1);
        for attempt in 1..=attempts {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                tracing::debug!(candidate = %candidate.id, attempt, "probe deadline reached");
                break;
            }

            let started = Instant::now();
            match self.attempt(&url, remaining).await {
                Ok(status) => {
                    let latency = started.elapsed();
                    tracing::debug!(
                        candidate = %candidate.id,
                        status,
                        attempt,
                        latency_ms = latency.as_millis(),
                        "probe succeeded"
                    );
                    return ProbeResult::reachable(candidate.clone(), latency);
                }
                Err(e) => {
                    tracing::debug!(
                        candidate = %candidate.id,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "probe attempt failed"
                    );
                }
            }
        }

        ProbeResult::unreachable(candidate.clone())
    }
}
