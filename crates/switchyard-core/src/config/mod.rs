//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: `Default` implementations and `set_default` calls
//! 2. **Config file**: TOML file named by the `SWITCHYARD_CONFIG` env var
//! 3. **Environment variables**: `SWITCHYARD__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`ApiConfig`]: API base URLs, backend flavor, availability probing
//! - [`RequestConfig`]: request timeout and custom headers
//! - [`UploadConfig`]: image upload method, WebDAV target, image hosts
//! - [`SessionConfig`]: optional session persistence, locale, site name
//! - [`LoggingConfig`]: log level and format
//!
//! # Example
//!
//! ```toml
//! [api]
//! url_mode = "static"
//! static_base_urls = ["https://api-a.example.com/api/v1", "https://api-b.example.com/api/v1"]
//!
//! [[upload.image_beds]]
//! name = "imgbb"
//! type = "imgbb"
//! api_url = "https://api.imgbb.com/1/upload"
//! api_key = "KEY"
//! priority = 1
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path, path::PathBuf, time::Duration};

use crate::failover::{ProbeStrategy, SelectionPolicy};

/// How API base URLs are supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlMode {
    /// A fixed list in `static_base_urls`; more than one entry enables probing.
    #[default]
    Static,
    /// A single `base_url` chosen by the host.
    Auto,
}

/// Backend panel flavor; some expect form-encoded POST bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendFlavor {
    #[default]
    V2board,
    XiaoV2board,
    Xboard,
}

impl BackendFlavor {
    #[must_use]
    pub fn form_encoded_posts(self) -> bool {
        matches!(self, Self::XiaoV2board | Self::Xboard)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub url_mode: UrlMode,

    /// Ordered candidate base URLs for `static` mode.
    #[serde(default)]
    pub static_base_urls: Vec<String>,

    /// Base URL for `auto` mode and for middleware mode.
    #[serde(default)]
    pub base_url: String,

    /// Route requests through a path-rewriting middleware instead of probing.
    #[serde(default)]
    pub middleware_enabled: bool,

    /// Path prefix rewrites applied in middleware mode; the longest prefix wins.
    #[serde(default)]
    pub path_mappings: BTreeMap<String, String>,

    #[serde(default)]
    pub backend: BackendFlavor,

    /// When false the probed selection is kept for the whole session.
    #[serde(default = "default_true")]
    pub check_cache_enabled: bool,

    #[serde(default = "default_check_cache_duration_ms")]
    pub check_cache_duration_ms: u64,

    #[serde(default = "default_probe_path")]
    pub probe_path: String,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_probe_attempts")]
    pub probe_attempts: u32,

    #[serde(default)]
    pub probe_strategy: ProbeStrategy,

    #[serde(default)]
    pub selection_policy: SelectionPolicy,

    /// Pause between sequential probe attempts.
    #[serde(default)]
    pub failover_delay_ms: u64,

    /// Resolve in the background instead of redirecting to the validation view.
    #[serde(default = "default_true")]
    pub silent_check: bool,
}

fn default_true() -> bool {
    true
}

fn default_check_cache_duration_ms() -> u64 {
    300_000
}

fn default_probe_path() -> String {
    "/guest/comm/config".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

fn default_probe_attempts() -> u32 {
    2
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url_mode: UrlMode::Static,
            static_base_urls: Vec::new(),
            base_url: String::new(),
            middleware_enabled: false,
            path_mappings: BTreeMap::new(),
            backend: BackendFlavor::V2board,
            check_cache_enabled: true,
            check_cache_duration_ms: default_check_cache_duration_ms(),
            probe_path: default_probe_path(),
            probe_timeout_ms: default_probe_timeout_ms(),
            probe_attempts: default_probe_attempts(),
            probe_strategy: ProbeStrategy::Sequential,
            selection_policy: SelectionPolicy::Priority,
            failover_delay_ms: 0,
            silent_check: true,
        }
    }
}

impl ApiConfig {
    /// Validity window of a probed selection; `None` means session lifetime.
    #[must_use]
    pub fn selection_ttl(&self) -> Option<Duration> {
        self.check_cache_enabled.then(|| Duration::from_millis(self.check_cache_duration_ms))
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[must_use]
    pub fn failover_delay(&self) -> Duration {
        Duration::from_millis(self.failover_delay_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomHeadersConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_request_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub custom_headers: CustomHeadersConfig,
}

fn default_request_timeout_seconds() -> u64 {
    30
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_request_timeout_seconds(),
            custom_headers: CustomHeadersConfig::default(),
        }
    }
}

impl RequestConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    Webdav,
    #[default]
    Imagebed,
}

impl UploadMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webdav => "webdav",
            Self::Imagebed => "imagebed",
        }
    }
}

/// Image host envelope family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageBedKind {
    Imgbb,
    Smms,
    Chevereto,
    Lsky,
    /// Anything else; also the fallback for unknown type names.
    #[default]
    Custom,
}

impl ImageBedKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Imgbb => "imgbb",
            Self::Smms => "smms",
            Self::Chevereto => "chevereto",
            Self::Lsky => "lsky",
            Self::Custom => "custom",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "imgbb" => Self::Imgbb,
            "smms" | "sm.ms" => Self::Smms,
            "chevereto" => Self::Chevereto,
            "lsky" => Self::Lsky,
            _ => Self::Custom,
        }
    }
}

impl Serialize for ImageBedKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImageBedKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_name(&raw))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebDavConfig {
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Path under `server_url` that receives the PUT.
    #[serde(default)]
    pub upload_path: String,
    /// Public prefix the uploaded file is served from.
    #[serde(default)]
    pub public_url: String,
}

impl WebDavConfig {
    /// Credentials and target are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.server_url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageBedConfig {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ImageBedKind,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub priority: u32,
    /// Extra request headers, e.g. `Authorization` for SM.MS or Lsky.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Extra form fields sent by `custom` hosts.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl ImageBedConfig {
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.kind.as_str()
        } else {
            &self.name
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.api_url.is_empty() && !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadStrategyConfig {
    #[serde(default)]
    pub method: SelectionPolicy,
    #[serde(default = "default_true")]
    pub enable_failover: bool,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for UploadStrategyConfig {
    fn default() -> Self {
        Self {
            method: SelectionPolicy::Priority,
            enable_failover: true,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl UploadStrategyConfig {
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub method: UploadMethod,
    #[serde(default = "default_max_files")]
    pub max_files: u32,
    /// Maximum accepted file size in bytes.
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    #[serde(default)]
    pub webdav: WebDavConfig,
    /// Prioritized hosts for multi-provider failover.
    #[serde(default)]
    pub image_beds: Vec<ImageBedConfig>,
    /// Single host used when `image_beds` is empty.
    #[serde(default)]
    pub image_bed: ImageBedConfig,
    #[serde(default)]
    pub strategy: UploadStrategyConfig,
    #[serde(default = "default_upload_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_max_files() -> u32 {
    5
}

fn default_max_size() -> u64 {
    5 * 1024 * 1024
}

fn default_upload_timeout_seconds() -> u64 {
    60
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            method: UploadMethod::Imagebed,
            max_files: default_max_files(),
            max_size: default_max_size(),
            webdav: WebDavConfig::default(),
            image_beds: Vec::new(),
            image_bed: ImageBedConfig::default(),
            strategy: UploadStrategyConfig::default(),
            timeout_seconds: default_upload_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// JSON snapshot of the local store (credentials, language).
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    /// JSON snapshot of the session store (endpoint selection cache).
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
    /// Locale used when the store holds no `language` entry.
    #[serde(default = "default_language")]
    pub language: String,
    /// Site name matched against `{site, value}` credential envelopes.
    #[serde(default)]
    pub site_name: String,
    /// Raw `Cookie` header value supplied by the host.
    #[serde(default)]
    pub cookie: Option<String>,
    /// Host-provided token, consulted after the store and cookie.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_language() -> String {
    "zh-CN".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_file: None,
            cache_file: None,
            language: default_language(),
            site_name: String::new(),
            cookie: None,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `SWITCHYARD__` prefix can override any value.
    /// Use `__` as a separator for nested fields (e.g. `SWITCHYARD__API__PROBE_TIMEOUT_MS=5000`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("api.url_mode", "static")?
            .set_default("api.check_cache_enabled", true)?
            .set_default("api.check_cache_duration_ms", 300_000)?
            .set_default("api.probe_timeout_ms", 3000)?
            .set_default("request.timeout_seconds", 30)?
            .set_default("upload.enabled", false)?
            .set_default("upload.method", "imagebed")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("SWITCHYARD").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The path can be overridden with the `SWITCHYARD_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("SWITCHYARD_CONFIG")
            .unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Validates the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        for url in &self.api.static_base_urls {
            if !is_http_url(url) {
                return Err(format!("Invalid API base URL: {url}"));
            }
        }

        if self.api.middleware_enabled || self.api.url_mode == UrlMode::Auto {
            if !is_http_url(&self.api.base_url) {
                return Err(format!("Invalid API base_url: '{}'", self.api.base_url));
            }
        } else if self.api.static_base_urls.is_empty() {
            return Err("No static API base URLs configured".to_string());
        }

        if self.api.probe_timeout_ms == 0 {
            return Err("Probe timeout must be greater than 0".to_string());
        }

        if self.api.check_cache_enabled && self.api.check_cache_duration_ms == 0 {
            return Err("Check cache duration must be greater than 0".to_string());
        }

        if self.request.timeout_seconds == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if self.upload.enabled {
            self.validate_upload()?;
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }

    fn validate_upload(&self) -> Result<(), String> {
        let upload = &self.upload;

        if upload.max_size == 0 {
            return Err("Upload max_size must be greater than 0".to_string());
        }

        match upload.method {
            UploadMethod::Webdav => {
                if !upload.webdav.is_complete() || upload.webdav.public_url.is_empty() {
                    return Err("WebDAV upload requires server_url, username, password and public_url".to_string());
                }
                if !is_http_url(&upload.webdav.server_url) {
                    return Err(format!("Invalid WebDAV server_url: {}", upload.webdav.server_url));
                }
            }
            UploadMethod::Imagebed => {
                if upload.image_beds.is_empty() {
                    if !upload.image_bed.is_complete() {
                        return Err("Image bed requires api_url and api_key".to_string());
                    }
                } else if !upload.image_beds.iter().any(|bed| bed.enabled) {
                    return Err("No enabled image beds configured".to_string());
                }

                for bed in upload.image_beds.iter().filter(|bed| bed.enabled) {
                    if !is_http_url(&bed.api_url) {
                        return Err(format!(
                            "Invalid api_url for image bed {}: '{}'",
                            bed.display_name(),
                            bed.api_url
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Commented sample written by `switchyard config generate`.
pub const SAMPLE_CONFIG: &str = r#"# Switchyard configuration

[api]
url_mode = "static"
# More than one URL enables availability probing
static_base_urls = [
    "https://api-a.example.com/api/v1",
    "https://api-b.example.com/api/v1",
]
backend = "v2board"
check_cache_enabled = true
check_cache_duration_ms = 300000
probe_path = "/guest/comm/config"
probe_timeout_ms = 3000
probe_attempts = 2
probe_strategy = "sequential"
selection_policy = "priority"
failover_delay_ms = 0
silent_check = true

[request]
timeout_seconds = 30

[request.custom_headers]
enabled = false

[upload]
enabled = true
method = "imagebed"
max_files = 5
max_size = 5242880

[upload.strategy]
method = "priority"
enable_failover = true
retry_delay_ms = 1000

[[upload.image_beds]]
name = "imgbb"
type = "imgbb"
api_url = "https://api.imgbb.com/1/upload"
api_key = "YOUR_IMGBB_KEY"
priority = 1

[[upload.image_beds]]
name = "smms"
type = "smms"
api_url = "https://sm.ms/api/v2/upload"
api_key = "YOUR_SMMS_TOKEN"
priority = 2

[upload.image_beds.headers]
Authorization = "YOUR_SMMS_TOKEN"

[upload.webdav]
server_url = "https://dav.example.com"
username = "user"
password = "password"
upload_path = "/images"
public_url = "https://img.example.com/images"

[session]
state_file = ".switchyard/local.json"
cache_file = ".switchyard/session.json"
language = "zh-CN"
site_name = "example"

[logging]
level = "info"
format = "pretty"
"#;
