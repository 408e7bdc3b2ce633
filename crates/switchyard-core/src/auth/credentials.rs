use arc_swap::ArcSwapOption;
use serde::Deserialize;
use std::{fmt, sync::Arc};

use crate::store::{SessionStore, AUTH_DATA_KEY, COOKIE_AUTH_BACKUP_KEY};

/// Opaque authorization token. Sent verbatim in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Returns `None` for blank values.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([redacted])")
    }
}

/// `{"site": "...", "value": "..."}` wrapper used when several sites share a cookie jar.
#[derive(Debug, Deserialize)]
struct SiteEnvelope {
    site: String,
    value: String,
}

fn parse_envelope(raw: &str) -> Option<SiteEnvelope> {
    serde_json::from_str(raw).ok()
}

/// One place a token may be stored.
pub trait CredentialSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn read(&self) -> Option<Token>;
}

impl<T: CredentialSource + ?Sized> CredentialSource for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read(&self) -> Option<Token> {
        (**self).read()
    }
}

/// The `auth_data` key in the local store.
pub struct StoreCredential {
    store: Arc<SessionStore>,
}

impl StoreCredential {
    #[must_use]
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }
}

impl CredentialSource for StoreCredential {
    fn name(&self) -> &'static str {
        "store"
    }

    fn read(&self) -> Option<Token> {
        self.store.get(AUTH_DATA_KEY).and_then(Token::new)
    }
}

/// The `auth_data` entry of a `Cookie` header supplied by the host.
///
/// Values are percent-decoded. A `{site, value}` envelope is accepted only
/// for the configured site; anything that is not JSON is used as-is.
pub struct CookieCredential {
    site_name: String,
    header: ArcSwapOption<String>,
}

impl CookieCredential {
    #[must_use]
    pub fn new(site_name: impl Into<String>) -> Self {
        Self { site_name: site_name.into(), header: ArcSwapOption::empty() }
    }

    #[must_use]
    pub fn with_header(self, header: impl Into<String>) -> Self {
        self.set_header(Some(header.into()));
        self
    }

    pub fn set_header(&self, header: Option<String>) {
        self.header.store(header.map(Arc::new));
    }

    fn extract(&self, header: &str) -> Option<Token> {
        let raw = header
            .split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix("auth_data="))?;

        let Ok(decoded) = urlencoding::decode(raw) else {
            return Token::new(raw);
        };

        match parse_envelope(&decoded) {
            Some(envelope) if envelope.site == self.site_name => Token::new(envelope.value),
            Some(envelope) => {
                tracing::debug!(site = %envelope.site, "ignoring auth cookie for another site");
                None
            }
            None => Token::new(raw),
        }
    }
}

impl CredentialSource for CookieCredential {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn read(&self) -> Option<Token> {
        let header = self.header.load_full()?;
        self.extract(&header)
    }
}

/// A token handed over by the host process at runtime.
#[derive(Default)]
pub struct StaticCredential {
    token: ArcSwapOption<String>,
}

impl StaticCredential {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        let credential = Self::default();
        credential.set(token);
        credential
    }

    pub fn set(&self, token: Option<String>) {
        self.token.store(token.map(Arc::new));
    }
}

impl CredentialSource for StaticCredential {
    fn name(&self) -> &'static str {
        "static"
    }

    fn read(&self) -> Option<Token> {
        self.token.load_full().and_then(|token| Token::new(token.as_str()))
    }
}

/// The `cookie_auth_data` backup copy in the local store.
///
/// A matching `{site, value}` envelope yields `value`; anything else is used raw.
pub struct BackupCredential {
    store: Arc<SessionStore>,
    site_name: String,
}

impl BackupCredential {
    #[must_use]
    pub fn new(store: Arc<SessionStore>, site_name: impl Into<String>) -> Self {
        Self { store, site_name: site_name.into() }
    }
}

impl CredentialSource for BackupCredential {
    fn name(&self) -> &'static str {
        "backup"
    }

    fn read(&self) -> Option<Token> {
        let raw = self.store.get(COOKIE_AUTH_BACKUP_KEY)?;
        match parse_envelope(&raw) {
            Some(envelope) if envelope.site == self.site_name => Token::new(envelope.value),
            _ => Token::new(raw),
        }
    }
}

/// Ordered list of credential sources.
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual precedence: store, cookie, static, backup.
    #[must_use]
    pub fn standard(
        store: Arc<SessionStore>,
        cookie: impl CredentialSource + 'static,
        fixed: impl CredentialSource + 'static,
        site_name: &str,
    ) -> Self {
        Self::new()
            .with_source(StoreCredential::new(store.clone()))
            .with_source(cookie)
            .with_source(fixed)
            .with_source(BackupCredential::new(store, site_name))
    }

    #[must_use]
    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// First present, non-empty token.
    #[must_use]
    pub fn resolve(&self) -> Option<Token> {
        self.resolve_with_source().map(|(_, token)| token)
    }

    /// Like [`resolve`](Self::resolve), also naming the source that answered.
    #[must_use]
    pub fn resolve_with_source(&self) -> Option<(&'static str, Token)> {
        self.sources.iter().find_map(|source| {
            let token = source.read()?;
            tracing::trace!(source = source.name(), "credential found");
            Some((source.name(), token))
        })
    }
}
