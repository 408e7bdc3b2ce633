//! Authorization token lookup.
//!
//! The token attached to API requests can live in several places. A
//! [`CredentialChain`] polls its [`CredentialSource`]s in precedence order and
//! takes the first present, non-empty value:
//!
//! ```text
//!   StoreCredential ──> CookieCredential ──> StaticCredential ──> BackupCredential
//!   (auth_data)         (auth_data=...)      (set by the host)    (cookie_auth_data)
//! ```
//!
//! Sources only read; nothing in this module writes a credential back.

pub mod credentials;

pub use credentials::{
    BackupCredential, CookieCredential, CredentialChain, CredentialSource, StaticCredential,
    StoreCredential, Token,
};
