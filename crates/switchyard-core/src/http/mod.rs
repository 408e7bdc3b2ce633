//! API request dispatch: base URL selection, credentials, custom headers and
//! localized error mapping.

pub mod client;
pub mod errors;
pub mod localize;
pub mod path_mapper;

pub use client::{form_encode, ApiClient, ApiRequest};
pub use errors::RequestError;
pub use localize::{Locale, SESSION_EXPIRED_MARKER};
pub use path_mapper::PathMapper;
