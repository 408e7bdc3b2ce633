//! # Switchyard Core
//!
//! Client-side library for talking to a panel backend that is reachable
//! through several interchangeable base URLs.
//!
//! This crate provides:
//!
//! - **[`failover`]**: Candidate ordering (priority, round-robin, random), endpoint probing
//!   and the orchestrator that commits the first reachable endpoint.
//!
//! - **[`store`]**: Concurrent key/value stores and the time-bounded selection cache.
//!
//! - **[`availability`]**: Decides whether checking applies, resolves the API base URL at
//!   startup and exposes the currently selected one.
//!
//! - **[`auth`]**: Ordered credential lookup across the store, a cookie header, a host-provided
//!   token and a backup copy.
//!
//! - **[`http`]**: API client with gateway path mapping, form-encoded posts for
//!   Xboard-family backends, session-expiry detection and localized errors.
//!
//! - **[`upload`]**: Image upload to WebDAV or one of several image hosts, with ordered
//!   failover across hosts.
//!
//! - **[`runtime`]**: Wires everything above from one [`config::AppConfig`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       SwitchyardRuntime                      │
//! │  ┌──────────────────┐  ┌───────────────┐  ┌───────────────┐  │
//! │  │ ApiAvailability  │  │   ApiClient   │  │ UploadService │  │
//! │  │     Checker      │◄─┤               │  │               │  │
//! │  └────────┬─────────┘  └───────┬───────┘  └───────┬───────┘  │
//! │           │                    │                  │          │
//! │  ┌────────▼─────────┐  ┌───────▼───────┐  ┌───────▼───────┐  │
//! │  │    Failover      │  │  Credential   │  │ UploadProvider│  │
//! │  │  Orchestrator    │  │    Chain      │  │  (per host)   │  │
//! │  └────────┬─────────┘  └───────────────┘  └───────────────┘  │
//! │           │                                                  │
//! │  ┌────────▼─────────┐                                        │
//! │  │ SelectionCache   │──► session store                       │
//! │  └──────────────────┘                                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resolution Flow
//!
//! ```text
//! resolve()
//!     │
//!     ▼
//! ┌─────────────┐
//! │ Cache Check │ ─── fresh & still a candidate ──► Cached
//! └──────┬──────┘
//!        │ miss / expired
//!        ▼
//! ┌─────────────┐
//! │  pass lock  │ ─── another caller committed meanwhile ──► Cached
//! └──────┬──────┘
//!        ▼
//! ┌─────────────┐
//! │   select    │  priority / round-robin / random
//! └──────┬──────┘
//!        ▼
//! ┌─────────────┐
//! │   probe     │  sequential / parallel / race
//! └──────┬──────┘
//!    ┌───┴──────────────┐
//!    ▼                  ▼
//! reachable         none reachable
//!    │                  │
//!    ▼                  ▼
//! commit ──► Probed   first by priority ──► Fallback (not cached)
//! ```

pub mod auth;
pub mod availability;
pub mod config;
pub mod failover;
pub mod http;
pub mod runtime;
pub mod store;
pub mod upload;
