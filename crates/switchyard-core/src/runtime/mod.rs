//! Runtime wiring for the failover client.
//!
//! Builds the stores, availability checker, credential chain, API client and
//! upload service from one [`AppConfig`](crate::config::AppConfig) and hands
//! them out as shared components.
//!
//! # Examples
//!
//! ```no_run
//! use switchyard_core::{config::AppConfig, runtime::SwitchyardRuntime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let runtime = SwitchyardRuntime::builder().with_config(config).build()?;
//!
//!     if let Some(resolution) = runtime.checker().silent_check().await {
//!         println!("using {}", resolution.url);
//!     }
//!
//!     let info = runtime.api_client().get("/user/info").await?;
//!     println!("{info}");
//!
//!     runtime.shutdown();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod components;
pub mod lifecycle;

pub use builder::{RuntimeError, SwitchyardRuntimeBuilder};
pub use components::SwitchyardComponents;
pub use lifecycle::SwitchyardRuntime;
