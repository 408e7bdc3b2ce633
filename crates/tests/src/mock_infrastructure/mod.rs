//! Mock infrastructure for exercising the client against real HTTP servers.
//!
//! ## Components
//!
//! - `ApiMockBuilder`: Wraps mockito to stand in for one backend base URL
//! - `SilentServer`: Accepts connections and never answers, for timeout paths
//! - `ImageHostMock`: Wraps mockito to stand in for image hosts and WebDAV servers
//! - Test helpers for building configs, payloads and runtimes
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::ApiMockBuilder;
//!
//! let mut backend = ApiMockBuilder::new().await;
//! backend.mock_probe(200);
//!
//! // Use backend.url() as a static base URL
//! ```

pub mod api_mock;
pub mod image_host_mock;

pub use api_mock::{unreachable_url, ApiMockBuilder, SilentServer, PROBE_PATH};
pub use image_host_mock::ImageHostMock;
pub use test_helpers::*;
