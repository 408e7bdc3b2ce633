//! Backend mock for probe and API traffic.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use switchyard_core::http::SESSION_EXPIRED_MARKER;

/// Default unauthenticated probe path.
pub const PROBE_PATH: &str = "/guest/comm/config";

/// One mocked backend base URL.
pub struct ApiMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl ApiMockBuilder {
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Direct access for one-off expectations.
    pub fn server(&mut self) -> &mut ServerGuard {
        &mut self.server
    }

    /// Answers the probe path with `status`, any number of times.
    pub fn mock_probe(&mut self, status: usize) -> &mut Self {
        let mock = self
            .server
            .mock("GET", PROBE_PATH)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": {}}).to_string())
            .create();

        self.mocks.push(mock);
        self
    }

    /// Answers the probe path with `status` and asserts the hit count on drop.
    pub fn expect_probe(&mut self, status: usize, hits: usize) -> Mock {
        self.server
            .mock("GET", PROBE_PATH)
            .with_status(status)
            .with_body("{}")
            .expect(hits)
            .create()
    }

    /// Answers `method path` with `status` and a JSON body.
    pub fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &Value) -> &mut Self {
        let mock = self
            .server
            .mock(method, path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create();

        self.mocks.push(mock);
        self
    }

    /// Answers `path` with the backend's expired-login message.
    pub fn mock_session_expired(&mut self, method: &str, path: &str, status: usize) -> &mut Self {
        self.mock_json(method, path, status, &json!({"message": SESSION_EXPIRED_MARKER}))
    }

    /// Mocks a handler that only matches with the given header value.
    pub fn mock_with_header(
        &mut self,
        method: &str,
        path: &str,
        header: &str,
        value: &str,
        body: &Value,
    ) -> Mock {
        self.server
            .mock(method, path)
            .match_header(header, value)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create()
    }
}

/// A base URL nothing listens on.
#[must_use]
pub fn unreachable_url() -> String {
    "http://127.0.0.1:9".to_string()
}

/// A TCP listener that accepts connections and never writes a byte.
///
/// The accept loop is aborted on drop.
pub struct SilentServer {
    url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl SilentServer {
    pub async fn start() -> Self {
        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind silent server");
        let addr = listener.local_addr().expect("silent server address");
        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        Self { url: format!("http://{addr}"), handle }
    }

    #[must_use]
    pub fn url(&self) -> String {
        self.url.clone()
    }
}

impl Drop for SilentServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
