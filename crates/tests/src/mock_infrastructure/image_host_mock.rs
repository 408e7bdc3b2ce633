//! Image host and WebDAV mocks.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// One mocked upload endpoint.
pub struct ImageHostMock {
    server: ServerGuard,
}

impl ImageHostMock {
    pub async fn new() -> Self {
        Self { server: Server::new_async().await }
    }

    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Full API URL for `path` on this host.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.server.url())
    }

    fn multipart_with_field(field: &str) -> Matcher {
        Matcher::Regex(format!(r#"name="{field}""#))
    }

    /// `POST path` expecting a multipart field, answering with `body`.
    pub fn mock_upload(&mut self, path: &str, field: &str, status: usize, body: &Value) -> Mock {
        self.server
            .mock("POST", path)
            .match_body(Self::multipart_with_field(field))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create()
    }

    pub fn mock_imgbb_success(&mut self, image_url: &str) -> Mock {
        self.mock_upload(
            "/1/upload",
            "image",
            200,
            &json!({"success": true, "data": {"url": image_url}, "status": 200}),
        )
    }

    pub fn mock_smms_success(&mut self, image_url: &str) -> Mock {
        self.mock_upload(
            "/api/v2/upload",
            "smfile",
            200,
            &json!({"success": true, "code": "success", "data": {"url": image_url}}),
        )
    }

    pub fn mock_lsky_success(&mut self, image_url: &str) -> Mock {
        self.mock_upload("/api/v1/upload", "file", 200, &json!({"status": true, "data": {"url": image_url}}))
    }

    pub fn mock_chevereto_success(&mut self, image_url: &str) -> Mock {
        self.mock_upload(
            "/api/1/upload",
            "source",
            200,
            &json!({"status_code": 200, "data": {"url": image_url}}),
        )
    }

    /// Any `POST path` fails with `status` and no JSON body.
    pub fn mock_failure(&mut self, path: &str, status: usize) -> Mock {
        self.server.mock("POST", path).with_status(status).with_body("upstream error").create()
    }

    /// Accepts any basic-authenticated `PUT` under `prefix`.
    pub fn mock_webdav_put(&mut self, prefix: &str, status: usize) -> Mock {
        self.server
            .mock("PUT", Matcher::Regex(format!("^{prefix}/.+")))
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .with_status(status)
            .create()
    }
}
