//! API client dispatch against a mock backend.

use mockito::Matcher;
use serde_json::json;
use switchyard_core::{
    config::BackendFlavor,
    http::{ApiRequest, RequestError, SESSION_EXPIRED_MARKER},
    store::{API_AVAILABLE_URL_KEY, AUTH_DATA_KEY, LANGUAGE_KEY},
};

use crate::mock_infrastructure::{
    api_config, app_config, runtime_for, unreachable_url, ApiMockBuilder,
};

#[tokio::test]
async fn test_get_returns_json_body() {
    let mut backend = ApiMockBuilder::new().await;
    backend.mock_json("GET", "/user/info", 200, &json!({"data": {"email": "a@example.com"}}));

    let runtime = runtime_for(app_config(api_config(&[backend.url()])));
    let body = runtime.api_client().get("/user/info").await.unwrap();
    assert_eq!(body["data"]["email"], "a@example.com");
}

#[tokio::test]
async fn test_query_parameters_are_sent() {
    let mut backend = ApiMockBuilder::new().await;
    let mock = backend
        .server()
        .mock("GET", "/user/order/fetch")
        .match_query(Matcher::UrlEncoded("status".into(), "0".into()))
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .create_async()
        .await;

    let runtime = runtime_for(app_config(api_config(&[backend.url()])));
    runtime
        .api_client()
        .request(ApiRequest::get("/user/order/fetch").with_query("status", "0"))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_token_is_sent_verbatim() {
    let mut backend = ApiMockBuilder::new().await;
    let mock =
        backend.mock_with_header("GET", "/user/info", "authorization", "Bearer abc", &json!({}));

    let runtime = runtime_for(app_config(api_config(&[backend.url()])));
    runtime.local_store().set(AUTH_DATA_KEY, "Bearer abc");

    runtime.api_client().get("/user/info").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_authorization_without_credentials() {
    let mut backend = ApiMockBuilder::new().await;
    let mock = backend
        .server()
        .mock("GET", "/guest/plan/fetch")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let runtime = runtime_for(app_config(api_config(&[backend.url()])));
    runtime.api_client().get("/guest/plan/fetch").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_xboard_posts_are_form_encoded() {
    let mut backend = ApiMockBuilder::new().await;
    let mock = backend
        .server()
        .mock("POST", "/passport/auth/login")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("email".into(), "a@example.com".into()),
            Matcher::UrlEncoded("password".into(), "p w&d".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"data": {"auth_data": "Bearer t"}}"#)
        .create_async()
        .await;

    let mut api = api_config(&[backend.url()]);
    api.backend = BackendFlavor::Xboard;
    let runtime = runtime_for(app_config(api));

    let body = runtime
        .api_client()
        .post("/passport/auth/login", json!({"email": "a@example.com", "password": "p w&d"}))
        .await
        .unwrap();
    assert_eq!(body["data"]["auth_data"], "Bearer t");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_v2board_posts_are_json() {
    let mut backend = ApiMockBuilder::new().await;
    let mock = backend
        .server()
        .mock("POST", "/user/update")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"remind_expire": 1})))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let runtime = runtime_for(app_config(api_config(&[backend.url()])));
    runtime.api_client().post("/user/update", json!({"remind_expire": 1})).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_session_expired_detected_on_any_status() {
    let mut backend = ApiMockBuilder::new().await;
    backend.mock_session_expired("GET", "/user/info", 200);
    backend.mock_session_expired("GET", "/user/getSubscribe", 403);

    let runtime = runtime_for(app_config(api_config(&[backend.url()])));
    let client = runtime.api_client();

    for path in ["/user/info", "/user/getSubscribe"] {
        let error = client.get(path).await.unwrap_err();
        assert!(error.is_session_expired(), "{path}: {error:?}");
        assert_eq!(error, RequestError::SessionExpired(SESSION_EXPIRED_MARKER.to_string()));
    }
}

#[tokio::test]
async fn test_backend_message_is_localized() {
    let mut backend = ApiMockBuilder::new().await;
    backend.mock_json("POST", "/passport/auth/login", 422, &json!({"message": "Invalid credentials."}));

    let runtime = runtime_for(app_config(api_config(&[backend.url()])));
    let client = runtime.api_client();

    let error = client.post("/passport/auth/login", json!({})).await.unwrap_err();
    assert_eq!(error, RequestError::Backend { status: 422, message: "邮箱或密码错误".to_string() });

    runtime.local_store().set(LANGUAGE_KEY, "en-US");
    let error = client.post("/passport/auth/login", json!({})).await.unwrap_err();
    assert_eq!(
        error,
        RequestError::Backend { status: 422, message: "Invalid credentials.".to_string() }
    );
}

#[tokio::test]
async fn test_status_without_message_is_localized() {
    let mut backend = ApiMockBuilder::new().await;
    backend.server().mock("GET", "/missing").with_status(404).with_body("").create_async().await;
    backend.server().mock("GET", "/teapot").with_status(418).with_body("nope").create_async().await;

    let runtime = runtime_for(app_config(api_config(&[backend.url()])));
    let client = runtime.api_client();

    assert_eq!(
        client.get("/missing").await.unwrap_err(),
        RequestError::Status { status: 404, message: "请求的资源不存在".to_string() }
    );
    assert_eq!(client.get("/teapot").await.unwrap_err().status(), Some(418));
}

#[tokio::test]
async fn test_network_failure_is_localized() {
    let runtime = runtime_for(app_config(api_config(&[unreachable_url()])));
    let error = runtime.api_client().get("/user/info").await.unwrap_err();
    assert!(matches!(error, RequestError::Network(_) | RequestError::Timeout(_)), "{error:?}");
}

#[tokio::test]
async fn test_custom_headers_are_applied() {
    let mut backend = ApiMockBuilder::new().await;
    let mock = backend.mock_with_header("GET", "/user/info", "x-client", "switchyard", &json!({}));

    let mut config = app_config(api_config(&[backend.url()]));
    config.request.custom_headers.enabled = true;
    config.request.custom_headers.headers.insert("X-Client".to_string(), "switchyard".to_string());
    let runtime = runtime_for(config);

    runtime.api_client().get("/user/info").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_middleware_maps_paths_onto_gateway() {
    let mut gateway = ApiMockBuilder::new().await;
    let mock = gateway
        .server()
        .mock("GET", "/api/u/info")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let mut api = api_config(&["https://a.example.com".to_string(), "https://b.example.com".to_string()]);
    api.middleware_enabled = true;
    api.base_url = gateway.url();
    api.path_mappings.insert("/user".to_string(), "/api/u".to_string());
    let runtime = runtime_for(app_config(api));

    runtime.api_client().get("/user/info").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_requests_follow_the_selected_endpoint() {
    let mut backup = ApiMockBuilder::new().await;
    backup.mock_probe(200);
    backup.mock_json("GET", "/user/info", 200, &json!({"from": "backup"}));

    let runtime = runtime_for(app_config(api_config(&[unreachable_url(), backup.url()])));

    let resolution = runtime.checker().silent_check().await.unwrap();
    assert_eq!(resolution.url, backup.url());
    assert_eq!(runtime.session_store().get(API_AVAILABLE_URL_KEY), Some(backup.url()));

    let body = runtime.api_client().get("/user/info").await.unwrap();
    assert_eq!(body["from"], "backup");
}
