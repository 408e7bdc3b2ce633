//! Runtime wiring, config loading and persistence.

use serde_json::json;
use serial_test::serial;
use switchyard_core::{
    config::{AppConfig, SAMPLE_CONFIG},
    failover::ResolutionSource,
    runtime::{RuntimeError, SwitchyardRuntime},
    store::{SessionStore, API_AVAILABLE_URL_KEY, AUTH_DATA_KEY, LANGUAGE_KEY},
};

use crate::mock_infrastructure::{
    api_config, app_config, persistent_config, runtime_for, unreachable_url, ApiMockBuilder,
};

#[tokio::test]
async fn test_selection_and_credentials_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = ApiMockBuilder::new().await;
    let probe = backend.expect_probe(200, 1);

    let api = api_config(&[unreachable_url(), backend.url()]);
    {
        let runtime = runtime_for(persistent_config(api.clone(), dir.path()));
        let resolution = runtime.checker().silent_check().await.unwrap();
        assert_eq!(resolution.source, ResolutionSource::Probed);
        runtime.local_store().set(AUTH_DATA_KEY, "Bearer persisted");
        runtime.local_store().set(LANGUAGE_KEY, "en-US");
        runtime.shutdown();
    }

    let local = SessionStore::load(dir.path().join("local.json")).unwrap();
    assert_eq!(local.get(AUTH_DATA_KEY).as_deref(), Some("Bearer persisted"));
    assert!(local.get(API_AVAILABLE_URL_KEY).is_none(), "selection stays in the session file");

    let runtime = runtime_for(persistent_config(api, dir.path()));
    let cached = runtime.checker().silent_check().await.unwrap();
    assert_eq!(cached.source, ResolutionSource::Cached);
    assert_eq!(cached.url, backend.url());
    assert_eq!(runtime.active_credential(), Some("store"));

    probe.assert_async().await;
}

#[tokio::test]
async fn test_cookie_from_config_authenticates_requests() {
    let mut backend = ApiMockBuilder::new().await;
    let mock = backend.mock_with_header("GET", "/user/info", "authorization", "Bearer c", &json!({}));

    let mut config = app_config(api_config(&[backend.url()]));
    config.session.cookie = Some("theme=dark; auth_data=Bearer c".to_string());
    let runtime = runtime_for(config);

    assert_eq!(runtime.active_credential(), Some("cookie"));
    runtime.api_client().get("/user/info").await.unwrap();
    mock.assert_async().await;
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = app_config(api_config(&["ftp://nope".to_string()]));
    assert!(matches!(
        SwitchyardRuntime::builder().with_config(config.clone()).build(),
        Err(RuntimeError::ConfigValidation(_))
    ));

    config.api.static_base_urls = vec!["https://ok.example.com".to_string()];
    config.session.state_file = Some(std::env::temp_dir().join("switchyard-missing/local.json"));
    assert!(SwitchyardRuntime::builder().with_config(config).build().is_ok());
}

#[test]
fn test_corrupt_snapshot_fails_build() {
    let dir = tempfile::tempdir().unwrap();
    let config = persistent_config(api_config(&["https://ok.example.com".to_string()]), dir.path());
    std::fs::write(dir.path().join("local.json"), "not json").unwrap();

    assert!(matches!(
        SwitchyardRuntime::builder().with_config(config).build(),
        Err(RuntimeError::Store(_))
    ));
}

#[test]
#[serial]
fn test_config_file_with_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE_CONFIG).unwrap();

    std::env::set_var("SWITCHYARD__API__PROBE_TIMEOUT_MS", "1234");
    let config = AppConfig::from_file(&path);
    std::env::remove_var("SWITCHYARD__API__PROBE_TIMEOUT_MS");

    let config = config.unwrap();
    assert_eq!(config.api.probe_timeout_ms, 1234);
    assert!(config.api.static_base_urls.len() > 1);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_load_uses_config_env_var() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        r#"
[api]
static_base_urls = ["https://one.example.com", "https://two.example.com"]
probe_strategy = "race"
"#,
    )
    .unwrap();

    std::env::set_var("SWITCHYARD_CONFIG", &path);
    let config = AppConfig::load();
    std::env::remove_var("SWITCHYARD_CONFIG");

    let config = config.unwrap();
    assert_eq!(config.api.static_base_urls.len(), 2);
    assert_eq!(config.api.probe_strategy, switchyard_core::failover::ProbeStrategy::Race);
    assert!(config.api.check_cache_enabled);
}
