//! Startup resolution through the availability checker.

use switchyard_core::{
    availability::{CheckOutcome, RouteLocation, VALIDATION_PATH},
    config::UrlMode,
    failover::ResolutionSource,
    store::{API_AVAILABLE_URL_KEY, API_CACHE_DATA_KEY},
};

use crate::mock_infrastructure::{api_config, checker_for, unreachable_url, ApiMockBuilder};

#[tokio::test]
async fn test_silent_check_selects_first_reachable() {
    let mut backup = ApiMockBuilder::new().await;
    backup.mock_probe(200);

    let api = api_config(&[unreachable_url(), backup.url()]);
    let (checker, session) = checker_for(api);

    assert!(checker.should_check());
    assert_eq!(checker.available_url(), unreachable_url());

    let resolution = checker.silent_check().await.unwrap();
    assert_eq!(resolution.url, backup.url());
    assert_eq!(resolution.source, ResolutionSource::Probed);
    assert_eq!(session.get(API_AVAILABLE_URL_KEY), Some(backup.url()));
    assert_eq!(checker.available_url(), backup.url());
}

#[tokio::test]
async fn test_fallback_is_not_remembered() {
    let api = api_config(&[unreachable_url(), "http://127.0.0.1:10".to_string()]);
    let (checker, session) = checker_for(api);

    let resolution = checker.silent_check().await.unwrap();
    assert_eq!(resolution.url, unreachable_url());
    assert_eq!(resolution.source, ResolutionSource::Fallback);
    assert!(session.get(API_AVAILABLE_URL_KEY).is_none());
    assert!(session.get(API_CACHE_DATA_KEY).is_none());
}

#[tokio::test]
async fn test_recheck_moves_off_a_dead_endpoint() {
    let mut primary = ApiMockBuilder::new().await;
    let primary_up = primary.expect_probe(200, 1);
    let mut secondary = ApiMockBuilder::new().await;
    secondary.mock_probe(200);

    let (checker, session) = checker_for(api_config(&[primary.url(), secondary.url()]));
    assert_eq!(checker.silent_check().await.unwrap().url, primary.url());
    primary_up.assert_async().await;
    primary_up.remove_async().await;

    primary.mock_probe(503);

    // cached selection still wins until a recheck
    let cached = checker.silent_check().await.unwrap();
    assert_eq!(cached.source, ResolutionSource::Cached);
    assert_eq!(cached.url, primary.url());

    let rechecked = checker.recheck().await.unwrap();
    assert_eq!(rechecked.url, secondary.url());
    assert_eq!(rechecked.source, ResolutionSource::Probed);
    assert_eq!(session.get(API_AVAILABLE_URL_KEY), Some(secondary.url()));
}

#[tokio::test]
async fn test_single_endpoint_is_not_checked() {
    let (checker, _) = checker_for(api_config(&["https://only.example.com".to_string()]));

    assert!(!checker.should_check());
    assert!(checker.silent_check().await.is_none());
    assert_eq!(checker.available_url(), "https://only.example.com");
    assert_eq!(
        checker.init(true, &RouteLocation::new("/dashboard")).await,
        CheckOutcome::Skipped
    );
}

#[tokio::test]
async fn test_auto_and_middleware_modes_skip_checking() {
    let urls = ["https://a.example.com".to_string(), "https://b.example.com".to_string()];

    let mut auto = api_config(&urls);
    auto.url_mode = UrlMode::Auto;
    assert!(!checker_for(auto).0.should_check());

    let mut middleware = api_config(&urls);
    middleware.middleware_enabled = true;
    assert!(!checker_for(middleware).0.should_check());
}

#[tokio::test]
async fn test_init_redirects_when_not_silent() {
    let mut api = api_config(&[unreachable_url(), "http://127.0.0.1:10".to_string()]);
    api.silent_check = false;
    let (checker, _) = checker_for(api);

    let current = RouteLocation::new("/order").with_query("plan", "3");
    match checker.init(true, &current).await {
        CheckOutcome::Redirect(target) => {
            assert_eq!(target.path, VALIDATION_PATH);
            assert_eq!(target.query.get("redirect").map(String::as_str), Some("/order"));
            assert_eq!(target.query.get("plan").map(String::as_str), Some("3"));
        }
        other => panic!("expected redirect, got {other:?}"),
    }

    let on_validation = RouteLocation::new(VALIDATION_PATH);
    assert_eq!(checker.init(true, &on_validation).await, CheckOutcome::Pending);
    assert_eq!(checker.init(false, &current).await, CheckOutcome::Pending);
}

#[tokio::test]
async fn test_init_uses_stored_url() {
    let mut api = api_config(&[unreachable_url(), "http://127.0.0.1:10".to_string()]);
    api.silent_check = false;
    let (checker, session) = checker_for(api);
    checker.orchestrator().cache().commit("http://127.0.0.1:10");

    assert_eq!(
        checker.init(true, &RouteLocation::new("/")).await,
        CheckOutcome::Resolved {
            url: "http://127.0.0.1:10".to_string(),
            source: ResolutionSource::Cached
        }
    );
    assert_eq!(session.get(API_AVAILABLE_URL_KEY).as_deref(), Some("http://127.0.0.1:10"));
}
