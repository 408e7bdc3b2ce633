//! Upload adapters and host failover against mock image hosts.

use serde_json::json;
use switchyard_core::{
    config::{ImageBedKind, UploadConfig, UploadMethod, WebDavConfig},
    failover::SelectionPolicy,
    upload::{UploadError, UploadService},
};

use crate::mock_infrastructure::{image_bed, png_payload, upload_config, ImageHostMock};

#[tokio::test]
async fn test_imgbb_failure_falls_over_to_smms() {
    let mut imgbb = ImageHostMock::new().await;
    let imgbb_mock = imgbb.mock_failure("/1/upload", 500);
    let mut smms = ImageHostMock::new().await;
    let smms_mock = smms.mock_smms_success("https://s2.loli.net/2024/01/01/abc.png");

    let config = upload_config(vec![
        image_bed("imgbb", ImageBedKind::Imgbb, imgbb.api_url("/1/upload"), 1),
        image_bed("smms", ImageBedKind::Smms, smms.api_url("/api/v2/upload"), 2),
    ]);
    let service = UploadService::new(config).unwrap();

    let uploaded = service.upload_image(&png_payload(64)).await.unwrap();
    assert_eq!(uploaded.outcome.url, "https://s2.loli.net/2024/01/01/abc.png");
    assert_eq!(uploaded.provider, "smms");
    assert_eq!(uploaded.attempts, 2);
    assert_eq!(uploaded.markdown, "![screenshot.png](https://s2.loli.net/2024/01/01/abc.png)");
    assert_eq!(uploaded.outcome.size, 64);

    imgbb_mock.assert_async().await;
    smms_mock.assert_async().await;
}

#[tokio::test]
async fn test_priority_order_beats_declaration_order() {
    let mut first = ImageHostMock::new().await;
    let first_mock = first.mock_lsky_success("https://lsky.example.com/i/1.png");
    let mut second = ImageHostMock::new().await;
    let second_mock = second.mock_chevereto_success("https://chv.example.com/i/1.png");

    let config = upload_config(vec![
        image_bed("lsky", ImageBedKind::Lsky, first.api_url("/api/v1/upload"), 5),
        image_bed("chevereto", ImageBedKind::Chevereto, second.api_url("/api/1/upload"), 1),
    ]);
    let service = UploadService::new(config).unwrap();

    let uploaded = service.upload_image(&png_payload(8)).await.unwrap();
    assert_eq!(uploaded.provider, "chevereto");
    assert_eq!(uploaded.attempts, 1);

    second_mock.assert_async().await;
    assert!(!first_mock.matched_async().await);
}

#[tokio::test]
async fn test_rejected_envelope_counts_as_failure() {
    let mut imgbb = ImageHostMock::new().await;
    imgbb.mock_upload("/1/upload", "image", 200, &json!({"success": false, "error": {"message": "Invalid API v1 key."}}));

    let config = upload_config(vec![image_bed(
        "imgbb",
        ImageBedKind::Imgbb,
        imgbb.api_url("/1/upload"),
        0,
    )]);
    let service = UploadService::new(config).unwrap();

    assert_eq!(
        service.upload_image(&png_payload(8)).await,
        Err(UploadError::AllProvidersFailed {
            attempts: 1,
            message: "imgbb upload failed: Invalid API v1 key.".to_string()
        })
    );
}

#[tokio::test]
async fn test_all_hosts_down_reports_last_error() {
    let mut a = ImageHostMock::new().await;
    a.mock_failure("/upload", 502);
    let mut b = ImageHostMock::new().await;
    b.mock_failure("/upload", 503);

    let config = upload_config(vec![
        image_bed("a", ImageBedKind::Custom, a.api_url("/upload"), 1),
        image_bed("b", ImageBedKind::Custom, b.api_url("/upload"), 2),
    ]);
    let service = UploadService::new(config).unwrap();

    match service.upload_image(&png_payload(8)).await {
        Err(UploadError::AllProvidersFailed { attempts, message }) => {
            assert_eq!(attempts, 2);
            assert_eq!(message, "b upload failed: 503 Service Unavailable");
        }
        other => panic!("expected AllProvidersFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_custom_host_reads_nested_url() {
    let mut host = ImageHostMock::new().await;
    host.mock_upload("/upload", "image", 200, &json!({"data": {"url": "https://cdn.example.com/x.png"}}));

    let config = upload_config(vec![image_bed("mine", ImageBedKind::Custom, host.api_url("/upload"), 0)]);
    let service = UploadService::new(config).unwrap();

    let uploaded = service.upload_image_with_alt(&png_payload(8), Some("diagram")).await.unwrap();
    assert_eq!(uploaded.markdown, "![diagram](https://cdn.example.com/x.png)");
}

#[tokio::test]
async fn test_round_robin_keeps_declaration_order() {
    let mut a = ImageHostMock::new().await;
    let a_mock = a.mock_failure("/upload", 500);
    let mut b = ImageHostMock::new().await;
    let b_mock = b.mock_upload("/upload", "image", 200, &json!({"url": "https://b/x.png"}));

    let mut config = upload_config(vec![
        image_bed("a", ImageBedKind::Custom, a.api_url("/upload"), 9),
        image_bed("b", ImageBedKind::Custom, b.api_url("/upload"), 0),
    ]);
    config.strategy.method = SelectionPolicy::RoundRobin;
    let service = UploadService::new(config).unwrap();

    let uploaded = service.upload_image(&png_payload(8)).await.unwrap();
    assert_eq!(uploaded.provider, "b");
    assert_eq!(uploaded.attempts, 2);
    a_mock.assert_async().await;
    b_mock.assert_async().await;
}

#[tokio::test]
async fn test_webdav_put_returns_public_url() {
    let mut dav = ImageHostMock::new().await;
    let mock = dav.mock_webdav_put("/dav/images", 201);

    let config = UploadConfig {
        enabled: true,
        method: UploadMethod::Webdav,
        webdav: WebDavConfig {
            server_url: dav.url(),
            username: "user".to_string(),
            password: "secret".to_string(),
            upload_path: "/dav/images".to_string(),
            public_url: "https://img.example.com".to_string(),
        },
        ..UploadConfig::default()
    };
    let service = UploadService::new(config).unwrap();
    assert!(service.is_config_valid());

    let uploaded = service.upload_image(&png_payload(8)).await.unwrap();
    assert!(uploaded.outcome.url.starts_with("https://img.example.com/"));
    assert!(uploaded.outcome.url.ends_with(".png"));
    assert_eq!(uploaded.provider, "webdav");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_webdav_error_status() {
    let mut dav = ImageHostMock::new().await;
    dav.mock_webdav_put("/dav", 507);

    let config = UploadConfig {
        enabled: true,
        method: UploadMethod::Webdav,
        webdav: WebDavConfig {
            server_url: dav.url(),
            username: "user".to_string(),
            password: "secret".to_string(),
            upload_path: "/dav".to_string(),
            public_url: "https://img.example.com".to_string(),
        },
        ..UploadConfig::default()
    };
    let service = UploadService::new(config).unwrap();

    match service.upload_image(&png_payload(8)).await {
        Err(UploadError::UploadFailed { provider, status, .. }) => {
            assert_eq!(provider, "webdav");
            assert_eq!(status, Some(507));
        }
        other => panic!("expected UploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_oversized_file_never_reaches_a_host() {
    let mut host = ImageHostMock::new().await;
    let mock = host.mock_upload("/upload", "image", 200, &json!({"url": "u"}));

    let mut config = upload_config(vec![image_bed("h", ImageBedKind::Custom, host.api_url("/upload"), 0)]);
    config.max_size = 1024;
    let service = UploadService::new(config).unwrap();

    assert_eq!(
        service.upload_image(&png_payload(2048)).await,
        Err(UploadError::TooLarge { limit: "1 KB".to_string() })
    );
    assert!(!mock.matched_async().await);
}
