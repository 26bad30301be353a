mod common;

use common::{config_for, RATE_BODY};
use github_rate_pubsub::http::{build_client, get_rate_limit};
use github_rate_pubsub::Error;
use httpmock::{Method::GET, MockServer};

#[tokio::test]
async fn decodes_rate_limit_with_expected_headers() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rate_limit")
                .header("accept", "application/vnd.github+json")
                .header("x-github-api-version", "2022-11-28")
                .header("authorization", "Bearer ghp_test")
                .header_exists("user-agent");
            then.status(200)
                .header("content-type", "application/json")
                .header("x-ratelimit-remaining", "4999")
                .header("x-ratelimit-used", "1")
                .header("x-ratelimit-reset", "1700000000")
                .body(RATE_BODY);
        })
        .await;
    let cfg = config_for(&server, &[]);
    let client = build_client(&cfg)?;

    let status = get_rate_limit(&client, &cfg, "ghp_test").await?;
    m.assert_async().await;
    assert_eq!(status.resources.core.limit, 5000);
    assert_eq!(status.rate.used, 1);
    assert_eq!(status.resources.core.remaining, 4999);
    Ok(())
}

#[tokio::test]
async fn non_json_body_is_decode_error() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rate_limit");
            then.status(200).body("<html>not json</html>");
        })
        .await;
    let cfg = config_for(&server, &[]);
    let client = build_client(&cfg)?;

    let err = get_rate_limit(&client, &cfg, "t").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    assert_eq!(err.exit_code(), 7);
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_rejected_by_default() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rate_limit");
            then.status(401)
                .json_body(serde_json::json!({"message": "Bad credentials"}));
        })
        .await;
    let cfg = config_for(&server, &[]);
    let client = build_client(&cfg)?;

    match get_rate_limit(&client, &cfg, "t").await {
        Err(Error::HttpStatus { status, code, message }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(code, "unauthorized");
            assert!(message.contains("Bad credentials"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn tolerant_mode_decodes_error_bodies() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rate_limit");
            then.status(503)
                .json_body(serde_json::json!({"message": "unavailable"}));
        })
        .await;
    let cfg = config_for(&server, &[("GITHUB_DECODE_NON_SUCCESS", "true")]);
    let client = build_client(&cfg)?;

    let status = get_rate_limit(&client, &cfg, "t").await?;
    assert!(status.rate.is_empty());
    assert!(status.resources.core.is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_token_never_reaches_the_network() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/rate_limit");
            then.status(200).body(RATE_BODY);
        })
        .await;
    let cfg = config_for(&server, &[]);
    let client = build_client(&cfg)?;

    let err = get_rate_limit(&client, &cfg, " ").await.unwrap_err();
    assert!(matches!(err, Error::RequestConstruction(_)));
    m.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn connection_refused_is_network_error() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mut cfg = config_for(&server, &[]);
    // Port 9 on loopback has no listener.
    cfg.github_api_url = "http://127.0.0.1:9".into();
    let client = build_client(&cfg)?;

    let err = get_rate_limit(&client, &cfg, "t").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "got {err:?}");
    Ok(())
}
