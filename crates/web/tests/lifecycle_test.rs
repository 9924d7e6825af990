//! Server lifecycle tests on a real listener

use std::time::Duration;

use actorfeatures_web::{AppState, Error, HarnessConfig, serve};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn test_shutdown_request_ends_server_with_fatal_error() -> TestResult {
    let sidecar = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/shutdown"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&sidecar)
        .await;

    let config = HarnessConfig::default()
        .sidecar_base_url(format!("{}/v1.0", sidecar.uri()))
        .fatal_exit_delay(Duration::from_millis(20));
    let state = AppState::new(config).await?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let running = tokio::spawn(serve(listener, state));

    let response = reqwest::Client::new()
        .post(format!("http://{address}/test/shutdown"))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let outcome = tokio::time::timeout(Duration::from_secs(5), running).await??;
    assert!(matches!(outcome, Err(Error::FatalShutdown)));
    Ok(())
}

#[tokio::test]
async fn test_failed_sidecar_shutdown_keeps_serving() -> TestResult {
    let sidecar = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/shutdown"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&sidecar)
        .await;

    let config = HarnessConfig::default()
        .sidecar_base_url(format!("{}/v1.0", sidecar.uri()))
        .fatal_exit_delay(Duration::from_millis(20));
    let state = AppState::new(config).await?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let running = tokio::spawn(serve(listener, state));

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{address}/test/shutdown"))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let health = client.get(format!("http://{address}/healthz")).send().await?;
    assert_eq!(health.status(), reqwest::StatusCode::OK);
    assert!(!running.is_finished());

    running.abort();
    Ok(())
}
