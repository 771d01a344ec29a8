//! Upstream fetch client against real sockets.

use std::time::{Duration, Instant};

use faif_gateway::config::UpstreamConfig;
use faif_gateway::http::ErrorKind;
use faif_gateway::upstream::{FetchRequest, UpstreamClient};
use serde_json::json;
use url::Url;

mod common;

fn client() -> UpstreamClient {
    let config = UpstreamConfig {
        timeout_secs: 2,
        ..UpstreamConfig::default()
    };
    UpstreamClient::new(&config).unwrap()
}

fn url(base: &str, path: &str) -> Url {
    Url::parse(&format!("{base}{path}")).unwrap()
}

#[tokio::test]
async fn test_success_decodes_json_and_sends_query() {
    let mock = common::start_mock_backend(200, r#"{"cep": "01001000", "city": "São Paulo"}"#).await;

    let request = FetchRequest::get(url(&mock.base_url(), "/cep/v2/01001000"))
        .header("Accept", "application/json")
        .query("q", "censo demográfico");
    let value = client().fetch(request).await.unwrap();

    assert_eq!(value["cep"], "01001000");
    let line = mock.last_request_line().unwrap();
    assert!(line.starts_with("GET /cep/v2/01001000?q="), "{line}");
}

#[tokio::test]
async fn test_404_uses_caller_code() {
    let mock = common::start_mock_backend(404, r#"{"message": "CEP não encontrado"}"#).await;

    let request = FetchRequest::get(url(&mock.base_url(), "/cep/v2/99999999"))
        .not_found("CEP_NOT_FOUND", "CEP not found.");
    let err = client().fetch(request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status().as_u16(), 404);
    assert_eq!(err.code(), "CEP_NOT_FOUND");
    assert_eq!(err.message(), "CEP not found.");
    assert!(err.detail().unwrap().as_str().unwrap().contains("não encontrado"));
}

#[tokio::test]
async fn test_server_error_carries_upstream_status() {
    let mock = common::start_mock_backend(500, "boom").await;

    let err = client()
        .fetch(FetchRequest::get(url(&mock.base_url(), "/x")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamStatus);
    assert_eq!(err.status().as_u16(), 502);
    assert_eq!(err.code(), "UPSTREAM_ERROR");
    assert_eq!(err.detail(), Some(&json!({"upstream_status": 500, "body": "boom"})));
}

#[tokio::test]
async fn test_non_json_body_is_invalid_payload() {
    let mock = common::start_mock_backend(200, "<html>maintenance</html>").await;

    let err = client()
        .fetch(FetchRequest::get(url(&mock.base_url(), "/x")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidPayload);
    assert_eq!(err.code(), "INVALID_JSON");
    assert_eq!(err.status().as_u16(), 502);
}

#[tokio::test]
async fn test_refused_connection() {
    let addr = common::unused_addr().await;

    let err = client()
        .fetch(FetchRequest::get(url(&format!("http://{addr}"), "/x")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamConnection);
    assert_eq!(err.code(), "UPSTREAM_CONNECTION_ERROR");
    assert!(err.detail().is_some());
}

#[tokio::test]
async fn test_timeout_fires_near_configured_bound() {
    let mock = common::start_slow_backend(Duration::from_secs(5), 200, "{}").await;

    let start = Instant::now();
    let err = client()
        .fetch(FetchRequest::get(url(&mock.base_url(), "/slow")).timeout(Duration::from_millis(300)))
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.kind(), ErrorKind::UpstreamConnection);
    assert!(elapsed >= Duration::from_millis(250), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
}
