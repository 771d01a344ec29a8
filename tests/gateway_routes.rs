//! End-to-end behaviour of the gateway router.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use faif_gateway::audit::{AuditStore, JsonlAuditStore, MemoryAuditStore};
use faif_gateway::config::GatewayConfig;
use faif_gateway::http::HttpServer;
use faif_gateway::lifecycle::Shutdown;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

struct Harness {
    server: HttpServer,
    store: Arc<MemoryAuditStore>,
}

impl Harness {
    fn new(config: GatewayConfig) -> Self {
        let store = Arc::new(MemoryAuditStore::new(100));
        let server = HttpServer::with_store(config, store.clone()).unwrap();
        Self { server, store }
    }

    fn router(&self) -> Router {
        self.server.router()
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri).await
    }

    async fn send(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|e| panic!("{status} body is not JSON ({e}): {:?}", String::from_utf8_lossy(&bytes)));
        (status, body)
    }

    async fn records(&self) -> Vec<faif_gateway::audit::AuditRecord> {
        self.server.state().recorder.flush().await;
        self.store.list(100).await.unwrap()
    }
}

async fn offline() -> Harness {
    let addr = common::unused_addr().await;
    Harness::new(common::config_for(&format!("http://{addr}")))
}

#[tokio::test]
async fn test_invalid_page_is_bad_request() {
    let harness = offline().await;

    let (status, body) = harness.get("/faif/transparencia/emendas/0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "ok": false,
            "error": {
                "code": "INVALID_PAGE",
                "message": "Parameter 'page' must be an integer >= 1.",
                "detail": {"page": "0"}
            }
        })
    );
}

#[tokio::test]
async fn test_negative_history_limit_is_bad_request() {
    let harness = offline().await;

    let (status, body) = harness.get("/faif/historico?limit=-5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PARAM");
    assert_eq!(body["error"]["detail"], json!({"limit": "-5"}));
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let harness = offline().await;

    let (status, body) = harness.get("/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn test_wrong_method_uses_envelope() {
    let harness = offline().await;

    for (method, uri) in [(Method::POST, "/faif/cep/01001000"), (Method::DELETE, "/faif/historico")] {
        let (status, body) = harness.send(method, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "ROUTE_NOT_FOUND");
    }
}

#[tokio::test]
async fn test_undecodable_path_param_uses_envelope() {
    let mock = common::start_mock_backend(200, "{}").await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    for uri in ["/faif/cep/%FF", "/faif/deputados/%FF", "/faif/transparencia/emendas/%FF"] {
        let (status, body) = harness.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "INVALID_PARAM");
        assert!(body["error"]["detail"].is_string());
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_missing_name_is_bad_request() {
    let harness = offline().await;

    let (status, body) = harness.get("/faif/deputados?nome=%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_PARAM");
}

#[tokio::test]
async fn test_invalid_cep_never_reaches_upstream() {
    let mock = common::start_mock_backend(200, "{}").await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    let (status, body) = harness.get("/faif/cep/123").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_CEP");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_cep_not_found_and_audited() {
    let mock = common::start_mock_backend(404, r#"{"message": "not found"}"#).await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    let (status, body) = harness.get("/faif/cep/01001-000").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "CEP_NOT_FOUND");
    assert_eq!(
        mock.last_request_line().unwrap(),
        "GET /cep/v2/01001000 HTTP/1.1"
    );

    let records = harness.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].endpoint, "/faif/cep/01001-000");
    assert_eq!(records[0].parameters["method"], "GET");
    assert_eq!(records[0].parameters["status_code"], 404);
    assert!(records[0].parameters["response_snippet"]
        .as_str()
        .unwrap()
        .contains("CEP_NOT_FOUND"));
}

#[tokio::test]
async fn test_upstream_down_is_bad_gateway() {
    let harness = offline().await;

    let (status, body) = harness.get("/faif/servicos/orgao/123").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_CONNECTION_ERROR");
}

#[tokio::test]
async fn test_cnpj_with_slash_is_mapped() {
    let mock = common::start_mock_backend(
        200,
        r#"{"razao_social": "ACME LTDA", "cnae_fiscal": 6201501, "cnae_fiscal_descricao": "Software", "qsa": []}"#,
    )
    .await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    let (status, body) = harness.get("/faif/cnpj/12.345.678/0001-95").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["cnpj"], "12345678000195");
    assert_eq!(body["data"]["nome"], "ACME LTDA");
    assert_eq!(body["data"]["atividade_principal"][0]["code"], "6201501");
    assert_eq!(
        mock.last_request_line().unwrap(),
        "GET /cnpj/v1/12345678000195 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_deputy_search_normalized() {
    let mock = common::start_mock_backend(
        200,
        r#"{"dados": [{"id": 1, "nome": "Fulano", "siglaPartido": "ABC", "siglaUf": "SP", "urlFoto": "u", "uri": "x"}], "links": []}"#,
    )
    .await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    let (status, body) = harness.get("/faif/deputados?nome=Fulano").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([{"nome": "Fulano", "email": "", "id": 1, "siglaPartido": "ABC", "siglaUf": "SP", "urlFoto": "u"}])
    );
}

#[tokio::test]
async fn test_ibge_failure_falls_back_to_empty_list() {
    let mock = common::start_mock_backend(500, "down").await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    let (status, body) = harness.get("/faif/ibge?q=censo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "data": []}));
}

#[tokio::test]
async fn test_emendas_sends_key_and_filters() {
    let mock = common::start_mock_backend(200, "[]").await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    let (status, body) = harness
        .get("/faif/transparencia/emendas/2?nomeAutor=fulano&ano=2024")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let head = mock.requests().pop().unwrap().to_ascii_lowercase();
    assert!(head.contains("chave-api-dados: test-portal-key"), "{head}");
    let line = mock.last_request_line().unwrap();
    assert!(line.contains("pagina=2"), "{line}");
    assert!(line.contains("nomeAutor=FULANO"), "{line}");
    assert!(line.contains("ano=2024"), "{line}");
}

#[tokio::test]
async fn test_servidores_filtered_by_vinculo() {
    let mock = common::start_mock_backend(
        200,
        r#"[{"nome": "A", "vinculo": "Servidor"}, {"nome": "B", "vinculo": "Beneficiario"}]"#,
    )
    .await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    let (status, body) = harness.get("/faif/transparencia/servidores?nome=Silva").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{"nome": "A", "vinculo": "Servidor"}]));

    let (status, body) = harness
        .get("/faif/transparencia/servidores?nome=Silva&pagina=abc")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["detail"], json!({"pagina": "abc"}));
}

#[tokio::test]
async fn test_no_servidor_is_not_found() {
    let mock = common::start_mock_backend(200, r#"[{"nome": "B", "vinculo": "Beneficiario"}]"#).await;
    let harness = Harness::new(common::config_for(&mock.base_url()));

    let (status, body) = harness.get("/faif/transparencia/servidores?nome=Silva").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "SERVIDOR_NOT_FOUND");
    assert_eq!(body["error"]["detail"], "nome=Silva");
}

#[tokio::test]
async fn test_concurrent_requests_get_independent_records() {
    let harness = offline().await;

    let (cep, unknown, page) = tokio::join!(
        harness.get("/faif/cep/123?origem=a"),
        harness.get("/unknown/path?origem=b"),
        harness.get("/faif/transparencia/emendas/0?origem=c"),
    );
    assert_eq!(cep.0, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.0, StatusCode::NOT_FOUND);
    assert_eq!(page.0, StatusCode::BAD_REQUEST);

    let records = harness.records().await;
    assert_eq!(records.len(), 3);

    let expected = [
        ("/faif/cep/123", 400, "a"),
        ("/unknown/path", 404, "b"),
        ("/faif/transparencia/emendas/0", 400, "c"),
    ];
    for (endpoint, status, origem) in expected {
        let record = records.iter().find(|r| r.endpoint == endpoint).unwrap();
        assert_eq!(record.parameters["status_code"], status, "{endpoint}");
        assert_eq!(record.parameters["path"], endpoint);
        assert_eq!(record.parameters["method"], "GET");
        assert_eq!(record.parameters["query"], json!({ "origem": origem }));
    }
}

#[tokio::test]
async fn test_health_is_not_audited_and_counts_requests() {
    let harness = offline().await;

    harness.get("/faif/transparencia/emendas/0").await;
    harness.get("/faif/servicos/servico/1").await;

    let (status, body) = harness.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let health = &body["data"];
    assert_eq!(health["status"], "ok");
    assert_eq!(health["request_metrics"]["total_requests"], 2);
    assert_eq!(health["request_metrics"]["failed_requests"], 1);
    assert_eq!(health["audit"]["store"], "memory");
    assert_eq!(health["env"]["portal_api_key_present"], true);

    let records = harness.records().await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.endpoint != "/health"));
}

#[tokio::test]
async fn test_request_id_is_echoed_and_recorded() {
    let harness = offline().await;

    let response = harness
        .router()
        .oneshot(
            Request::builder()
                .uri("/missing")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let records = harness.records().await;
    assert_eq!(records[0].parameters["request_id"], "req-42");
}

#[tokio::test]
async fn test_history_lists_newest_first() {
    let harness = offline().await;

    harness.get("/one").await;
    harness.get("/two").await;
    harness.records().await;

    let (status, body) = harness.get("/faif/historico?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["endpoint"], "/two");
}

#[tokio::test]
async fn test_graceful_shutdown_flushes_jsonl_audit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("historico.jsonl");

    let addr = common::unused_addr().await;
    let config = common::config_for(&format!("http://{addr}"));
    let store = Arc::new(JsonlAuditStore::open(&path).await.unwrap());
    let server = HttpServer::with_store(config, store).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let gateway = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let response = reqwest::get(format!("http://{gateway}/faif/transparencia/emendas/abc"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let reopened = JsonlAuditStore::open(&path).await.unwrap();
    let records = reopened.list(10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].endpoint, "/faif/transparencia/emendas/abc");
    assert_eq!(records[0].client_addr.as_deref(), Some("127.0.0.1"));
    assert_eq!(records[0].parameters["status_code"], 400);
}
