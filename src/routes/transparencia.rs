//! Portal da Transparência: parliamentary amendments and public servants.
//!
//! Both upstream calls carry the portal API key in the `chave-api-dados` header.

use axum::extract::{RawQuery, State};
use serde_json::{json, Value};

use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::routes::{endpoint, normalize, parse_page, PathParam, QueryParams};
use crate::upstream::payload::is_truthy;
use crate::upstream::FetchRequest;

const API_KEY_HEADER: &str = "chave-api-dados";

/// Optional amendment filters passed through unchanged.
const EMENDA_FILTERS: [&str; 6] = [
    "codigoEmenda",
    "numeroEmenda",
    "nomeAutor",
    "tipoEmenda",
    "codigoFuncao",
    "codigoSubfuncao",
];

fn portal_request(state: &AppState, url: url::Url) -> FetchRequest {
    let request = FetchRequest::get(url).header("Accept", "application/json");
    match &state.config.upstream.portal_api_key {
        Some(key) => request.header(API_KEY_HEADER, key.as_str()),
        None => {
            tracing::warn!("Portal API key not configured; request will likely be rejected");
            request
        }
    }
}

/// Upstream query for an amendments page.
pub fn emenda_params(page: u32, params: &QueryParams) -> ApiResult<Vec<(String, String)>> {
    let mut query = vec![("pagina".to_string(), page.to_string())];

    for name in EMENDA_FILTERS {
        if let Some(value) = params.get(name) {
            let value = if name == "nomeAutor" {
                value.to_uppercase()
            } else {
                value.to_string()
            };
            query.push((name.to_string(), value));
        }
    }

    if let Some(ano) = params.get("ano") {
        if !ano.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::bad_request("Parameter 'ano' must be an integer.")
                .with_code("INVALID_PARAM")
                .with_detail(json!({ "ano": ano })));
        }
        query.push(("ano".to_string(), ano.to_string()));
    }

    Ok(query)
}

/// `GET /faif/transparencia/emendas/{page}`
pub async fn emendas(
    State(state): State<AppState>,
    PathParam(raw_page): PathParam,
    RawQuery(query): RawQuery,
) -> ApiResult<ApiResponse<Value>> {
    let page = parse_page(&raw_page, "page")?;
    let params = QueryParams::parse(query.as_deref());
    let upstream_query = emenda_params(page, &params)?;

    let url = endpoint(&state.config.upstream.transparencia_url, &["emendas"])?;
    let request = portal_request(&state, url)
        .query_pairs(upstream_query)
        .not_found("EMENDA_NOT_FOUND", "No amendment found.");
    let dados = state.upstream.fetch(request).await?;

    if !is_truthy(&dados) {
        tracing::warn!(page, "Amendments upstream returned no data");
        return Ok(ApiResponse::ok(Value::Array(Vec::new())));
    }
    Ok(ApiResponse::ok(dados))
}

/// `GET /faif/transparencia/servidores?nome=&pagina=`
pub async fn servidores(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<ApiResponse<Vec<Value>>> {
    let params = QueryParams::parse(query.as_deref());
    let nome = params.require("nome")?;
    let pagina = parse_page(params.get("pagina").unwrap_or("1"), "pagina")?;

    let url = endpoint(&state.config.upstream.transparencia_url, &["pessoas-fisicas"])?;
    let request = portal_request(&state, url)
        .query("nome", nome)
        .query("pagina", pagina.to_string())
        .not_found("PESSOA_FISICA_NOT_FOUND", "No person found in the transparency portal.");
    let dados = state.upstream.fetch(request).await?;

    let servidores = normalize::servidores(&dados);
    tracing::info!(nome = %nome, pagina, count = servidores.len(), "Public servant search");

    if servidores.is_empty() {
        return Err(ApiError::not_found("No public servant found for this name.")
            .with_code("SERVIDOR_NOT_FOUND")
            .with_detail_text(format!("nome={nome}")));
    }
    Ok(ApiResponse::ok(servidores))
}
