//! Chamber of Deputies (Câmara dos Deputados) lookups.

use axum::extract::{RawQuery, State};
use serde_json::{json, Value};

use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::routes::{endpoint, normalize, PathParam, QueryParams};
use crate::upstream::{FetchRequest, PayloadExt};

/// `GET /faif/deputados?nome=`
pub async fn search(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<ApiResponse<Vec<Value>>> {
    let params = QueryParams::parse(query.as_deref());
    let nome = params.require("nome")?;

    let url = endpoint(&state.config.upstream.camara_url, &["deputados"])?;
    let request = FetchRequest::get(url)
        .header("Accept", "application/json")
        .query("nome", nome)
        .not_found("DEPUTADO_NOT_FOUND", "No deputy found for this name.");
    let dados = state.upstream.fetch(request).await?;

    let deputados = normalize::deputados_list(&dados);
    tracing::info!(nome = %nome, count = deputados.len(), "Deputy search");
    Ok(ApiResponse::ok(deputados))
}

/// `GET /faif/deputados/{id}`
pub async fn details(State(state): State<AppState>, PathParam(raw): PathParam) -> ApiResult<ApiResponse<Value>> {
    let id: u64 = raw.trim().parse().map_err(|_| {
        ApiError::bad_request("Deputy id must be an integer.")
            .with_code("INVALID_PARAM")
            .with_detail(json!({ "id": raw }))
    })?;

    let url = endpoint(&state.config.upstream.camara_url, &["deputados", &id.to_string()])?;
    let request = FetchRequest::get(url)
        .header("Accept", "application/json")
        .not_found("DEPUTADO_ID_NOT_FOUND", "Deputy id not found.");
    let dados = state.upstream.fetch(request).await?;

    let profile = dados.field("dados").cloned().unwrap_or(Value::Null);
    tracing::info!(id, "Deputy details");
    Ok(ApiResponse::ok(normalize::deputado_details(&profile)))
}
