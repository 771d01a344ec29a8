//! IBGE survey metadata search.

use axum::extract::{RawQuery, State};
use serde_json::Value;

use crate::http::error::ApiResult;
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::routes::{endpoint, QueryParams};
use crate::upstream::FetchRequest;

/// `GET /faif/ibge?q=`
///
/// Non-critical list: any upstream failure answers with an empty list.
pub async fn search(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<ApiResponse<Value>> {
    let params = QueryParams::parse(query.as_deref());
    let url = endpoint(&state.config.upstream.ibge_url, &["metadados", "Pesquisa"])?;

    let mut request = FetchRequest::get(url)
        .header("Accept", "application/json")
        .not_found("IBGE_NOT_FOUND", "No IBGE result found.");
    if let Some(termo) = params.get("q") {
        request = request.query("q", termo);
    }

    match state.upstream.fetch(request).await {
        Ok(dados) => Ok(ApiResponse::ok(dados)),
        Err(e) => {
            tracing::warn!(q = ?params.get("q"), code = %e.code(), "IBGE lookup failed, returning empty list");
            Ok(ApiResponse::ok(Value::Array(Vec::new())))
        }
    }
}
