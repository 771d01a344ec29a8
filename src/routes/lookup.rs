//! Single-resource lookups: CEP, CNPJ and the federal services catalogue.

use axum::extract::State;
use serde_json::{json, Value};

use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::routes::{digits_only, endpoint, normalize, PathParam};
use crate::upstream::FetchRequest;

const CEP_DIGITS: usize = 8;
const CNPJ_DIGITS: usize = 14;

/// `GET /faif/cep/{cep}`
pub async fn cep(State(state): State<AppState>, PathParam(raw): PathParam) -> ApiResult<ApiResponse<Value>> {
    let digits = digits_only(&raw);
    if digits.len() != CEP_DIGITS {
        return Err(ApiError::bad_request("CEP must have 8 digits.")
            .with_code("INVALID_CEP")
            .with_detail(json!({ "cep": raw })));
    }

    let url = endpoint(&state.config.upstream.brasilapi_url, &["cep", "v2", &digits])?;
    let dados = state
        .upstream
        .fetch(FetchRequest::get(url).not_found("CEP_NOT_FOUND", "CEP not found."))
        .await?;

    tracing::info!(cep = %digits, "CEP lookup succeeded");
    Ok(ApiResponse::ok(dados))
}

/// `GET /faif/cnpj/{*cnpj}`. The wildcard accepts CNPJs typed with a slash.
pub async fn cnpj(State(state): State<AppState>, PathParam(raw): PathParam) -> ApiResult<ApiResponse<Value>> {
    let digits = digits_only(&raw);
    if digits.len() != CNPJ_DIGITS {
        return Err(ApiError::bad_request("CNPJ must have 14 digits.")
            .with_code("INVALID_CNPJ")
            .with_detail(json!({ "cnpj": raw })));
    }

    let url = endpoint(&state.config.upstream.brasilapi_url, &["cnpj", "v1", &digits])?;
    let dados = state
        .upstream
        .fetch(FetchRequest::get(url).not_found("CNPJ_NOT_FOUND", "CNPJ not found."))
        .await?;

    tracing::info!(cnpj = %digits, "CNPJ lookup succeeded");
    Ok(ApiResponse::ok(normalize::cnpj(&dados, &digits)))
}

/// `GET /faif/servicos/orgao/{cod}`
pub async fn orgao(State(state): State<AppState>, PathParam(cod): PathParam) -> ApiResult<ApiResponse<Value>> {
    let url = endpoint(&state.config.upstream.servicos_url, &["orgao", &cod])?;
    let dados = state
        .upstream
        .fetch(FetchRequest::get(url).not_found("SIORG_NOT_FOUND", "SIORG code not found."))
        .await?;
    Ok(ApiResponse::ok(dados))
}

/// `GET /faif/servicos/servico/{cod}`
pub async fn servico(State(state): State<AppState>, PathParam(cod): PathParam) -> ApiResult<ApiResponse<Value>> {
    let url = endpoint(&state.config.upstream.servicos_url, &["servicos", &cod])?;
    let dados = state
        .upstream
        .fetch(FetchRequest::get(url).not_found("SERVICO_NOT_FOUND", "Service code not found."))
        .await?;
    Ok(ApiResponse::ok(dados))
}
