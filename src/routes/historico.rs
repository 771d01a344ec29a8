//! Audit history listing.

use axum::extract::{RawQuery, State};
use serde_json::json;

use crate::audit::AuditRecord;
use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::routes::QueryParams;

/// Parse `limit`: a positive integer, clamped to `max`. Absent means `default`.
pub fn parse_limit(raw: Option<&str>, default: usize, max: usize) -> ApiResult<usize> {
    let Some(raw) = raw else {
        return Ok(default.min(max));
    };
    match raw.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit.min(max)),
        _ => Err(ApiError::bad_request("Parameter 'limit' must be a positive integer.")
            .with_code("INVALID_PARAM")
            .with_detail(json!({ "limit": raw }))),
    }
}

/// `GET /faif/historico?limit=`, newest first.
pub async fn list(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<ApiResponse<Vec<AuditRecord>>> {
    let params = QueryParams::parse(query.as_deref());
    let audit = &state.config.audit;
    let limit = parse_limit(params.get("limit"), audit.default_list_limit, audit.max_list_limit)?;

    let records = state
        .audit_store
        .list(limit)
        .await
        .map_err(|e| ApiError::unclassified(&e))?;
    Ok(ApiResponse::ok(records))
}
