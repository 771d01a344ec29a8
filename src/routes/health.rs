//! `GET /health`

use axum::extract::State;

use crate::health::HealthReport;
use crate::http::response::ApiResponse;
use crate::http::server::AppState;

pub async fn report(State(state): State<AppState>) -> ApiResponse<HealthReport> {
    let report = HealthReport::collect(&state.process, &state.counters, state.audit_store.as_ref()).await;
    ApiResponse::ok(report)
}
