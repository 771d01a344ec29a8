//! Route catalogue.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → parameter validation (BadRequest with the offending value as detail)
//!     → FetchRequest (base URL + path segments, query, not-found code)
//!     → UpstreamClient::fetch
//!     → normalize.rs (reshape) or route fallback policy
//!     → ApiResponse envelope
//! ```
//!
//! # Design Decisions
//! - Handlers only describe what to fetch; transport handling lives in `upstream`
//! - Every route answers with the `{ok, data}` envelope, list routes included

pub mod deputados;
pub mod health;
pub mod historico;
pub mod ibge;
pub mod lookup;
pub mod normalize;
pub mod transparencia;

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    routing::get,
    Router,
};
use serde_json::json;
use url::Url;

use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;

/// Every route served by the gateway.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/faif/cep/{cep}", get(lookup::cep))
        .route("/faif/cnpj/{*cnpj}", get(lookup::cnpj))
        .route("/faif/servicos/orgao/{cod}", get(lookup::orgao))
        .route("/faif/servicos/servico/{cod}", get(lookup::servico))
        .route("/faif/deputados", get(deputados::search))
        .route("/faif/deputados/{id}", get(deputados::details))
        .route("/faif/ibge", get(ibge::search))
        .route("/faif/transparencia/emendas/{page}", get(transparencia::emendas))
        .route("/faif/transparencia/servidores", get(transparencia::servidores))
        .route("/faif/historico", get(historico::list))
        .route("/health", get(health::report))
}

/// `base` with `segments` appended as escaped path segments.
pub fn endpoint(base: &str, segments: &[&str]) -> ApiResult<Url> {
    let mut url = Url::parse(base).map_err(|e| ApiError::unclassified(&e))?;
    url.path_segments_mut()
        .map_err(|()| {
            tracing::error!(base = %base, "Upstream base URL cannot carry a path");
            ApiError::internal()
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// A single path parameter, decoded as text.
///
/// Rejections (e.g. percent-encoding that is not UTF-8) become an
/// `INVALID_PARAM` error in the usual envelope.
#[derive(Debug, Clone)]
pub struct PathParam(pub String);

impl<S> FromRequestParts<S> for PathParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request("Invalid path parameter.")
                .with_code("INVALID_PARAM")
                .with_detail_text(rejection.body_text())),
        }
    }
}

/// Keep ASCII digits only.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Decoded query string. The first occurrence of a repeated key wins.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let mut params = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        Self(params)
    }

    /// Trimmed value of `name`; `None` when absent or blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Like [`get`](Self::get), but a missing value is a `MISSING_PARAM` error.
    pub fn require(&self, name: &'static str) -> ApiResult<&str> {
        self.get(name).ok_or_else(|| {
            ApiError::bad_request(format!("Parameter '{name}' is required."))
                .with_code("MISSING_PARAM")
                .with_detail_text(format!("Query param '{name}' missing or empty."))
        })
    }
}

/// Parse a page number that must be an integer ≥ 1.
///
/// On failure the raw text is echoed back under `name` in the detail.
pub fn parse_page(raw: &str, name: &'static str) -> ApiResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(ApiError::bad_request(format!("Parameter '{name}' must be an integer >= 1."))
            .with_code("INVALID_PAGE")
            .with_detail(json!({ name: raw }))),
    }
}
