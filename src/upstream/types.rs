//! Outbound request description and outcome.

use std::borrow::Cow;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::http::error::ApiResult;

/// Either the decoded upstream payload or a classified error.
pub type FetchOutcome = ApiResult<Value>;

/// Code and message used when the upstream answers 404.
///
/// Each route supplies its own pair, since "not found" means something
/// different for a CEP than for a deputy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundSpec {
    pub code: Cow<'static, str>,
    pub message: Cow<'static, str>,
}

impl Default for NotFoundSpec {
    fn default() -> Self {
        Self {
            code: Cow::Borrowed("NOT_FOUND"),
            message: Cow::Borrowed("Resource not found."),
        }
    }
}

/// One outbound GET.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub(crate) url: Url,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) not_found: NotFoundSpec,
}

impl FetchRequest {
    /// A GET to `url` with no extra headers or parameters.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
            query: Vec::new(),
            timeout: None,
            not_found: NotFoundSpec::default(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append every pair of `params` to the query string.
    pub fn query_pairs<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Override the client's default timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Code and message reported when the upstream answers 404.
    pub fn not_found(
        mut self,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.not_found = NotFoundSpec {
            code: code.into(),
            message: message.into(),
        };
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    /// Header names only; values may be credentials.
    pub fn header_names(&self) -> Vec<&str> {
        self.headers.iter().map(|(name, _)| name.as_str()).collect()
    }
}
