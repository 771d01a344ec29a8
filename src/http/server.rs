//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every route and the fallback
//! - Wire up middleware (request ID, tracing, CORS, lifecycle hook, limits,
//!   timeout, panic capture)
//! - Serve until shutdown, then drain the audit queue

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::audit::{AuditLimits, AuditRecorder, AuditStore};
use crate::config::GatewayConfig;
use crate::health::{ProcessInfo, RequestCounters};
use crate::http::middleware::request_lifecycle;
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};
use crate::http::response::{panic_response, route_not_found};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;
use crate::lifecycle::{open_audit_store, StartupError};
use crate::routes;
use crate::upstream::UpstreamClient;

/// How long shutdown waits for the audit writer to drain.
const AUDIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: UpstreamClient,
    pub audit_store: Arc<dyn AuditStore>,
    pub recorder: AuditRecorder,
    pub counters: Arc<RequestCounters>,
    pub process: Arc<ProcessInfo>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
    audit_writer: JoinHandle<()>,
}

impl HttpServer {
    /// Create a server, opening the audit store named in `config`.
    pub async fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let store = open_audit_store(&config.audit).await?;
        Self::with_store(config, store)
    }

    /// Create a server over an already opened audit store.
    ///
    /// Spawns the audit writer, so it must run inside a Tokio runtime.
    pub fn with_store(config: GatewayConfig, store: Arc<dyn AuditStore>) -> Result<Self, StartupError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let (recorder, audit_writer) = AuditRecorder::spawn(
            store.clone(),
            AuditLimits::from(&config.audit),
            config.audit.queue_capacity,
        );
        let process = ProcessInfo::capture(
            config.app_version.clone(),
            config.upstream.portal_api_key.is_some(),
        );

        let state = AppState {
            config: Arc::new(config),
            upstream,
            audit_store: store,
            recorder,
            counters: Arc::new(RequestCounters::new()),
            process: Arc::new(process),
        };

        let router = Self::build_router(state.clone());
        Ok(Self {
            router,
            state,
            audit_writer,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers listed first sit closest to the handlers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();

        Router::new()
            .merge(routes::router())
            .method_not_allowed_fallback(route_not_found)
            .fallback(route_not_found)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(middleware::from_fn_with_state(state.clone(), request_lifecycle))
            .layer(CorsLayer::permissive())
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = request_id_of(request).unwrap_or("-"),
                )
            }))
            .layer(set_request_id_layer())
            .with_state(state)
    }

    /// A clone of the fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve on `listener` until `shutdown` fires, then flush pending audit records.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app_version = %self.state.config.app_version,
            "HTTP server starting"
        );

        let Self {
            router,
            state,
            audit_writer,
        } = self;

        let app = router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped, draining audit queue");
        state.recorder.flush().await;
        drop(state);

        match tokio::time::timeout(AUDIT_DRAIN_TIMEOUT, audit_writer).await {
            Ok(Ok(())) => tracing::info!("Audit writer finished"),
            Ok(Err(e)) => tracing::error!(error = %e, "Audit writer task failed"),
            Err(_) => tracing::warn!("Audit writer did not finish in time"),
        }
        Ok(())
    }
}
