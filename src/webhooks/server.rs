//! Authorization webhook server.
//!
//! Serves `POST /authorize` for the API server's webhook authorizer. Plain HTTP
//! by default; TLS when a certificate and key are configured.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::health::HealthState;
use crate::webhooks::audit::{self, Verbosity};
use crate::webhooks::policies::{Decision, PolicyEngine};
use crate::webhooks::review::{ReviewResponse, parse_review};

/// Path the API server posts SubjectAccessReviews to
pub const AUTHORIZE_PATH: &str = "/authorize";

/// Shared state for webhook handlers
pub struct WebhookState {
    pub engine: PolicyEngine,
    pub health: Arc<HealthState>,
    pub verbosity: Verbosity,
}

impl WebhookState {
    pub fn new(engine: PolicyEngine, health: Arc<HealthState>, verbosity: Verbosity) -> Self {
        Self {
            engine,
            health,
            verbosity,
        }
    }
}

/// Certificate and key for serving over TLS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("TLS configuration error: {0}")]
    TlsConfig(std::io::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Webhook server error: {0}")]
    Server(std::io::Error),
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(AUTHORIZE_PATH, post(authorize))
        .with_state(state)
}

/// SubjectAccessReview handler
///
/// The body is decoded by hand so every structural problem, including a wrong
/// content type, surfaces as a 400 rather than an extractor rejection.
async fn authorize(State(state): State<Arc<WebhookState>>, body: Bytes) -> Response {
    let started = Instant::now();
    audit::log_body(state.verbosity, &body);

    let request = match parse_review(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, reason = e.label(), "Rejected SubjectAccessReview");
            state.health.metrics.record_rejection(e.label());
            return e.into_response();
        }
    };

    let verdict = state.engine.evaluate(&request);
    let decision = Decision::render(&verdict, state.engine.config().opinion_mode);

    state
        .health
        .metrics
        .record_decision(decision.outcome(), started.elapsed().as_secs_f64());
    audit::log_decision(state.verbosity, &request, &verdict, &decision);

    (StatusCode::OK, Json(ReviewResponse::from(decision))).into_response()
}

/// Run the webhook server
///
/// Marks the health state ready once the listener is bound.
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    port: u16,
    tls: Option<TlsPaths>,
) -> Result<(), WebhookError> {
    let health = state.health.clone();
    let app = create_webhook_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    match tls {
        Some(paths) => serve_tls(app, addr, paths, health).await,
        None => serve_plain(app, addr, health).await,
    }
}

async fn serve_plain(
    app: Router,
    addr: SocketAddr,
    health: Arc<HealthState>,
) -> Result<(), WebhookError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| WebhookError::Bind { addr, source })?;

    info!(port = addr.port(), "Webhook server listening");
    health.set_ready(true).await;

    axum::serve(listener, app)
        .await
        .map_err(WebhookError::Server)
}

async fn serve_tls(
    app: Router,
    addr: SocketAddr,
    paths: TlsPaths,
    health: Arc<HealthState>,
) -> Result<(), WebhookError> {
    use axum_server::Handle;
    use axum_server::tls_rustls::RustlsConfig;

    let config = RustlsConfig::from_pem_file(&paths.cert, &paths.key)
        .await
        .map_err(WebhookError::TlsConfig)?;

    let handle = Handle::new();
    let server = axum_server::bind_rustls(addr, config)
        .handle(handle.clone())
        .serve(app.into_make_service());

    let mark_ready = async {
        if let Some(bound) = handle.listening().await {
            info!(port = bound.port(), "Webhook server listening with TLS");
            health.set_ready(true).await;
        }
    };

    let (result, ()) = tokio::join!(server, mark_ready);
    result.map_err(WebhookError::Server)
}
