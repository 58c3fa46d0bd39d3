//! Health server for Kubernetes probes and Prometheus metrics.
//!
//! Provides:
//! - `/healthz` - Liveness probe (always returns 200 if server is running)
//! - `/readyz` - Readiness probe (returns 200 once the webhook listener is bound)
//! - `/metrics` - Prometheus metrics endpoint

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabel, EncodeLabelSet, LabelSetEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use tokio::sync::RwLock;
use tracing::info;

use crate::webhooks::policies::Outcome;

/// Labels for decision metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct OutcomeLabels {
    pub outcome: &'static str,
}

impl EncodeLabelSet for OutcomeLabels {
    fn encode(&self, encoder: &mut LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("outcome", self.outcome).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Labels for rejected reviews
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RejectionLabels {
    pub reason: &'static str,
}

impl EncodeLabelSet for RejectionLabels {
    fn encode(&self, encoder: &mut LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("reason", self.reason).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Shared metrics for the webhook
pub struct Metrics {
    /// Decisions by outcome
    pub decisions_total: Family<OutcomeLabels, Counter>,
    /// Reviews rejected before a decision was made
    pub rejections_total: Family<RejectionLabels, Counter>,
    /// Time spent deciding a review
    pub decision_duration_seconds: Histogram,
    registry: Registry,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with registered metrics
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let decisions_total = Family::<OutcomeLabels, Counter>::default();
        registry.register(
            "namespace_guard_decisions",
            "Total number of authorization decisions",
            decisions_total.clone(),
        );

        let rejections_total = Family::<RejectionLabels, Counter>::default();
        registry.register(
            "namespace_guard_rejections",
            "Total number of malformed SubjectAccessReviews",
            rejections_total.clone(),
        );

        let decision_duration_seconds = Histogram::new(exponential_buckets(0.000_01, 2.0, 16));
        registry.register(
            "namespace_guard_decision_duration_seconds",
            "Duration of decoding and evaluating a review in seconds",
            decision_duration_seconds.clone(),
        );

        Self {
            decisions_total,
            rejections_total,
            decision_duration_seconds,
            registry,
        }
    }

    /// Record a decision
    pub fn record_decision(&self, outcome: Outcome, duration_secs: f64) {
        self.decisions_total
            .get_or_create(&OutcomeLabels {
                outcome: outcome.as_str(),
            })
            .inc();
        self.decision_duration_seconds.observe(duration_secs);
    }

    /// Record a rejected review
    pub fn record_rejection(&self, reason: &'static str) {
        self.rejections_total
            .get_or_create(&RejectionLabels { reason })
            .inc();
    }

    /// Encode metrics to Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        if encode(&mut buffer, &self.registry).is_err() {
            tracing::error!("Failed to encode metrics");
            return "# Error encoding metrics".to_string();
        }
        buffer
    }
}

/// Probe and metrics state shared between the health and webhook servers.
///
/// Readiness tracks the webhook listener, not the health listener: the API
/// server should only route reviews here once `/authorize` can answer them.
pub struct HealthState {
    /// Set once the webhook listener is bound, cleared when shutdown starts
    ready: RwLock<bool>,
    pub metrics: Metrics,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Starts not ready; the webhook server flips it after binding
    pub fn new() -> Self {
        Self {
            ready: RwLock::new(false),
            metrics: Metrics::new(),
        }
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn is_ready(&self) -> bool {
        *self.ready.read().await
    }
}

/// The process is alive as long as this listener answers.
/// Decisions are stateless, so there is nothing else to check.
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// 503 until the webhook listener is bound, and again once shutdown starts.
async fn readyz(State(state): State<Arc<HealthState>>) -> Response {
    if state.is_ready().await {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    }
}

/// Decision counters, rejection counters and decision latency
async fn metrics_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.encode(),
    )
}

/// Create the health server router
pub fn create_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Run the health server on the given port
pub async fn run_health_server(state: Arc<HealthState>, port: u16) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Starting health server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
