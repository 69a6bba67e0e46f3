//! Health probes and Prometheus metrics.
//!
//! Serves `/healthz`, `/readyz` and `/metrics`. Readiness flips once the Node
//! watcher has finished its initial listing and stays set afterwards, even
//! while the watch stream is failing and backing off; watch failures show up
//! in `srcdst_watch_errors_total` instead. The counters describe watch
//! deliveries only; the reconciler itself keeps no state.

use crate::error::ControllerError;
use crate::reconciler::NodeEvent;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Watcher-side metrics and readiness flag.
pub struct Metrics {
    registry: Registry,
    node_deliveries: IntCounterVec,
    watch_errors: IntCounter,
    resyncs: IntCounter,
    ready: AtomicBool,
}

impl Metrics {
    pub fn new() -> Result<Self, ControllerError> {
        let registry = Registry::new();

        let node_deliveries = IntCounterVec::new(
            Opts::new("srcdst_node_deliveries_total", "Node snapshots handed to the reconciler"),
            &["event"],
        )?;
        let watch_errors = IntCounter::new(
            "srcdst_watch_errors_total",
            "Errors returned by the Node watch stream",
        )?;
        let resyncs = IntCounter::new("srcdst_resyncs_total", "Completed full resync passes")?;

        registry.register(Box::new(node_deliveries.clone()))?;
        registry.register(Box::new(watch_errors.clone()))?;
        registry.register(Box::new(resyncs.clone()))?;

        Ok(Self {
            registry,
            node_deliveries,
            watch_errors,
            resyncs,
            ready: AtomicBool::new(false),
        })
    }

    pub fn record_delivery(&self, event: NodeEvent) {
        self.node_deliveries.with_label_values(&[event.as_str()]).inc();
    }

    pub fn record_watch_error(&self) {
        self.watch_errors.inc();
    }

    pub fn record_resync(&self) {
        self.resyncs.inc();
    }

    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Prometheus text exposition of all registered metrics.
    pub fn encode(&self) -> Result<String, ControllerError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ControllerError::Probe(format!("metrics are not valid UTF-8: {}", e)))
    }
}

/// Router exposing the probe endpoints.
pub fn router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

/// Serves the probe endpoints until the task is aborted.
pub async fn serve(addr: SocketAddr, metrics: Arc<Metrics>) -> Result<(), ControllerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ControllerError::Probe(format!("failed to bind {}: {}", addr, e)))?;
    info!("Probe server listening on {}", addr);

    axum::serve(listener, router(metrics))
        .await
        .map_err(|e| ControllerError::Probe(format!("probe server failed: {}", e)))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    if metrics.is_ready() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initial node listing not complete")
    }
}

async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
