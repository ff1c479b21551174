//! Prometheus metrics for monitoring server health and game activity.
//!
//! Metrics are exposed in Prometheus text format on a separate listener when
//! `METRICS_BIND` is set. Without an installed recorder every call is a no-op.
//!
//! # Metrics Categories
//!
//! - **WebSocket Metrics**: Active connections, messages sent/received
//! - **Game Metrics**: Commands by kind and outcome, matches started, disputes
//! - **Rate Limiting Metrics**: Throttled messages

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: u64) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Record a client command and whether the match accepted it.
pub fn commands_total(kind: &'static str, accepted: bool) {
    metrics::counter!("commands_total",
        "kind" => kind,
        "result" => if accepted { "ok" } else { "rejected" }
    )
    .increment(1);
}

/// Increment matches started counter.
pub fn matches_started_total() {
    metrics::counter!("matches_started_total").increment(1);
}

/// Increment resolved disputes counter.
pub fn disputes_total() {
    metrics::counter!("disputes_total").increment(1);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(window: &'static str) {
    metrics::counter!("rate_limit_hits_total", "window" => window).increment(1);
}
