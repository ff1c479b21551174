//! HTTP/WebSocket API for the game server.
//!
//! # Endpoints Overview
//!
//! - `GET /ws` - WebSocket carrying player commands and table events
//! - `GET /health` - Server health status
//! - anything else - static files from the configured directory
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ld_server::api::{AppState, create_router};
//! use liars_deck::table::{TableActor, TableConfig};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let table = TableActor::spawn(TableConfig::default())?;
//! let app = create_router(AppState::new(table, "public", 32));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively; the table is a single public room.

pub mod rate_limiter;
pub mod request_id;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use liars_deck::table::TableHandle;
use request_id::RequestId;
use serde_json::json;
use std::{
    path::PathBuf,
    sync::{Arc, atomic::AtomicU64},
};
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the table actor hosting the match
    pub table: TableHandle,
    /// Root of the static file fallback
    pub static_dir: PathBuf,
    /// Events buffered per connection before the table starts dropping them
    pub subscriber_buffer: usize,
    /// Currently open WebSocket connections
    pub connections: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(table: TableHandle, static_dir: impl Into<PathBuf>, subscriber_buffer: usize) -> Self {
        Self {
            table,
            static_dir: static_dir.into(),
            subscriber_buffer,
            connections: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Create the API router with all endpoints and middleware.
///
/// ```text
/// GET  /health   - Health check
/// GET  /ws       - WebSocket
/// GET  /*        - Static files
/// ```
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .fallback_service(static_files)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` while the table actor answers, or
/// `503 Service Unavailable` once it has shut down.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","table":{"name":"Main Table","phase":"lobby",...},"timestamp":"..."}
/// ```
async fn health_check(
    State(state): State<AppState>,
    request_id: RequestId,
) -> impl IntoResponse {
    match state.table.status().await {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "table": status,
                "request_id": request_id.as_str(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "version": env!("CARGO_PKG_VERSION"),
                "error": e.to_string(),
                "request_id": request_id.as_str(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        ),
    }
}
