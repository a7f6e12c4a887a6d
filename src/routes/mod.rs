// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, watch};
use tower_http::cors::{Any, CorsLayer};

use crate::models::{DeviceInfo, TelemetryMessage};
use crate::publisher::ServiceStatus;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) stats_tx: broadcast::Sender<TelemetryMessage>,
    pub(crate) device_info: Arc<DeviceInfo>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
    pub(crate) status_rx: watch::Receiver<ServiceStatus>,
}

pub fn app(
    stats_tx: broadcast::Sender<TelemetryMessage>,
    device_info: Arc<DeviceInfo>,
    ws_connections: Arc<AtomicUsize>,
    status_rx: watch::Receiver<ServiceStatus>,
) -> Router {
    let state = AppState {
        stats_tx,
        device_info,
        ws_connections,
        status_rx,
    };
    Router::new()
        .route("/", get(|| async { "netprobe-sim: device telemetry producer" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/info", get(http::api_info_handler)) // GET /api/info
        .route("/api/status", get(http::api_status_handler)) // GET /api/status
        .route("/ws/telemetry", get(ws::ws_telemetry)) // WS /ws/telemetry
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
