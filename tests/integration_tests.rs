// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum_test::TestServer;
use common::{test_dataset, up_interface};
use netprobe_sim::engine::SimulationEngine;
use netprobe_sim::models::{DeviceInfo, TelemetryMessage};
use netprobe_sim::publisher::ServiceStatus;
use netprobe_sim::routes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, watch};

fn test_device_info() -> DeviceInfo {
    DeviceInfo {
        hostname: "router-core-01".into(),
        version: "24.3.1".into(),
        last_booted: "2024-06-01T00:00:00Z".into(),
    }
}

fn test_app(status: ServiceStatus) -> (axum::Router, broadcast::Sender<TelemetryMessage>) {
    let (tx, _) = broadcast::channel(10);
    let (_status_tx, status_rx) = watch::channel(status);
    let app = routes::app(
        tx.clone(),
        Arc::new(test_device_info()),
        Arc::new(AtomicUsize::new(0)),
        status_rx,
    );
    (app, tx)
}

/// Build TestServer with http_transport (required for WebSocket tests).
fn test_server_with_http() -> (TestServer, broadcast::Sender<TelemetryMessage>) {
    let (app, tx) = test_app(ServiceStatus::Online);
    let server = TestServer::builder().http_transport().build(app);
    (server, tx)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _) = test_app(ServiceStatus::Online);
    let server = TestServer::new(app);
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("netprobe-sim: device telemetry producer");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _) = test_app(ServiceStatus::Online);
    let server = TestServer::new(app);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("netprobe-sim")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_api_info_returns_static_identity() {
    let (app, _) = test_app(ServiceStatus::Online);
    let server = TestServer::new(app);
    let response = server.get("/api/info").await;
    response.assert_status_ok();
    let info: DeviceInfo = response.json();
    assert_eq!(info, test_device_info());
}

#[tokio::test]
async fn test_api_status_reflects_publisher_state() {
    for (status, expected) in [
        (ServiceStatus::Online, "online"),
        (ServiceStatus::Error, "error"),
        (ServiceStatus::Offline, "offline"),
    ] {
        let (app, _) = test_app(status);
        let server = TestServer::new(app);
        let response = server.get("/api/status").await;
        response.assert_status_ok();
        let json: serde_json::Value = response.json();
        assert_eq!(json.get("service").and_then(|v| v.as_str()), Some("producer"));
        assert_eq!(json.get("status").and_then(|v| v.as_str()), Some(expected));
    }
}

// --- WebSocket message tests (require http_transport + ws feature) ---

#[tokio::test]
async fn test_ws_telemetry_sends_welcome_frame_first() {
    let (server, _tx) = test_server_with_http();
    let mut ws = server
        .get_websocket("/ws/telemetry")
        .await
        .into_websocket()
        .await;
    let text = ws.receive_text().await;
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("info"));
    assert_eq!(
        json.pointer("/device/hostname").and_then(|v| v.as_str()),
        Some("router-core-01")
    );
}

// Receive until we get a parseable telemetry message (welcome frame and
// pings come first).
async fn receive_first_message(ws: &mut axum_test::TestWebSocket) -> TelemetryMessage {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<TelemetryMessage>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for telemetry message"
        );
    }
}

#[tokio::test]
async fn test_ws_telemetry_receives_broadcast_message() {
    let (server, tx) = test_server_with_http();
    let mut engine = SimulationEngine::new(test_dataset(vec![up_interface("ethernet-1/1")]), Some(1));
    engine.tick(chrono::Utc::now());
    let message = TelemetryMessage {
        timestamp: "2024-06-15T12:00:00+00:00".into(),
        device: "router-core-01".into(),
        data: engine.snapshot(),
    };

    let mut ws = server
        .get_websocket("/ws/telemetry")
        .await
        .into_websocket()
        .await;
    let tx_clone = tx.clone();
    let message_clone = message.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let _ = tx_clone.send(message_clone);
    });
    let received = receive_first_message(&mut ws).await;
    assert_eq!(received, message);
    assert_eq!(received.data.interfaces[0].name, "ethernet-1/1");
}
