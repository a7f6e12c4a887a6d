// MQTT fanout publisher: forwards broadcast telemetry messages to a broker,
// reconnecting with a fixed backoff and reporting liveness on a watch channel.

use crate::config::MqttConfig;
use crate::models::TelemetryMessage;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::time::Duration;

/// Externally visible publisher liveness, exposed via GET /api/status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Online,
    Error,
    Offline,
}

/// Broker link state. Snapshots received while not Connected are dropped:
/// delivery is at-most-once, nothing is buffered for redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

pub fn spawn_mqtt_publisher(
    mut rx: broadcast::Receiver<TelemetryMessage>,
    config: MqttConfig,
    status_tx: watch::Sender<ServiceStatus>,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut opts = MqttOptions::new(&config.client_id, &config.host, config.port);
        opts.set_keep_alive(Duration::from_secs(15));
        let (client, mut eventloop) = AsyncClient::new(opts, 10);

        let reconnect_delay = Duration::from_secs(config.reconnect_secs);
        let mut link = LinkState::Connecting;

        loop {
            tokio::select! {
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                        tracing::info!(
                            host = %config.host,
                            port = config.port,
                            "Connected to MQTT broker"
                        );
                        link = LinkState::Connected;
                        status_tx.send_replace(ServiceStatus::Online);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if link != LinkState::Disconnected {
                            tracing::warn!(
                                error = %e,
                                retry_secs = config.reconnect_secs,
                                "MQTT connection failed; retrying"
                            );
                        }
                        link = LinkState::Disconnected;
                        status_tx.send_replace(ServiceStatus::Error);
                        tokio::time::sleep(reconnect_delay).await;
                        link = LinkState::Connecting;
                    }
                },
                result = rx.recv() => match result {
                    Ok(message) => {
                        if link != LinkState::Connected {
                            continue;
                        }
                        let payload = match serde_json::to_vec(&message) {
                            Ok(p) => p,
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to serialize telemetry message");
                                continue;
                            }
                        };
                        if let Err(e) = client
                            .publish(config.topic.clone(), QoS::AtLeastOnce, false, payload)
                            .await
                        {
                            tracing::warn!(error = %e, "MQTT publish failed");
                            link = LinkState::Disconnected;
                            status_tx.send_replace(ServiceStatus::Error);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("MQTT publisher lagged, skipped {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = &mut shutdown_rx => {
                    tracing::debug!("MQTT publisher shutting down");
                    status_tx.send_replace(ServiceStatus::Offline);
                    let _ = client.disconnect().await;
                    break;
                }
            }
        }
    })
}
