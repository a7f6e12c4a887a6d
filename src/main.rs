use anyhow::Result;
use netprobe_sim::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    // A broken or missing base dataset is fatal: never simulate without one.
    let dataset = loader::load(&app_config.device.dataset_path)
        .map_err(|e| anyhow::anyhow!("load dataset {}: {}", app_config.device.dataset_path, e))?;
    let engine = engine::SimulationEngine::new(dataset, app_config.simulation.seed);
    let device_info = Arc::new(engine.device_info().clone());

    let (tx, _) =
        broadcast::channel::<models::TelemetryMessage>(app_config.publishing.broadcast_capacity);
    let (status_tx, status_rx) = watch::channel(publisher::ServiceStatus::Offline);

    let ws_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            engine,
            tx: tx.clone(),
            ws_connections: ws_connections.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            device_name: app_config.device.name.clone(),
            tick_interval_secs: app_config.simulation.tick_interval_secs,
            stats_log_interval_secs: app_config.publishing.stats_log_interval_secs,
            dump_dir: app_config.simulation.dump_dir.clone(),
            dump_every_ticks: app_config.simulation.dump_every_ticks,
        },
    );

    let (mqtt_shutdown_tx, mqtt_handle) = if app_config.mqtt.enabled {
        let (mqtt_shutdown_tx, mqtt_shutdown_rx) = tokio::sync::oneshot::channel();
        let handle = publisher::spawn_mqtt_publisher(
            tx.subscribe(),
            app_config.mqtt.clone(),
            status_tx.clone(),
            mqtt_shutdown_rx,
        );
        (Some(mqtt_shutdown_tx), Some(handle))
    } else {
        // No broker to watch: the service is online once the server is up.
        status_tx.send_replace(publisher::ServiceStatus::Online);
        (None, None)
    };

    let app = routes::app(tx, device_info, ws_connections, status_rx);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c().await
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = worker_handle.await;
                if let Some(mqtt_shutdown_tx) = mqtt_shutdown_tx {
                    let _ = mqtt_shutdown_tx.send(());
                }
                if let Some(mqtt_handle) = mqtt_handle {
                    let _ = mqtt_handle.await;
                }
            }
        }
    }

    Ok(())
}
