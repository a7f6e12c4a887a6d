// Background simulation worker: tick the engine, project a snapshot,
// broadcast it to subscribers, optionally dump the dataset to disk.

use crate::engine::SimulationEngine;
use crate::loader;
use crate::models::TelemetryMessage;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, interval};

/// Rate limit for "no receivers" logging (avoid logging every tick when no
/// one is on /ws/telemetry and MQTT is disabled)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Engine, channel, and shutdown for the worker. The engine moves into the
/// worker task: all dataset and history mutation is confined there.
pub struct WorkerDeps {
    pub engine: SimulationEngine,
    pub tx: broadcast::Sender<TelemetryMessage>,
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing, identity, and dump config.
pub struct WorkerConfig {
    pub device_name: String,
    pub tick_interval_secs: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
    /// Dump directory; no dumps are written when None.
    pub dump_dir: Option<String>,
    pub dump_every_ticks: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        mut engine,
        tx,
        ws_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        device_name,
        tick_interval_secs,
        stats_log_interval_secs,
        dump_dir,
        dump_every_ticks,
    } = config;

    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(tick_interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut ticks_total: u64 = 0;
        let mut last_no_receivers_warn: Option<Instant> = None;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", tick_interval_secs);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let now = chrono::Utc::now();
                    engine.tick(now);
                    ticks_total += 1;

                    let message = TelemetryMessage {
                        timestamp: now.to_rfc3339(),
                        device: device_name.clone(),
                        data: engine.snapshot(),
                    };

                    // At-most-once delivery: a send with no receivers is
                    // normal, not an error, and ticks continue regardless.
                    if tx.send(message).is_err() {
                        let should_warn = last_no_receivers_warn
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                        if should_warn {
                            tracing::debug!(
                                operation = "broadcast_snapshot",
                                "No active subscribers; broadcast channel has no receivers"
                            );
                            last_no_receivers_warn = Some(Instant::now());
                        }
                    }

                    if let Some(dir) = &dump_dir
                        && ticks_total % dump_every_ticks == 0
                    {
                        let path = dump_path(dir, now);
                        match loader::save(engine.dataset(), &path) {
                            Ok(()) => tracing::debug!(
                                operation = "dump_dataset",
                                path = %path.display(),
                                "Dataset dumped"
                            ),
                            Err(e) => tracing::warn!(
                                error = %e,
                                operation = "dump_dataset",
                                "Failed to dump dataset"
                            ),
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_clients =
                            ws_connections.load(std::sync::atomic::Ordering::Relaxed),
                        ticks_total,
                        tracked_interfaces = engine.history().len(),
                        "app stats"
                    );
                }
            }
        }
    })
}

fn dump_path(dir: &str, now: chrono::DateTime<chrono::Utc>) -> PathBuf {
    PathBuf::from(dir).join(format!(
        "netprobe_data_{}.json",
        now.format("%Y%m%d_%H%M%S")
    ))
}
