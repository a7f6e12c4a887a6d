// Stateful telemetry simulation engine: advances the device dataset one tick
// at a time with time-correlated randomness, and projects the filtered
// snapshot sent downstream.

mod history;

pub use history::{HistoryEntry, InterfaceHistory};

use crate::models::{
    DeviceDataset, DeviceInfo, FanReading, InterfaceStatistics, InterfaceView, OperState,
    TelemetrySnapshot, TrafficRate,
};
use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chance per tick that an up interface flaps down.
const DOWN_PROBABILITY: f64 = 0.10;
/// Chance per tick that a down interface recovers.
const UP_PROBABILITY: f64 = 0.30;

/// Synthetic packet rate baseline, packets per second per direction.
const BASE_PACKET_RATE: f64 = 1000.0;
/// Traffic multiplier during office hours (8-18h).
const BUSY_TRAFFIC_MULTIPLIER: f64 = 3.0;
/// Fixed average frame size used to derive octet counters from packet deltas.
const AVG_FRAME_OCTETS: u64 = 1500;

/// Instantaneous throughput baselines, office hours vs off-hours.
const BUSY_RATE_BPS: f64 = 2_000_000_000.0;
const IDLE_RATE_BPS: f64 = 500_000_000.0;

fn is_busy_hour(hour: u32) -> bool {
    (8..=18).contains(&hour)
}

fn diurnal_base(hour: u32) -> i64 {
    if is_busy_hour(hour) { 60 } else { 20 }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Owns the device dataset, the interface history table, and the random
/// source. Single-threaded by design: callers serialize `tick`/`snapshot`
/// by confining the engine to one task.
pub struct SimulationEngine {
    dataset: DeviceDataset,
    history: InterfaceHistory,
    rng: StdRng,
    device_info: DeviceInfo,
    down_probability: f64,
    up_probability: f64,
}

impl SimulationEngine {
    /// A seeded engine replays the exact same tick sequence for the same
    /// sequence of `now` values; without a seed the RNG comes from entropy.
    pub fn new(dataset: DeviceDataset, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let device_info = DeviceInfo {
            hostname: dataset.system.hostname.clone(),
            version: dataset.system.version.clone(),
            last_booted: dataset.system.last_booted.clone(),
        };
        Self {
            dataset,
            history: InterfaceHistory::new(),
            rng,
            device_info,
            down_probability: DOWN_PROBABILITY,
            up_probability: UP_PROBABILITY,
        }
    }

    /// Overrides the link-flap probabilities (tests pin these to 0.0 / 1.0
    /// to force or disable transitions through the seeded RNG).
    pub fn set_flap_probabilities(&mut self, down: f64, up: f64) {
        self.down_probability = down;
        self.up_probability = up;
    }

    /// Static identity, computed once at construction.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    pub fn dataset(&self) -> &DeviceDataset {
        &self.dataset
    }

    pub fn history(&self) -> &InterfaceHistory {
        &self.history
    }

    /// Advances the dataset by one time step. Total: no failure modes, the
    /// dataset is always left in a valid shape.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let hour = now.hour();
        let stamp = timestamp(now);

        self.dataset.system.current_datetime = stamp.clone();

        let cpu = diurnal_base(hour) + self.rng.gen_range(-10i64..=10);
        let memory = 60 + self.rng.gen_range(-15i64..=15);
        // Unclamped on purpose: downstream consumers must cope with values
        // outside [0,100].
        for resource in &mut self.dataset.resources {
            match resource.name.as_str() {
                "cpu" => resource.used_percent = cpu,
                "memory" => resource.used_percent = memory,
                _ => {}
            }
        }

        for tray in &mut self.dataset.fan_trays {
            tray.fan.speed = self.rng.gen_range(60i64..=80);
            tray.fan.speed_rpm = self.rng.gen_range(8000i64..=10000);
        }

        let Self {
            dataset,
            history,
            rng,
            down_probability,
            up_probability,
            ..
        } = self;
        for iface in &mut dataset.interfaces {
            match iface.oper_state {
                OperState::Up => {
                    if rng.gen_bool(*down_probability) {
                        // Statistics and traffic-rate stay stale while down.
                        iface.oper_state = OperState::Down;
                    } else {
                        let stats = advance_statistics(
                            &iface.name,
                            iface.statistics.as_ref(),
                            history,
                            rng,
                            now,
                            hour,
                        );
                        iface.statistics = Some(stats);
                        iface.traffic_rate = Some(draw_traffic_rate(rng, hour));
                    }
                }
                OperState::Down => {
                    if rng.gen_bool(*up_probability) {
                        iface.oper_state = OperState::Up;
                        iface.statistics = Some(InterfaceStatistics {
                            last_clear: stamp.clone(),
                            ..Default::default()
                        });
                        // Keep the history at least as fresh as the dataset's
                        // last up observation, or the next delta would resume
                        // from the pre-reset cumulatives.
                        history.update(&iface.name, 0, 0, now);
                        // Traffic-rate is not recomputed on the reset tick.
                    }
                }
            }
        }
    }

    /// Pure projection of the dataset into the transmissible shape. Never
    /// mutates; calling it twice without a tick yields identical output.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let used = |name: &str| {
            self.dataset
                .resources
                .iter()
                .find(|r| r.name == name)
                .map(|r| r.used_percent)
                .unwrap_or(0)
        };
        TelemetrySnapshot {
            cpu: used("cpu"),
            memory: used("memory"),
            fans: self
                .dataset
                .fan_trays
                .iter()
                .map(|t| FanReading {
                    id: t.id,
                    speed: t.fan.speed,
                    speed_rpm: t.fan.speed_rpm,
                })
                .collect(),
            interfaces: self
                .dataset
                .interfaces
                .iter()
                .map(|i| InterfaceView {
                    name: i.name.clone(),
                    oper_state: i.oper_state,
                    statistics: i.statistics.clone().unwrap_or_default(),
                    traffic_rate: i.traffic_rate.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Recomputes cumulative counters for an interface that stays up this tick.
/// The history entry carries the authoritative cumulatives; error/discard
/// counters drift from the previous snapshot values instead, by small
/// non-negative increments.
fn advance_statistics(
    name: &str,
    prev: Option<&InterfaceStatistics>,
    history: &mut InterfaceHistory,
    rng: &mut StdRng,
    now: DateTime<Utc>,
    hour: u32,
) -> InterfaceStatistics {
    let prev = prev.cloned().unwrap_or_default();
    let entry = history.get_or_create(name, prev.in_packets, prev.out_packets, now);

    let mut elapsed = (now - entry.last_update).num_milliseconds() as f64 / 1000.0;
    if elapsed <= 0.0 {
        // Same-instant or backwards clock reads must not stall the rate
        // computation; floor to one second.
        elapsed = 1.0;
    }

    let multiplier = if is_busy_hour(hour) {
        BUSY_TRAFFIC_MULTIPLIER
    } else {
        1.0
    };
    // Symmetric jitter, drawn independently for in and out so the two
    // directions diverge over time.
    let jitter_in: f64 = rng.gen_range(0.8..1.2);
    let jitter_out: f64 = rng.gen_range(0.8..1.2);
    let delta_in = (BASE_PACKET_RATE * elapsed * multiplier * jitter_in).round() as u64;
    let delta_out = (BASE_PACKET_RATE * elapsed * multiplier * jitter_out).round() as u64;

    let in_packets = entry.in_packets + delta_in;
    let out_packets = entry.out_packets + delta_out;

    let stats = InterfaceStatistics {
        in_packets,
        out_packets,
        in_octets: prev.in_octets + delta_in * AVG_FRAME_OCTETS,
        out_octets: prev.out_octets + delta_out * AVG_FRAME_OCTETS,
        in_error_packets: prev.in_error_packets + rng.gen_range(0u64..=2),
        out_error_packets: prev.out_error_packets + rng.gen_range(0u64..=1),
        in_discarded_packets: prev.in_discarded_packets + rng.gen_range(0u64..=1),
        out_discarded_packets: prev.out_discarded_packets + rng.gen_range(0u64..=1),
        last_clear: if prev.last_clear.is_empty() {
            timestamp(now)
        } else {
            prev.last_clear
        },
    };

    history.update(name, in_packets, out_packets, now);
    stats
}

/// Instantaneous throughput, diurnal-scaled: 2 Gbps baseline during office
/// hours, 0.5 Gbps off-hours, with a uniform fraction per direction.
fn draw_traffic_rate(rng: &mut StdRng, hour: u32) -> TrafficRate {
    let base = if is_busy_hour(hour) {
        BUSY_RATE_BPS
    } else {
        IDLE_RATE_BPS
    };
    TrafficRate {
        in_bps: (base * rng.gen_range(0.4..0.5)) as u64,
        out_bps: (base * rng.gen_range(0.6..0.9)) as u64,
    }
}
