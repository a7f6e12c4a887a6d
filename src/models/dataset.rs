// Device dataset models: identity, resources, fans, interfaces

use serde::{Deserialize, Serialize};

/// Operational state of an interface. Two states only; anything else is
/// unrepresentable, so a corrupted dataset cannot reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperState {
    Up,
    Down,
}

/// Cumulative interface counters. Monotone while the interface stays up;
/// reset to zero (with a fresh `last-clear`) on a down -> up transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct InterfaceStatistics {
    pub in_packets: u64,
    pub out_packets: u64,
    pub in_octets: u64,
    pub out_octets: u64,
    pub in_error_packets: u64,
    pub out_error_packets: u64,
    pub in_discarded_packets: u64,
    pub out_discarded_packets: u64,
    pub last_clear: String,
}

/// Instantaneous throughput; replaced every tick the interface is up,
/// never accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TrafficRate {
    pub in_bps: u64,
    pub out_bps: u64,
}

/// One interface record. `statistics`/`traffic-rate` are None until the
/// interface has been observed up at least once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Interface {
    pub name: String,
    pub oper_state: OperState,
    #[serde(default)]
    pub statistics: Option<InterfaceStatistics>,
    #[serde(default)]
    pub traffic_rate: Option<TrafficRate>,
}

/// Named utilization entry (`cpu`, `memory`, ...). Signed because the
/// simulated percentages are intentionally left unclamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceEntry {
    pub name: String,
    pub used_percent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FanUnit {
    pub speed: i64,
    pub speed_rpm: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FanTray {
    pub id: u32,
    pub fan: FanUnit,
}

/// Device identity block; `current-datetime` is restamped every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystemInformation {
    pub hostname: String,
    pub version: String,
    pub last_booted: String,
    pub current_datetime: String,
}

/// The full operational dataset, exclusively owned by the simulation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceDataset {
    pub system: SystemInformation,
    pub resources: Vec<ResourceEntry>,
    pub fan_trays: Vec<FanTray>,
    pub interfaces: Vec<Interface>,
}
