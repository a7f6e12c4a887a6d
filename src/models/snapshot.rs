// Transmissible snapshot models: projection + publish envelope

use serde::{Deserialize, Serialize};

use super::{InterfaceStatistics, OperState, TrafficRate};

/// Static device identity; computed once at engine construction and exposed
/// via GET /api/info and the WebSocket welcome frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceInfo {
    pub hostname: String,
    pub version: String,
    pub last_booted: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FanReading {
    pub id: u32,
    pub speed: i64,
    pub speed_rpm: i64,
}

/// Minimal per-interface view. Interfaces never observed up project zeroed
/// statistics and traffic-rate rather than being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceView {
    pub name: String,
    pub oper_state: OperState,
    pub statistics: InterfaceStatistics,
    pub traffic_rate: TrafficRate,
}

/// The filtered projection sent downstream every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelemetrySnapshot {
    pub cpu: i64,
    pub memory: i64,
    pub fans: Vec<FanReading>,
    pub interfaces: Vec<InterfaceView>,
}

/// Publish envelope: one per tick, shared by the WebSocket and MQTT paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryMessage {
    pub timestamp: String,
    pub device: String,
    pub data: TelemetrySnapshot,
}
