// Domain models (dataset + snapshot shapes)

mod dataset;
mod snapshot;

pub use dataset::{
    DeviceDataset, FanTray, FanUnit, Interface, InterfaceStatistics, OperState, ResourceEntry,
    SystemInformation, TrafficRate,
};
pub use snapshot::{DeviceInfo, FanReading, InterfaceView, TelemetryMessage, TelemetrySnapshot};
