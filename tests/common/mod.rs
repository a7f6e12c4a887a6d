// Shared test helpers

use netprobe_sim::models::*;

pub const LAST_CLEAR: &str = "2024-06-15T00:00:00Z";

pub fn zero_statistics() -> InterfaceStatistics {
    InterfaceStatistics {
        last_clear: LAST_CLEAR.into(),
        ..Default::default()
    }
}

pub fn up_interface(name: &str) -> Interface {
    Interface {
        name: name.into(),
        oper_state: OperState::Up,
        statistics: Some(zero_statistics()),
        traffic_rate: Some(TrafficRate::default()),
    }
}

pub fn down_interface(name: &str) -> Interface {
    Interface {
        name: name.into(),
        oper_state: OperState::Down,
        statistics: None,
        traffic_rate: None,
    }
}

pub fn test_dataset(interfaces: Vec<Interface>) -> DeviceDataset {
    DeviceDataset {
        system: SystemInformation {
            hostname: "router-core-01".into(),
            version: "24.3.1".into(),
            last_booted: "2024-06-01T00:00:00Z".into(),
            current_datetime: LAST_CLEAR.into(),
        },
        resources: vec![
            ResourceEntry {
                name: "cpu".into(),
                used_percent: 12,
            },
            ResourceEntry {
                name: "memory".into(),
                used_percent: 55,
            },
        ],
        fan_trays: vec![
            FanTray {
                id: 1,
                fan: FanUnit {
                    speed: 70,
                    speed_rpm: 9000,
                },
            },
            FanTray {
                id: 2,
                fan: FanUnit {
                    speed: 72,
                    speed_rpm: 9200,
                },
            },
        ],
        interfaces,
    }
}
