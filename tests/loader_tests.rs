// Loader tests: JSON parse, shape validation, dump round-trip

mod common;

use common::{test_dataset, up_interface};
use netprobe_sim::loader::{self, LoadError};

const VALID_DATASET: &str = r#"{
  "system": {
    "hostname": "router-core-01",
    "version": "24.3.1",
    "last-booted": "2024-06-01T00:00:00Z",
    "current-datetime": "2024-06-15T00:00:00Z"
  },
  "resources": [
    { "name": "cpu", "used-percent": 12 },
    { "name": "memory", "used-percent": 55 }
  ],
  "fan-trays": [
    { "id": 1, "fan": { "speed": 70, "speed-rpm": 9000 } }
  ],
  "interfaces": [
    {
      "name": "ethernet-1/1",
      "oper-state": "up",
      "statistics": {
        "in-packets": 1000,
        "out-packets": 900,
        "last-clear": "2024-06-15T00:00:00Z"
      },
      "traffic-rate": { "in-bps": 0, "out-bps": 0 }
    },
    { "name": "ethernet-1/2", "oper-state": "down" }
  ]
}"#;

fn write_dataset(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("base_dataset.json");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_load_valid_dataset() {
    let (_dir, path) = write_dataset(VALID_DATASET);
    let dataset = loader::load(&path).expect("valid dataset loads");
    assert_eq!(dataset.system.hostname, "router-core-01");
    assert_eq!(dataset.resources.len(), 2);
    assert_eq!(dataset.interfaces.len(), 2);
    let first = &dataset.interfaces[0];
    let stats = first.statistics.as_ref().unwrap();
    assert_eq!(stats.in_packets, 1000);
    // Counters absent from the file default to zero.
    assert_eq!(stats.in_octets, 0);
    // An interface never observed up may omit statistics entirely.
    assert!(dataset.interfaces[1].statistics.is_none());
}

#[test]
fn test_load_missing_file_is_io_error() {
    let err = loader::load("/nonexistent/base_dataset.json").unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn test_load_malformed_json_is_parse_error() {
    let (_dir, path) = write_dataset("{ not json ]");
    let err = loader::load(&path).unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
}

#[test]
fn test_load_missing_top_level_key_is_parse_error() {
    let (_dir, path) = write_dataset(r#"{ "system": {} }"#);
    let err = loader::load(&path).unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
}

#[test]
fn test_load_rejects_missing_cpu_resource() {
    let bad = VALID_DATASET.replace(r#""name": "cpu""#, r#""name": "swap""#);
    let (_dir, path) = write_dataset(&bad);
    let err = loader::load(&path).unwrap_err();
    assert!(matches!(err, LoadError::Invalid(_)));
    assert!(err.to_string().contains("cpu"));
}

#[test]
fn test_load_rejects_duplicate_interface_names() {
    let bad = VALID_DATASET.replace("ethernet-1/2", "ethernet-1/1");
    let (_dir, path) = write_dataset(&bad);
    let err = loader::load(&path).unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn test_save_then_load_round_trips() {
    let dataset = test_dataset(vec![up_interface("ethernet-1/1")]);
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("dump.json");
    loader::save(&dataset, &path).expect("save");
    let back = loader::load(&path).expect("load saved dataset");
    assert_eq!(back, dataset);
}
