// Base dataset load/save (JSON on disk)

use crate::models::DeviceDataset;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid dataset: {0}")]
    Invalid(String),
}

/// Loads and shallowly validates the base dataset. A failure here is fatal
/// at startup: the process must not simulate on a broken dataset.
pub fn load(path: impl AsRef<Path>) -> Result<DeviceDataset, LoadError> {
    let raw = std::fs::read_to_string(path)?;
    let dataset: DeviceDataset = serde_json::from_str(&raw)?;
    validate(&dataset)?;
    Ok(dataset)
}

/// Writes the dataset as pretty-printed JSON (periodic dump support).
pub fn save(dataset: &DeviceDataset, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let json = serde_json::to_string_pretty(dataset)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Shape checks the engine relies on; deep per-field validation is not done.
fn validate(dataset: &DeviceDataset) -> Result<(), LoadError> {
    for required in ["cpu", "memory"] {
        if !dataset.resources.iter().any(|r| r.name == required) {
            return Err(LoadError::Invalid(format!(
                "missing required resource entry '{required}'"
            )));
        }
    }
    let mut seen = HashSet::new();
    for iface in &dataset.interfaces {
        if iface.name.is_empty() {
            return Err(LoadError::Invalid("interface with empty name".into()));
        }
        if !seen.insert(iface.name.as_str()) {
            return Err(LoadError::Invalid(format!(
                "duplicate interface name '{}'",
                iface.name
            )));
        }
    }
    Ok(())
}
