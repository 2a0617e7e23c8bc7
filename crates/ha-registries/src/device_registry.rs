//! Device Registry
//!
//! Tracks devices and the config entries that provide them.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A registered device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Config entries providing this device
    #[serde(default)]
    pub config_entries: HashSet<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Device Registry, insertion ordered
#[derive(Default)]
pub struct DeviceRegistry {
    devices: RwLock<IndexMap<String, Arc<DeviceEntry>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a device owned by `config_entry_id`
    pub fn create(&self, name: impl Into<String>, config_entry_id: &str) -> Arc<DeviceEntry> {
        let device = Arc::new(DeviceEntry {
            id: ulid::Ulid::new().to_string().to_lowercase(),
            name: name.into(),
            manufacturer: None,
            model: None,
            config_entries: HashSet::from([config_entry_id.to_string()]),
            created_at: Utc::now(),
        });

        if let Ok(mut devices) = self.devices.write() {
            devices.insert(device.id.clone(), Arc::clone(&device));
        }
        info!(device_id = %device.id, name = %device.name, "Registered device");
        device
    }

    pub fn get(&self, device_id: &str) -> Option<Arc<DeviceEntry>> {
        self.devices
            .read()
            .ok()
            .and_then(|d| d.get(device_id).cloned())
    }

    pub fn len(&self) -> usize {
        self.devices.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
