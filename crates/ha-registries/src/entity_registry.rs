//! Entity Registry
//!
//! Tracks registered entities with unique_id tracking and device linking.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors that can occur in the entity registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("entity already registered: {0}")]
    AlreadyRegistered(String),

    #[error("unique_id {unique_id} already used on platform {platform}")]
    DuplicateUniqueId { platform: String, unique_id: String },
}

/// Reason an entity was disabled
///
/// Serialized in snake_case (`config_entry`, `user`, ...) as the registry
/// file stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledBy {
    /// The owning config entry was disabled
    ConfigEntry,
    /// The parent device was disabled
    Device,
    /// Disabled by the core, e.g. a conflicting entity
    Hass,
    /// The integration registers the entity disabled by default
    Integration,
    /// Disabled from the UI
    User,
}

/// A registered entity entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityEntry {
    /// Internal id
    pub id: String,
    /// Full entity ID (domain.object_id)
    pub entity_id: String,
    /// Integration that provides this entity
    pub platform: String,

    /// Stable id from the integration, unique per platform; survives renames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    /// Config entry that created this entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_entry_id: Option<String>,
    /// Parent device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    /// Name the integration gave the entity when it was registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,

    /// Set while the entity is disabled; disabled entities get no state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_by: Option<DisabledBy>,

    /// Registration time
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl EntityEntry {
    pub fn new(entity_id: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string().to_lowercase(),
            entity_id: entity_id.into(),
            platform: platform.into(),
            unique_id: None,
            config_entry_id: None,
            device_id: None,
            original_name: None,
            disabled_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    pub fn with_config_entry(mut self, config_entry_id: impl Into<String>) -> Self {
        self.config_entry_id = Some(config_entry_id.into());
        self
    }

    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    pub fn disabled(mut self, by: DisabledBy) -> Self {
        self.disabled_by = Some(by);
        self
    }

    /// Get the domain from entity_id
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map_or(self.entity_id.as_str(), |(domain, _)| domain)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled_by.is_some()
    }
}

/// Entity Registry
///
/// Entries are stored as `Arc<EntityEntry>` in insertion order. A secondary
/// index maps `(platform, unique_id)` to the entity_id.
#[derive(Default)]
pub struct EntityRegistry {
    by_entity_id: RwLock<IndexMap<String, Arc<EntityEntry>>>,
    by_unique_id: DashMap<(String, String), String>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry
    pub fn insert(&self, entry: EntityEntry) -> Result<Arc<EntityEntry>, RegistryError> {
        if self.is_registered(&entry.entity_id) {
            return Err(RegistryError::AlreadyRegistered(entry.entity_id));
        }
        if let Some(unique_id) = &entry.unique_id {
            let key = (entry.platform.clone(), unique_id.clone());
            if self.by_unique_id.contains_key(&key) {
                return Err(RegistryError::DuplicateUniqueId {
                    platform: key.0,
                    unique_id: key.1,
                });
            }
            self.by_unique_id.insert(key, entry.entity_id.clone());
        }

        let entry = Arc::new(entry);
        if let Ok(mut idx) = self.by_entity_id.write() {
            idx.insert(entry.entity_id.clone(), Arc::clone(&entry));
        }

        info!(entity_id = %entry.entity_id, platform = %entry.platform, "Registered entity");
        Ok(entry)
    }

    pub fn get(&self, entity_id: &str) -> Option<Arc<EntityEntry>> {
        self.by_entity_id
            .read()
            .ok()
            .and_then(|idx| idx.get(entity_id).cloned())
    }

    pub fn get_by_unique_id(&self, platform: &str, unique_id: &str) -> Option<Arc<EntityEntry>> {
        self.by_unique_id
            .get(&(platform.to_string(), unique_id.to_string()))
            .and_then(|entity_id| self.get(&entity_id))
    }

    pub fn remove(&self, entity_id: &str) -> Option<Arc<EntityEntry>> {
        let removed = self
            .by_entity_id
            .write()
            .ok()
            .and_then(|mut idx| idx.shift_remove(entity_id))?;

        if let Some(unique_id) = &removed.unique_id {
            self.by_unique_id
                .remove(&(removed.platform.clone(), unique_id.clone()));
        }
        info!(entity_id = %entity_id, "Removed entity");
        Some(removed)
    }

    pub fn is_registered(&self, entity_id: &str) -> bool {
        self.by_entity_id
            .read()
            .map(|idx| idx.contains_key(entity_id))
            .unwrap_or(false)
    }

    /// Pick an entity_id for a new entity that conflicts with neither the
    /// registry nor `reserved_ids`, appending `_2`, `_3`, ... when needed.
    pub fn generate_entity_id(
        &self,
        domain: &str,
        suggested_object_id: &str,
        reserved_ids: &[String],
    ) -> String {
        let preferred = format!("{}.{}", domain, suggested_object_id);
        let is_available =
            |id: &str| !self.is_registered(id) && !reserved_ids.iter().any(|r| r == id);

        if is_available(&preferred) {
            return preferred;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{}_{}", preferred, suffix);
            if is_available(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Snapshot of all entries in registration order
    pub fn iter(&self) -> Vec<Arc<EntityEntry>> {
        self.by_entity_id
            .read()
            .map(|idx| idx.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_entity_id.read().map(|idx| idx.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
