//! Read-only views of the host the integration depends on
//!
//! The resolver and sequencer never reach into the host directly; they get
//! a [`Host`] of trait objects, which the real stores implement and tests
//! can wrap or replace.

use async_trait::async_trait;
use ha_components::HomeAssistant;
use ha_core::{Context, State};
use ha_registries::{DeviceRegistry, EntityEntry, EntityRegistry};
use ha_service_registry::{ServiceError, ServiceRegistry};
use ha_state_store::StateStore;
use std::sync::Arc;

/// Snapshot access to the entity registry
pub trait EntityRegistryView: Send + Sync {
    /// All entries, in registry order
    fn entries(&self) -> Vec<Arc<EntityEntry>>;
}

/// Device registry access; only used for diagnostics
pub trait DeviceRegistryView: Send + Sync {
    fn device_count(&self) -> usize;
}

/// Read access to current entity states
pub trait StateReader: Send + Sync {
    fn state(&self, entity_id: &str) -> Option<State>;

    fn contains(&self, entity_id: &str) -> bool {
        self.state(entity_id).is_some()
    }
}

/// Calls host services, waiting for the handler to finish
#[async_trait]
pub trait ServiceCaller: Send + Sync {
    async fn call(
        &self,
        domain: &str,
        service: &str,
        service_data: serde_json::Value,
        context: Context,
    ) -> Result<(), ServiceError>;
}

impl EntityRegistryView for EntityRegistry {
    fn entries(&self) -> Vec<Arc<EntityEntry>> {
        self.iter()
    }
}

impl DeviceRegistryView for DeviceRegistry {
    fn device_count(&self) -> usize {
        self.len()
    }
}

impl StateReader for StateStore {
    fn state(&self, entity_id: &str) -> Option<State> {
        self.get(entity_id)
    }

    fn contains(&self, entity_id: &str) -> bool {
        StateStore::contains(self, entity_id)
    }
}

#[async_trait]
impl ServiceCaller for ServiceRegistry {
    async fn call(
        &self,
        domain: &str,
        service: &str,
        service_data: serde_json::Value,
        context: Context,
    ) -> Result<(), ServiceError> {
        ServiceRegistry::call(self, domain, service, service_data, context).await
    }
}

/// The collaborators handed to the resolver, sequencer and switch
#[derive(Clone)]
pub struct Host {
    pub entities: Arc<dyn EntityRegistryView>,
    pub devices: Arc<dyn DeviceRegistryView>,
    pub states: Arc<dyn StateReader>,
    pub services: Arc<dyn ServiceCaller>,
}

impl Host {
    pub fn from_hass(hass: &HomeAssistant) -> Self {
        Self {
            entities: hass.entities.clone(),
            devices: hass.devices.clone(),
            states: hass.states.clone(),
            services: hass.services.clone(),
        }
    }

    /// Same host with a different state reader
    pub fn with_states(mut self, states: Arc<dyn StateReader>) -> Self {
        self.states = states;
        self
    }

    /// Same host with a different service caller
    pub fn with_services(mut self, services: Arc<dyn ServiceCaller>) -> Self {
        self.services = services;
        self
    }
}
