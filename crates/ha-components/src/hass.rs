//! Runtime handle passed to integrations

use ha_registries::{DeviceRegistry, EntityRegistry};
use ha_service_registry::ServiceRegistry;
use ha_state_store::StateStore;
use std::sync::Arc;

use crate::switch::SwitchPlatform;

/// The central Home Assistant instance as seen by integrations
pub struct HomeAssistant {
    /// Current entity states
    pub states: Arc<StateStore>,
    /// Service registry for service calls
    pub services: Arc<ServiceRegistry>,
    pub entities: Arc<EntityRegistry>,
    pub devices: Arc<DeviceRegistry>,
    /// The `switch` component, with its services registered
    pub switches: Arc<SwitchPlatform>,
}

impl HomeAssistant {
    pub fn new() -> Self {
        let states = Arc::new(StateStore::new());
        let services = Arc::new(ServiceRegistry::new());
        let entities = Arc::new(EntityRegistry::new());
        let devices = Arc::new(DeviceRegistry::new());

        let switches = Arc::new(SwitchPlatform::new(states.clone(), entities.clone()));
        SwitchPlatform::register_services(&switches, &services);

        Self {
            states,
            services,
            entities,
            devices,
            switches,
        }
    }
}

impl Default for HomeAssistant {
    fn default() -> Self {
        Self::new()
    }
}
