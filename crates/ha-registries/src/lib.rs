//! Home Assistant Registries
//!
//! In-memory registries for tracking:
//! - Entities (EntityRegistry)
//! - Devices (DeviceRegistry)
//!
//! Both keep insertion order, so iteration is deterministic for callers that
//! pick "the first match".

pub mod device_registry;
pub mod entity_registry;

pub use device_registry::{DeviceEntry, DeviceRegistry};
pub use entity_registry::{DisabledBy, EntityEntry, EntityRegistry, RegistryError};
