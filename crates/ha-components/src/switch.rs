//! Switch Component
//!
//! Generic contract for toggle-able `switch.*` entities, and the platform
//! that owns them: it registers them in the entity registry, mirrors their
//! state into the state store after every transition, and routes the
//! `switch.turn_on` / `switch.turn_off` / `switch.toggle` services.

use async_trait::async_trait;
use dashmap::DashMap;
use ha_core::{
    attributes, slugify, Context, EntityId, EntityIdError, ServiceCall, STATE_OFF, STATE_ON,
    STATE_UNAVAILABLE,
};
use ha_registries::{EntityEntry, EntityRegistry, RegistryError};
use ha_service_registry::ServiceRegistry;
use ha_state_store::StateStore;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Entity domain handled by this component
pub const DOMAIN: &str = "switch";

/// Errors raised by the switch platform
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("unknown switch: {0}")]
    UnknownEntity(String),

    #[error("switch already added: {0}")]
    AlreadyAdded(String),

    #[error(transparent)]
    InvalidEntityId(#[from] EntityIdError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A toggle-able entity
///
/// The platform serialises every call on a given entity, so implementations
/// get `&mut self` and need no locking of their own.
#[async_trait]
pub trait SwitchEntity: Send {
    /// Stable id used to find the entity again in the registry
    fn unique_id(&self) -> Option<&str>;

    fn name(&self) -> &str;

    fn is_on(&self) -> bool;

    /// Whether the entity can currently be controlled. May refresh cached
    /// lookups.
    fn available(&mut self) -> bool;

    async fn turn_on(&mut self, context: Context);

    async fn turn_off(&mut self, context: Context);
}

type SharedSwitch = Arc<Mutex<Box<dyn SwitchEntity>>>;

struct AddedSwitch {
    entity_id: EntityId,
    config_entry_id: String,
    entity: SharedSwitch,
}

/// Owner of all added switch entities
pub struct SwitchPlatform {
    states: Arc<StateStore>,
    registry: Arc<EntityRegistry>,
    switches: DashMap<String, AddedSwitch>,
}

impl SwitchPlatform {
    pub fn new(states: Arc<StateStore>, registry: Arc<EntityRegistry>) -> Self {
        Self {
            states,
            registry,
            switches: DashMap::new(),
        }
    }

    /// Add entities provided by `platform` for a config entry
    ///
    /// An entity whose unique_id is already registered keeps its entity_id;
    /// otherwise one is generated from its name. Initial state is written
    /// before returning.
    pub async fn add_entities(
        &self,
        platform: &str,
        config_entry_id: &str,
        entities: Vec<Box<dyn SwitchEntity>>,
    ) -> Result<Vec<EntityId>, SwitchError> {
        let mut added = Vec::with_capacity(entities.len());

        for entity in entities {
            let entity_id = self.register_entity(platform, config_entry_id, entity.as_ref())?;
            let key = entity_id.to_string();
            if self.switches.contains_key(&key) {
                return Err(SwitchError::AlreadyAdded(key));
            }

            self.switches.insert(
                key.clone(),
                AddedSwitch {
                    entity_id: entity_id.clone(),
                    config_entry_id: config_entry_id.to_string(),
                    entity: Arc::new(Mutex::new(entity)),
                },
            );
            self.write_state(&key, Context::new()).await?;

            info!(entity_id = %entity_id, platform, "Added switch");
            added.push(entity_id);
        }

        Ok(added)
    }

    fn register_entity(
        &self,
        platform: &str,
        config_entry_id: &str,
        entity: &dyn SwitchEntity,
    ) -> Result<EntityId, SwitchError> {
        let existing = entity
            .unique_id()
            .and_then(|uid| self.registry.get_by_unique_id(platform, uid));

        let entity_id = match existing {
            Some(entry) => entry.entity_id.clone(),
            None => {
                let entity_id = self.registry.generate_entity_id(
                    DOMAIN,
                    &slugify(entity.name()),
                    &self.states.all_entity_ids(),
                );
                let mut entry = EntityEntry::new(&entity_id, platform)
                    .with_config_entry(config_entry_id)
                    .with_name(entity.name());
                if let Some(uid) = entity.unique_id() {
                    entry = entry.with_unique_id(uid);
                }
                self.registry.insert(entry)?;
                entity_id
            }
        };

        Ok(entity_id.parse::<EntityId>()?)
    }

    fn entity(&self, entity_id: &str) -> Result<(EntityId, SharedSwitch), SwitchError> {
        self.switches
            .get(entity_id)
            .map(|s| (s.entity_id.clone(), Arc::clone(&s.entity)))
            .ok_or_else(|| SwitchError::UnknownEntity(entity_id.to_string()))
    }

    /// Mirror the entity's current state into the state store
    async fn write_state(&self, entity_id: &str, context: Context) -> Result<(), SwitchError> {
        let (id, entity) = self.entity(entity_id)?;
        let mut entity = entity.lock().await;

        let state = if !entity.available() {
            STATE_UNAVAILABLE
        } else if entity.is_on() {
            STATE_ON
        } else {
            STATE_OFF
        };
        let attrs = HashMap::from([(attributes::FRIENDLY_NAME.to_string(), json!(entity.name()))]);

        self.states.set(id, state, attrs, context);
        Ok(())
    }

    pub async fn turn_on(&self, entity_id: &str, context: Context) -> Result<(), SwitchError> {
        let (_, entity) = self.entity(entity_id)?;
        entity.lock().await.turn_on(context.child()).await;
        self.write_state(entity_id, context).await
    }

    pub async fn turn_off(&self, entity_id: &str, context: Context) -> Result<(), SwitchError> {
        let (_, entity) = self.entity(entity_id)?;
        entity.lock().await.turn_off(context.child()).await;
        self.write_state(entity_id, context).await
    }

    pub async fn toggle(&self, entity_id: &str, context: Context) -> Result<(), SwitchError> {
        let (_, entity) = self.entity(entity_id)?;
        {
            let mut entity = entity.lock().await;
            if entity.is_on() {
                entity.turn_off(context.child()).await;
            } else {
                entity.turn_on(context.child()).await;
            }
        }
        self.write_state(entity_id, context).await
    }

    /// Re-evaluate availability and state, e.g. after a dependency changed
    pub async fn refresh(&self, entity_id: &str) -> Result<(), SwitchError> {
        self.write_state(entity_id, Context::new()).await
    }

    pub async fn is_on(&self, entity_id: &str) -> Option<bool> {
        let (_, entity) = self.entity(entity_id).ok()?;
        let is_on = entity.lock().await.is_on();
        Some(is_on)
    }

    /// Remove every switch of a config entry from the platform, the
    /// registry and the state store
    pub fn remove_config_entry(&self, config_entry_id: &str) -> usize {
        let keys: Vec<String> = self
            .switches
            .iter()
            .filter(|s| s.config_entry_id == config_entry_id)
            .map(|s| s.key().clone())
            .collect();

        for key in &keys {
            self.switches.remove(key);
            self.registry.remove(key);
            self.states.remove(key);
            debug!(entity_id = %key, "Removed switch");
        }
        keys.len()
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.switches.iter().map(|s| s.key().clone()).collect()
    }

    /// Register `switch.turn_on`, `switch.turn_off` and `switch.toggle`
    pub fn register_services(platform: &Arc<Self>, services: &ServiceRegistry) {
        for service in ["turn_on", "turn_off", "toggle"] {
            let platform = Arc::clone(platform);
            services.register(DOMAIN, service, move |call: ServiceCall| {
                let platform = Arc::clone(&platform);
                async move {
                    for entity_id in call.entity_ids() {
                        let context = call.context.clone();
                        let result = match service {
                            "turn_on" => platform.turn_on(&entity_id, context).await,
                            "turn_off" => platform.turn_off(&entity_id, context).await,
                            _ => platform.toggle(&entity_id, context).await,
                        };
                        if let Err(e) = result {
                            warn!(entity_id = %entity_id, error = %e, "switch.{} skipped", service);
                        }
                    }
                    Ok(())
                }
            });
        }
        info!("Switch services registered");
    }
}
