//! Entity state storage for Home Assistant
//!
//! The StateStore holds the current state of every entity the host knows
//! about. Integrations read it to check whether an entity is present and
//! what its attributes say; entity platforms write to it after every
//! transition.

use dashmap::DashMap;
use ha_core::{Context, EntityId, State};
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

/// Current state of all entities, keyed by entity_id string
#[derive(Default)]
pub struct StateStore {
    states: DashMap<String, State>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state of an entity
    ///
    /// `last_changed` is kept when the state value is unchanged.
    #[instrument(skip(self, state, attributes, context), fields(entity_id = %entity_id))]
    pub fn set(
        &self,
        entity_id: EntityId,
        state: impl Into<String>,
        attributes: HashMap<String, serde_json::Value>,
        context: Context,
    ) -> State {
        let key = entity_id.to_string();

        let new_state = match self.states.get(&key) {
            Some(existing) => existing.with_update(state, attributes, context),
            None => State::new(entity_id, state, attributes, context),
        };

        debug!(state = %new_state.state, "Setting entity state");
        self.states.insert(key, new_state.clone());
        new_state
    }

    /// Merge `changes` into the attributes of an existing entity, keeping
    /// its state value. Returns `None` if the entity has no state.
    #[instrument(skip(self, changes, context))]
    pub fn update_attributes(
        &self,
        entity_id: &str,
        changes: HashMap<String, serde_json::Value>,
        context: Context,
    ) -> Option<State> {
        let mut entry = self.states.get_mut(entity_id)?;
        let mut attributes = entry.attributes.clone();
        attributes.extend(changes);

        let updated = entry.with_update(entry.state.clone(), attributes, context);
        *entry = updated.clone();
        trace!("Updated entity attributes");
        Some(updated)
    }

    pub fn get(&self, entity_id: &str) -> Option<State> {
        self.states.get(entity_id).map(|s| s.clone())
    }

    /// Get the state value, or None if the entity doesn't exist
    pub fn get_state(&self, entity_id: &str) -> Option<String> {
        self.states.get(entity_id).map(|s| s.state.clone())
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.states.contains_key(entity_id)
    }

    pub fn all_entity_ids(&self) -> Vec<String> {
        self.states.iter().map(|r| r.key().clone()).collect()
    }

    /// Remove an entity's state
    #[instrument(skip(self))]
    pub fn remove(&self, entity_id: &str) -> Option<State> {
        let removed = self.states.remove(entity_id).map(|(_, s)| s);
        if removed.is_some() {
            trace!("Removed entity state");
        }
        removed
    }
}
