//! State type representing an entity's current state

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Context, EntityId};

/// The state of an entity at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub entity_id: EntityId,

    /// The state value (e.g., "on", "off", "playing", "unavailable")
    pub state: String,

    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,

    /// When the state value last changed
    pub last_changed: DateTime<Utc>,

    /// When the state or its attributes were last written
    pub last_updated: DateTime<Utc>,

    pub context: Context,
}

impl State {
    pub fn new(
        entity_id: EntityId,
        state: impl Into<String>,
        attributes: HashMap<String, serde_json::Value>,
        context: Context,
    ) -> Self {
        let now = Utc::now();
        Self {
            entity_id,
            state: state.into(),
            attributes,
            last_changed: now,
            last_updated: now,
            context,
        }
    }

    /// Build the successor of this state; `last_changed` only moves when the
    /// state value itself differs.
    pub fn with_update(
        &self,
        new_state: impl Into<String>,
        new_attributes: HashMap<String, serde_json::Value>,
        context: Context,
    ) -> Self {
        let now = Utc::now();
        let new_state = new_state.into();
        let last_changed = if self.state == new_state {
            self.last_changed
        } else {
            now
        };

        Self {
            entity_id: self.entity_id.clone(),
            state: new_state,
            attributes: new_attributes,
            last_changed,
            last_updated: now,
            context,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.state == crate::STATE_UNAVAILABLE
    }

    /// Get a typed attribute value by key
    pub fn attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get a string attribute without cloning
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tv() -> EntityId {
        "media_player.frame".parse().unwrap()
    }

    #[test]
    fn test_update_keeps_last_changed_for_same_value() {
        let first = State::new(tv(), "on", HashMap::new(), Context::new());
        let attrs = HashMap::from([("source".to_string(), json!("HDMI1"))]);
        let second = first.with_update("on", attrs, Context::new());

        assert_eq!(second.last_changed, first.last_changed);
        assert_eq!(second.attribute_str("source"), Some("HDMI1"));
    }

    #[test]
    fn test_update_moves_last_changed_for_new_value() {
        let first = State::new(tv(), "on", HashMap::new(), Context::new());
        let second = first.with_update("off", HashMap::new(), Context::new());

        assert!(second.last_changed >= first.last_changed);
        assert_eq!(second.state, "off");
    }

    #[test]
    fn test_typed_attribute() {
        let attrs = HashMap::from([("volume_level".to_string(), json!(0.4))]);
        let state = State::new(tv(), "on", attrs, Context::new());

        assert_eq!(state.attribute::<f64>("volume_level"), Some(0.4));
        assert_eq!(state.attribute::<String>("volume_level"), None);
        assert_eq!(state.attribute_str("missing"), None);
        assert!(!state.is_unavailable());
    }
}
