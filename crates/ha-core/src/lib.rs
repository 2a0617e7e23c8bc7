//! Core types shared between the host and its integrations
//!
//! Integrations never own host state; they only see it through these types:
//! entity ids, entity states with attributes, service calls and the context
//! that ties a call back to whoever started it.

mod context;
mod entity_id;
mod service_call;
mod slug;
mod state;

pub use context::Context;
pub use entity_id::{EntityId, EntityIdError};
pub use service_call::ServiceCall;
pub use slug::slugify;
pub use state::State;

/// State value written for entities that cannot currently be reached
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// State value for an "on" toggle entity
pub const STATE_ON: &str = "on";

/// State value for an "off" toggle entity
pub const STATE_OFF: &str = "off";

/// Attribute keys the host uses for entity metadata
pub mod attributes {
    /// Human readable name shown in the frontend
    pub const FRIENDLY_NAME: &str = "friendly_name";

    /// Currently selected input source of a media player
    pub const SOURCE: &str = "source";

    /// Currently running app of a media player
    pub const APP_ID: &str = "app_id";
}
