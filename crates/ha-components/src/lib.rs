//! Home Assistant Built-in Components
//!
//! The pieces of the host that integrations plug into: the runtime handle
//! ([`HomeAssistant`]) and the `switch` entity component.

mod hass;
pub mod switch;

pub use hass::HomeAssistant;
pub use switch::{SwitchEntity, SwitchError, SwitchPlatform};
