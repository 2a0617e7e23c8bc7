//! SamsungTV Smart integration: Frame HDMI switch
//!
//! Adds one switch per configured Samsung Frame TV. Turning it on puts the
//! TV in Art Mode. Turning it off leaves Art Mode and then drives the TV's
//! existing `media_player` entity back to a configured source and app,
//! confirming each selection against the entity's attributes.
//!
//! The integration only talks to the host through [`Host`]: registry and
//! state views plus a service caller.

pub mod art_mode;
mod error;
pub mod host;
mod integration;
pub mod options;
pub mod resolver;
pub mod sequencer;
mod switch;

pub use art_mode::{ArtModeClient, ArtModeConnector, ArtModeError};
pub use error::SetupError;
pub use host::{DeviceRegistryView, EntityRegistryView, Host, ServiceCaller, StateReader};
pub use integration::SamsungTvSmart;
pub use options::{FrameArtOptions, OptionsError};
pub use resolver::{resolve_media_entity, MediaEntityCache};
pub use sequencer::{
    PostToggleSequencer, SelectStrategy, SequenceReport, StepKind, StepOutcome, StepReport,
};
pub use switch::FrameHdmiSwitch;

/// Integration domain, also the platform name of its entities
pub const DOMAIN: &str = "samsungtv_smart";

/// Config entry data key holding the TV's address
pub const CONF_HOST: &str = "host";
