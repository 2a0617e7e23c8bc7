use ha_components::SwitchError;
use thiserror::Error;

use crate::art_mode::ArtModeError;

/// Errors raised while setting up a config entry
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("config entry {0} has no host in its data")]
    MissingHost(String),

    #[error("config entry {0} is already set up")]
    AlreadySetUp(String),

    #[error("config entry {entry_id} belongs to '{domain}'")]
    WrongDomain { entry_id: String, domain: String },

    #[error(transparent)]
    ArtMode(#[from] ArtModeError),

    #[error(transparent)]
    Switch(#[from] SwitchError),
}
