//! Config entry lifecycle

use dashmap::DashMap;
use ha_components::{HomeAssistant, SwitchEntity};
use ha_config_entries::ConfigEntry;
use ha_core::EntityId;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::art_mode::ArtModeConnector;
use crate::error::SetupError;
use crate::host::Host;
use crate::switch::FrameHdmiSwitch;
use crate::{CONF_HOST, DOMAIN};

/// Data kept for every loaded config entry
#[derive(Debug, Clone)]
struct EntryData {
    host: String,
    switches: Vec<EntityId>,
}

/// The `samsungtv_smart` integration
pub struct SamsungTvSmart {
    hass: Arc<HomeAssistant>,
    host: Host,
    connector: Arc<dyn ArtModeConnector>,
    entries: DashMap<String, EntryData>,
}

impl SamsungTvSmart {
    pub fn new(hass: Arc<HomeAssistant>, connector: Arc<dyn ArtModeConnector>) -> Self {
        let host = Host::from_hass(&hass);
        Self {
            hass,
            host,
            connector,
            entries: DashMap::new(),
        }
    }

    /// Use `host` instead of the views derived from the runtime
    pub fn with_host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    /// Connect to the TV of `entry` and add its Frame HDMI switch
    #[instrument(skip_all, fields(entry_id = %entry.entry_id))]
    pub async fn setup_entry(&self, entry: &ConfigEntry) -> Result<Vec<EntityId>, SetupError> {
        if entry.domain != DOMAIN {
            return Err(SetupError::WrongDomain {
                entry_id: entry.entry_id.clone(),
                domain: entry.domain.clone(),
            });
        }
        if self.entries.contains_key(&entry.entry_id) {
            return Err(SetupError::AlreadySetUp(entry.entry_id.clone()));
        }

        let tv_host = entry
            .data_str(CONF_HOST)
            .ok_or_else(|| SetupError::MissingHost(entry.entry_id.clone()))?;
        let client = self.connector.connect(tv_host)?;

        let switch: Box<dyn SwitchEntity> =
            Box::new(FrameHdmiSwitch::new(entry, self.host.clone(), client));
        let switches = self
            .hass
            .switches
            .add_entities(DOMAIN, &entry.entry_id, vec![switch])
            .await?;

        self.entries.insert(
            entry.entry_id.clone(),
            EntryData {
                host: tv_host.to_string(),
                switches: switches.clone(),
            },
        );
        info!(host = %tv_host, title = %entry.title, "Set up SamsungTV Smart entry");
        Ok(switches)
    }

    /// Remove the entry's switches; `false` when the entry isn't loaded
    #[instrument(skip(self))]
    pub fn unload_entry(&self, entry_id: &str) -> bool {
        let Some((_, data)) = self.entries.remove(entry_id) else {
            warn!("Unload requested for unknown entry");
            return false;
        };

        let removed = self.hass.switches.remove_config_entry(entry_id);
        info!(host = %data.host, removed, "Unloaded SamsungTV Smart entry");
        true
    }

    pub fn is_loaded(&self, entry_id: &str) -> bool {
        self.entries.contains_key(entry_id)
    }

    pub fn switch_entity_ids(&self, entry_id: &str) -> Vec<String> {
        self.entries
            .get(entry_id)
            .map(|data| data.switches.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}
