//! Shared harness for the SamsungTV Smart integration tests
//!
//! [`TestTv`] is a host with one Samsung media player registered under a
//! config entry, recording service handlers, a state reader that counts
//! attribute polls, and a fake Art Mode client.

#![allow(dead_code)]

mod fakes;

pub use fakes::*;

use ha_components::HomeAssistant;
use ha_config_entries::ConfigEntry;
use ha_core::{attributes, Context, EntityId};
use ha_registries::EntityEntry;
use ha_samsungtv_smart::{Host, SamsungTvSmart, CONF_HOST, DOMAIN};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const ENTRY_ID: &str = "01JTESTENTRY";
pub const TITLE: &str = "Living Room";
pub const MEDIA_ENTITY: &str = "media_player.living_room";
pub const SWITCH_ENTITY: &str = "switch.living_room_frame_hdmi";

/// Install a log subscriber writing through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct TestTv {
    pub hass: Arc<HomeAssistant>,
    pub services: ServiceLog,
    pub states: Arc<CountingStates>,
    pub art_mode: Arc<FakeArtMode>,
    pub entry: ConfigEntry,
}

impl TestTv {
    /// A TV whose media player is registered, present in state and accepts
    /// every select call without changing its attributes
    pub fn new(options: Value) -> Self {
        init_tracing();

        let hass = Arc::new(HomeAssistant::new());
        let entry = config_entry(options);

        hass.entities
            .insert(
                EntityEntry::new(MEDIA_ENTITY, DOMAIN)
                    .with_unique_id("AA:BB:CC:DD:EE:FF")
                    .with_config_entry(ENTRY_ID),
            )
            .unwrap();
        set_media_state(&hass, MEDIA_ENTITY, "TV", "art");

        let services = ServiceLog::default();
        for (domain, service) in SELECT_SERVICES {
            services.register(&hass.services, domain, service, Reply::Ok);
        }

        let states = Arc::new(CountingStates::new(hass.states.clone()));

        Self {
            hass,
            services,
            states,
            art_mode: Arc::new(FakeArtMode::default()),
            entry,
        }
    }

    /// Host views with attribute reads counted
    pub fn host(&self) -> Host {
        Host::from_hass(&self.hass).with_states(self.states.clone())
    }

    pub fn integration(&self) -> SamsungTvSmart {
        SamsungTvSmart::new(self.hass.clone(), connector(self.art_mode.clone()))
            .with_host(self.host())
    }

    /// Integration with the entry set up and its switch added
    pub async fn loaded(&self) -> SamsungTvSmart {
        let integration = self.integration();
        integration.setup_entry(&self.entry).await.unwrap();
        integration
    }

    pub async fn call_switch(&self, service: &str) {
        self.hass
            .services
            .call(
                "switch",
                service,
                json!({"entity_id": SWITCH_ENTITY}),
                Context::new(),
            )
            .await
            .unwrap();
    }

    pub fn switch_state(&self) -> Option<String> {
        self.hass.states.get_state(SWITCH_ENTITY)
    }
}

pub const SELECT_SERVICES: [(&str, &str); 3] = [
    ("media_player", "select_source"),
    ("media_player", "play_media"),
    ("samsungtv_smart", "select_app"),
];

pub fn config_entry(options: Value) -> ConfigEntry {
    let options: HashMap<String, Value> = serde_json::from_value(options).unwrap();
    ConfigEntry::new(DOMAIN, TITLE)
        .with_entry_id(ENTRY_ID)
        .with_data(HashMap::from([(CONF_HOST.to_string(), json!("192.168.1.20"))]))
        .with_options(options)
}

pub fn set_media_state(hass: &HomeAssistant, entity_id: &str, source: &str, app_id: &str) {
    let attrs = HashMap::from([
        (attributes::SOURCE.to_string(), json!(source)),
        (attributes::APP_ID.to_string(), json!(app_id)),
    ]);
    hass.states.set(
        entity_id.parse::<EntityId>().unwrap(),
        "on",
        attrs,
        Context::new(),
    );
}
