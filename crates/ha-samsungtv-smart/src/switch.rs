//! "Frame HDMI" switch
//!
//! On enters Art Mode. Off leaves it and, when enabled in the options,
//! runs the [`PostToggleSequencer`] against the TV's media player.

use async_trait::async_trait;
use ha_components::SwitchEntity;
use ha_config_entries::ConfigEntry;
use ha_core::Context;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::art_mode::{self, ArtModeClient};
use crate::host::Host;
use crate::options::FrameArtOptions;
use crate::resolver::MediaEntityCache;
use crate::sequencer::{PostToggleSequencer, SequenceReport};

pub struct FrameHdmiSwitch {
    entry_id: String,
    title: String,
    unique_id: String,
    name: String,
    is_on: bool,
    options: FrameArtOptions,
    media_entity: MediaEntityCache,
    host: Host,
    client: Arc<dyn ArtModeClient>,
    last_report: Option<SequenceReport>,
}

impl FrameHdmiSwitch {
    pub fn new(entry: &ConfigEntry, host: Host, client: Arc<dyn ArtModeClient>) -> Self {
        Self {
            entry_id: entry.entry_id.clone(),
            title: entry.title.clone(),
            unique_id: format!("{}_frame_hdmi", entry.entry_id),
            name: format!("{} - Frame HDMI", entry.title),
            is_on: false,
            options: FrameArtOptions::from_entry(entry),
            media_entity: MediaEntityCache::new(),
            host,
            client,
            last_report: None,
        }
    }

    pub fn options(&self) -> &FrameArtOptions {
        &self.options
    }

    /// Resolve the media player, reusing the cached one while it exists
    pub fn media_entity_id(&mut self, force: bool) -> Option<String> {
        self.media_entity
            .resolve(&self.entry_id, &self.title, &self.host, force)
    }

    /// Report of the latest post-toggle run
    pub fn last_report(&self) -> Option<&SequenceReport> {
        self.last_report.as_ref()
    }

    pub async fn switch_on(&mut self) {
        if let Err(e) = art_mode::set_art_mode(&self.client, true).await {
            warn!(entry_id = %self.entry_id, error = %e, "Failed to enter art mode");
        }
        self.is_on = true;
    }

    /// Leave Art Mode, then select the configured input
    ///
    /// Returns `None` when the sequence did not run: art mode failed, the
    /// sequence is disabled, or no media player resolves.
    pub async fn switch_off(&mut self, context: Context) -> Option<SequenceReport> {
        let art_mode_off = art_mode::set_art_mode(&self.client, false).await;
        self.is_on = false;

        if let Err(e) = art_mode_off {
            warn!(entry_id = %self.entry_id, error = %e, "Failed to leave art mode");
            return None;
        }
        if !self.options.enabled {
            debug!(entry_id = %self.entry_id, "Input selection disabled");
            return None;
        }
        let Some(media_entity) = self.media_entity_id(false) else {
            warn!(entry_id = %self.entry_id, "No media player to select input on");
            return None;
        };

        let report = PostToggleSequencer::new(&self.host, &self.options)
            .run(&media_entity, context)
            .await;
        info!(
            entity_id = %media_entity,
            confirmed = report.all_confirmed(),
            "Input selection finished"
        );

        self.last_report = Some(report.clone());
        Some(report)
    }
}

#[async_trait]
impl SwitchEntity for FrameHdmiSwitch {
    fn unique_id(&self) -> Option<&str> {
        Some(&self.unique_id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_on(&self) -> bool {
        self.is_on
    }

    fn available(&mut self) -> bool {
        self.media_entity_id(true)
            .is_some_and(|id| self.host.states.contains(&id))
    }

    async fn turn_on(&mut self, _context: Context) {
        self.switch_on().await;
    }

    async fn turn_off(&mut self, context: Context) {
        self.switch_off(context).await;
    }
}
