//! Media player lookup
//!
//! Finds the `media_player` entity that the SamsungTV Smart integration
//! already created for the TV behind a config entry. The switch sends all
//! its follow-up service calls to that entity.

use ha_registries::EntityEntry;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::host::Host;
use crate::DOMAIN;

pub const MEDIA_PLAYER_DOMAIN: &str = "media_player";

/// A registry row that could be the TV's media player
pub fn is_media_candidate(entry: &EntityEntry) -> bool {
    entry.domain() == MEDIA_PLAYER_DOMAIN && entry.platform == DOMAIN && !entry.is_disabled()
}

/// Registry rows that may belong to the TV of `entry_id`, in registry order
///
/// Rows owned by the config entry win. When there are none, rows attached
/// to any device the config entry owns an entity on are used instead.
pub fn candidates<'a>(entry_id: &str, entries: &'a [Arc<EntityEntry>]) -> Vec<&'a EntityEntry> {
    let owned = |e: &&'a EntityEntry| e.config_entry_id.as_deref() == Some(entry_id);

    let direct: Vec<&EntityEntry> = entries
        .iter()
        .map(Arc::as_ref)
        .filter(owned)
        .filter(|e| is_media_candidate(e))
        .collect();
    if !direct.is_empty() {
        return direct;
    }

    let device_ids: HashSet<&str> = entries
        .iter()
        .map(Arc::as_ref)
        .filter(owned)
        .filter_map(|e| e.device_id.as_deref())
        .collect();
    if device_ids.is_empty() {
        return Vec::new();
    }

    entries
        .iter()
        .map(Arc::as_ref)
        .filter(|e| {
            e.device_id
                .as_deref()
                .is_some_and(|d| device_ids.contains(d))
        })
        .filter(|e| is_media_candidate(e))
        .collect()
}

/// Lowercased title with spaces replaced by underscores
pub fn title_slug(title: &str) -> String {
    title.to_lowercase().replace(' ', "_")
}

/// Resolve the media player for a config entry
///
/// Only entities present in host state are returned. With several, the
/// first whose id contains the title slug is preferred.
pub fn resolve_media_entity(entry_id: &str, title: &str, host: &Host) -> Option<String> {
    let entries = host.entities.entries();

    let present: Vec<&EntityEntry> = candidates(entry_id, &entries)
        .into_iter()
        .filter(|e| host.states.contains(&e.entity_id))
        .collect();

    let chosen = match present.as_slice() {
        [] => None,
        [only] => Some(*only),
        several => {
            let slug = title_slug(title);
            several
                .iter()
                .find(|e| !slug.is_empty() && e.entity_id.contains(&slug))
                .or_else(|| several.first())
                .copied()
        }
    };

    match chosen {
        Some(entry) => {
            debug!(entry_id, entity_id = %entry.entity_id, "Resolved media player");
            Some(entry.entity_id.clone())
        }
        None => {
            debug!(
                entry_id,
                entities = entries.len(),
                devices = host.devices.device_count(),
                "No active media player found"
            );
            None
        }
    }
}

/// Cached result of [`resolve_media_entity`]
#[derive(Debug, Default)]
pub struct MediaEntityCache {
    entity_id: Option<String>,
}

impl MediaEntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entity while it is still in host state, resolving
    /// again otherwise or when `force` is set
    pub fn resolve(
        &mut self,
        entry_id: &str,
        title: &str,
        host: &Host,
        force: bool,
    ) -> Option<String> {
        if !force {
            if let Some(cached) = &self.entity_id {
                if host.states.contains(cached) {
                    return Some(cached.clone());
                }
            }
        }

        self.entity_id = resolve_media_entity(entry_id, title, host);
        self.entity_id.clone()
    }

    pub fn get(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }
}
