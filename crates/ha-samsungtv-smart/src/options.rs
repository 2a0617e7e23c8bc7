//! Frame art options
//!
//! Read from the config entry's options map. Every key is optional and has
//! a default; a key holding a value of the wrong shape is reported and
//! replaced by its default so a bad option never breaks the switch.

use ha_config_entries::ConfigEntry;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const OPT_FRAME_ART_ENABLED: &str = "frame_art_enabled";
pub const OPT_FRAME_ART_SOURCE_OFF: &str = "frame_art_source_off";
pub const OPT_FRAME_ART_APP_ID: &str = "frame_art_app_id";
pub const OPT_FRAME_ART_SELECT_DELAY: &str = "frame_art_select_delay";
pub const OPT_FRAME_ART_RETRIES: &str = "frame_art_retries";
pub const OPT_FRAME_ART_RETRY_SLEEP: &str = "frame_art_retry_sleep";

pub const DEFAULT_FRAME_ART_ENABLED: bool = true;
pub const DEFAULT_FRAME_ART_APP_ID: &str = "TV/HDMI";
pub const DEFAULT_FRAME_ART_SELECT_DELAY: Duration = Duration::from_millis(600);
pub const DEFAULT_FRAME_ART_RETRIES: u32 = 6;
pub const DEFAULT_FRAME_ART_RETRY_SLEEP: Duration = Duration::from_millis(350);

/// An option value that can't be used
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("option '{key}' has the wrong type: {source}")]
    WrongType {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("option '{key}' must be a non-negative number of seconds, got {value}")]
    InvalidDuration { key: &'static str, value: f64 },

    #[error("option '{key}' must be a non-negative whole number, got {value}")]
    InvalidCount { key: &'static str, value: f64 },
}

/// What to do after Art Mode is switched off
#[derive(Debug, Clone, PartialEq)]
pub struct FrameArtOptions {
    /// Run the post-toggle sequence at all
    pub enabled: bool,
    /// Source to select; `None` skips the source step
    pub source_off: Option<String>,
    /// App / input to select; `None` skips the app step
    pub app_id: Option<String>,
    /// Pause before each select call
    pub select_delay: Duration,
    /// How many times to poll for the requested value
    pub retries: u32,
    /// Pause between polls
    pub retry_sleep: Duration,
}

impl Default for FrameArtOptions {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_FRAME_ART_ENABLED,
            source_off: None,
            app_id: Some(DEFAULT_FRAME_ART_APP_ID.to_string()),
            select_delay: DEFAULT_FRAME_ART_SELECT_DELAY,
            retries: DEFAULT_FRAME_ART_RETRIES,
            retry_sleep: DEFAULT_FRAME_ART_RETRY_SLEEP,
        }
    }
}

impl FrameArtOptions {
    /// Parse the entry's options, replacing unusable values with defaults
    pub fn from_entry(entry: &ConfigEntry) -> Self {
        let defaults = Self::default();
        Self {
            enabled: or_default(read(entry, OPT_FRAME_ART_ENABLED), defaults.enabled),
            source_off: or_default(
                read_label(entry, OPT_FRAME_ART_SOURCE_OFF),
                defaults.source_off,
            ),
            app_id: or_default(read_label(entry, OPT_FRAME_ART_APP_ID), defaults.app_id),
            select_delay: or_default(
                read_seconds(entry, OPT_FRAME_ART_SELECT_DELAY),
                defaults.select_delay,
            ),
            retries: or_default(read_count(entry, OPT_FRAME_ART_RETRIES), defaults.retries),
            retry_sleep: or_default(
                read_seconds(entry, OPT_FRAME_ART_RETRY_SLEEP),
                defaults.retry_sleep,
            ),
        }
    }

    /// Parse the entry's options, failing on the first unusable value
    pub fn try_from_entry(entry: &ConfigEntry) -> Result<Self, OptionsError> {
        let defaults = Self::default();
        Ok(Self {
            enabled: read(entry, OPT_FRAME_ART_ENABLED)?.unwrap_or(defaults.enabled),
            source_off: read_label(entry, OPT_FRAME_ART_SOURCE_OFF)?
                .unwrap_or(defaults.source_off),
            app_id: read_label(entry, OPT_FRAME_ART_APP_ID)?.unwrap_or(defaults.app_id),
            select_delay: read_seconds(entry, OPT_FRAME_ART_SELECT_DELAY)?
                .unwrap_or(defaults.select_delay),
            retries: read_count(entry, OPT_FRAME_ART_RETRIES)?.unwrap_or(defaults.retries),
            retry_sleep: read_seconds(entry, OPT_FRAME_ART_RETRY_SLEEP)?
                .unwrap_or(defaults.retry_sleep),
        })
    }
}

fn or_default<T>(value: Result<Option<T>, OptionsError>, default: T) -> T {
    match value {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            warn!(error = %e, "Ignoring invalid option, using default");
            default
        }
    }
}

fn read<T: DeserializeOwned>(
    entry: &ConfigEntry,
    key: &'static str,
) -> Result<Option<T>, OptionsError> {
    entry
        .option::<T>(key)
        .transpose()
        .map_err(|source| OptionsError::WrongType { key, source })
}

/// A label option: `null` or a blank string explicitly disables the step
fn read_label(
    entry: &ConfigEntry,
    key: &'static str,
) -> Result<Option<Option<String>>, OptionsError> {
    let label: Option<Option<String>> = read(entry, key)?;
    Ok(label.map(|l| l.filter(|s| !s.trim().is_empty())))
}

fn read_seconds(entry: &ConfigEntry, key: &'static str) -> Result<Option<Duration>, OptionsError> {
    let Some(secs) = read::<f64>(entry, key)? else {
        return Ok(None);
    };
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|_| OptionsError::InvalidDuration { key, value: secs })
}

/// Whole numbers only, though they may arrive as floats from number selectors
fn read_count(entry: &ConfigEntry, key: &'static str) -> Result<Option<u32>, OptionsError> {
    let Some(value) = read::<f64>(entry, key)? else {
        return Ok(None);
    };
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(OptionsError::InvalidCount { key, value });
    }
    Ok(Some(value as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn entry(pairs: &[(&str, Value)]) -> ConfigEntry {
        let options: HashMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        ConfigEntry::new(crate::DOMAIN, "Living Room").with_options(options)
    }

    #[test]
    fn test_defaults() {
        let parsed = FrameArtOptions::from_entry(&entry(&[]));

        assert_eq!(parsed, FrameArtOptions::default());
        assert!(parsed.enabled);
        assert_eq!(parsed.source_off, None);
        assert_eq!(parsed.app_id.as_deref(), Some("TV/HDMI"));
        assert_eq!(parsed.select_delay, Duration::from_millis(600));
        assert_eq!(parsed.retries, 6);
        assert_eq!(parsed.retry_sleep, Duration::from_millis(350));
    }

    #[test]
    fn test_all_keys() {
        let parsed = FrameArtOptions::try_from_entry(&entry(&[
            (OPT_FRAME_ART_ENABLED, json!(false)),
            (OPT_FRAME_ART_SOURCE_OFF, json!("HDMI1")),
            (OPT_FRAME_ART_APP_ID, json!("TV/HDMI2")),
            (OPT_FRAME_ART_SELECT_DELAY, json!(1)),
            (OPT_FRAME_ART_RETRIES, json!(3.0)),
            (OPT_FRAME_ART_RETRY_SLEEP, json!(0.1)),
            ("unrelated", json!("ignored")),
        ]))
        .unwrap();

        assert_eq!(
            parsed,
            FrameArtOptions {
                enabled: false,
                source_off: Some("HDMI1".to_string()),
                app_id: Some("TV/HDMI2".to_string()),
                select_delay: Duration::from_secs(1),
                retries: 3,
                retry_sleep: Duration::from_millis(100),
            }
        );
    }

    #[test]
    fn test_blank_or_null_label_disables_step() {
        let parsed = FrameArtOptions::from_entry(&entry(&[
            (OPT_FRAME_ART_SOURCE_OFF, json!("  ")),
            (OPT_FRAME_ART_APP_ID, Value::Null),
        ]));

        assert_eq!(parsed.source_off, None);
        assert_eq!(parsed.app_id, None);
    }

    #[test]
    fn test_invalid_values_fall_back_per_key() {
        let parsed = FrameArtOptions::from_entry(&entry(&[
            (OPT_FRAME_ART_ENABLED, json!("yes")),
            (OPT_FRAME_ART_SELECT_DELAY, json!(-1.0)),
            (OPT_FRAME_ART_RETRIES, json!(2.5)),
            (OPT_FRAME_ART_RETRY_SLEEP, json!(0.2)),
        ]));

        assert!(parsed.enabled);
        assert_eq!(parsed.select_delay, DEFAULT_FRAME_ART_SELECT_DELAY);
        assert_eq!(parsed.retries, DEFAULT_FRAME_ART_RETRIES);
        // Valid keys next to invalid ones are still honored
        assert_eq!(parsed.retry_sleep, Duration::from_millis(200));
    }

    #[test]
    fn test_strict_parse_reports_key() {
        let err = FrameArtOptions::try_from_entry(&entry(&[(OPT_FRAME_ART_RETRIES, json!(-2))]))
            .unwrap_err();
        assert!(matches!(
            err,
            OptionsError::InvalidCount { key: OPT_FRAME_ART_RETRIES, .. }
        ));

        let err = FrameArtOptions::try_from_entry(&entry(&[(OPT_FRAME_ART_ENABLED, json!(1))]))
            .unwrap_err();
        assert!(err.to_string().starts_with("option 'frame_art_enabled' has the wrong type"));
    }
}
