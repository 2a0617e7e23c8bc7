//! Input selection after Art Mode is switched off
//!
//! Leaving Art Mode drops the TV on whatever it last showed. The sequencer
//! moves it to the configured source and then to the configured app /
//! input, confirming each step by polling the media player's attributes
//! for a bounded number of times. Nothing here returns an error: failures
//! are logged and recorded in the [`SequenceReport`].

use ha_core::{attributes, Context};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::host::Host;
use crate::options::FrameArtOptions;
use crate::resolver::MEDIA_PLAYER_DOMAIN;
use crate::DOMAIN;

/// One way of asking the TV to show something
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectStrategy {
    /// `samsungtv_smart.select_app` with `app`
    SelectAppByName,
    /// `samsungtv_smart.select_app` with `app_id`
    SelectAppById,
    /// `media_player.play_media` with content type `app`
    PlayMediaApp,
    /// `media_player.select_source`
    SelectSource,
}

/// Tried in order for the source step
pub const SOURCE_STRATEGIES: &[SelectStrategy] = &[SelectStrategy::SelectSource];

/// Tried in order for the app step, until one call succeeds
pub const APP_STRATEGIES: &[SelectStrategy] = &[
    SelectStrategy::SelectAppByName,
    SelectStrategy::SelectAppById,
    SelectStrategy::PlayMediaApp,
    SelectStrategy::SelectSource,
];

impl SelectStrategy {
    /// `(domain, service)` to call
    pub fn service(self) -> (&'static str, &'static str) {
        match self {
            Self::SelectAppByName | Self::SelectAppById => (DOMAIN, "select_app"),
            Self::PlayMediaApp => (MEDIA_PLAYER_DOMAIN, "play_media"),
            Self::SelectSource => (MEDIA_PLAYER_DOMAIN, "select_source"),
        }
    }

    pub fn payload(self, entity_id: &str, value: &str) -> Value {
        match self {
            Self::SelectAppByName => json!({"entity_id": entity_id, "app": value}),
            Self::SelectAppById => json!({"entity_id": entity_id, "app_id": value}),
            Self::PlayMediaApp => json!({
                "entity_id": entity_id,
                "media_content_type": "app",
                "media_content_id": value,
            }),
            Self::SelectSource => json!({"entity_id": entity_id, "source": value}),
        }
    }

    /// Media player attribute that shows whether the call took effect
    pub fn watched_attribute(self) -> &'static str {
        match self {
            Self::SelectSource => attributes::SOURCE,
            _ => attributes::APP_ID,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Source,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The watched attribute reached the requested value
    Confirmed { strategy: SelectStrategy, polls: u32 },
    /// The call succeeded but the attribute never matched
    TimedOut { strategy: SelectStrategy, polls: u32 },
    /// The call succeeded and polling is turned off (`retries = 0`)
    Sent { strategy: SelectStrategy },
    /// Every strategy's call failed
    CallFailed,
}

impl StepOutcome {
    pub fn strategy(&self) -> Option<SelectStrategy> {
        match *self {
            Self::Confirmed { strategy, .. }
            | Self::TimedOut { strategy, .. }
            | Self::Sent { strategy } => Some(strategy),
            Self::CallFailed => None,
        }
    }

    pub fn polls(&self) -> u32 {
        match *self {
            Self::Confirmed { polls, .. } | Self::TimedOut { polls, .. } => polls,
            Self::Sent { .. } | Self::CallFailed => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub kind: StepKind,
    /// Source or app that was asked for
    pub requested: String,
    pub outcome: StepOutcome,
}

/// What a post-toggle run did, step by step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    pub media_entity: String,
    pub steps: Vec<StepReport>,
}

impl SequenceReport {
    pub fn step(&self, kind: StepKind) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    /// Every step that ran was confirmed
    pub fn all_confirmed(&self) -> bool {
        self.steps
            .iter()
            .all(|s| matches!(s.outcome, StepOutcome::Confirmed { .. }))
    }
}

/// Runs the source and app steps for one media player
pub struct PostToggleSequencer<'a> {
    host: &'a Host,
    options: &'a FrameArtOptions,
}

impl<'a> PostToggleSequencer<'a> {
    pub fn new(host: &'a Host, options: &'a FrameArtOptions) -> Self {
        Self { host, options }
    }

    /// Source first, then app. Steps whose option is unset are skipped.
    #[instrument(skip_all, fields(entity_id = %media_entity))]
    pub async fn run(&self, media_entity: &str, context: Context) -> SequenceReport {
        info!("Selecting input after art mode off");
        let mut steps = Vec::with_capacity(2);

        if let Some(source) = &self.options.source_off {
            steps.push(
                self.select(StepKind::Source, SOURCE_STRATEGIES, media_entity, source, &context)
                    .await,
            );
        }
        if let Some(app) = &self.options.app_id {
            steps.push(
                self.select(StepKind::App, APP_STRATEGIES, media_entity, app, &context)
                    .await,
            );
        }

        SequenceReport {
            media_entity: media_entity.to_string(),
            steps,
        }
    }

    #[instrument(skip(self, strategies, media_entity, context))]
    async fn select(
        &self,
        kind: StepKind,
        strategies: &[SelectStrategy],
        media_entity: &str,
        value: &str,
        context: &Context,
    ) -> StepReport {
        tokio::time::sleep(self.options.select_delay).await;

        let mut outcome = StepOutcome::CallFailed;
        for &strategy in strategies {
            let (domain, service) = strategy.service();
            let result = self
                .host
                .services
                .call(domain, service, strategy.payload(media_entity, value), context.child())
                .await;

            match result {
                Ok(()) => {
                    debug!(?strategy, "{}.{} sent", domain, service);
                    outcome = self.wait_for_attribute(strategy, media_entity, value).await;
                    break;
                }
                Err(e) => warn!(?strategy, error = %e, "{}.{} failed", domain, service),
            }
        }

        StepReport {
            kind,
            requested: value.to_string(),
            outcome,
        }
    }

    /// Poll the attribute `strategy` affects until it equals `expected`
    ///
    /// At most `retries` reads, with `retry_sleep` between two reads.
    pub async fn wait_for_attribute(
        &self,
        strategy: SelectStrategy,
        media_entity: &str,
        expected: &str,
    ) -> StepOutcome {
        let retries = self.options.retries;
        if retries == 0 {
            return StepOutcome::Sent { strategy };
        }

        let attribute = strategy.watched_attribute();
        for poll in 1..=retries {
            if poll > 1 {
                tokio::time::sleep(self.options.retry_sleep).await;
            }
            let current = self.host.states.state(media_entity);
            if current.as_ref().and_then(|s| s.attribute_str(attribute)) == Some(expected) {
                debug!(attribute, expected, polls = poll, "Confirmed");
                return StepOutcome::Confirmed { strategy, polls: poll };
            }
        }

        debug!(attribute, expected, polls = retries, "Value not reached, giving up");
        StepOutcome::TimedOut { strategy, polls: retries }
    }
}
