//! `GuideEngine` - refresh scheduler.
//!
//! One engine owns one [`ScheduleStore`], one [`GuideSource`] and one
//! [`RenderAdapter`]. It loads the schedule once at start, then reconciles
//! the timeline on a fixed period and refills it whenever fewer than
//! `low_water_mark` entries remain.

use std::time::Duration;

use airguide_api::xmltv::{GuideError, GuideSource, parse};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::instrument;

use crate::clock::{Clock, SystemClock};
use crate::render::RenderAdapter;
use crate::store::{ReconcileResult, ScheduleStore};

/// Default reconciliation period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default refill threshold.
pub const DEFAULT_LOW_WATER_MARK: usize = 3;

/// Default XMLTV channel identifier.
pub const DEFAULT_CHANNEL_ID: &str = "C1.145.ersatztv.org";

/// Shortest accepted reconciliation period.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Engine policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// XMLTV channel to show.
    pub channel_id: String,
    /// Reconciliation period.
    pub poll_interval: Duration,
    /// Refill when fewer entries than this remain.
    pub low_water_mark: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            channel_id: String::from(DEFAULT_CHANNEL_ID),
            poll_interval: DEFAULT_POLL_INTERVAL,
            low_water_mark: DEFAULT_LOW_WATER_MARK,
        }
    }
}

/// Logs a load failure at the level matching its kind.
///
/// Fetch and decode failures are errors, a channel with no programmes is a
/// warning, and a schedule that has run out is informational.
pub fn report_failure(error: &GuideError) {
    match error {
        GuideError::FetchFailure(_) | GuideError::MalformedDocument(_) => {
            tracing::error!(error = %error, "Failed to load schedule");
        }
        GuideError::NoScheduleData(channel) => {
            tracing::warn!(channel = %channel, "No schedule data found for channel");
        }
        GuideError::EmptyTimeline => {
            tracing::info!("No upcoming programs found");
        }
    }
}

/// Refresh scheduler.
#[derive(Debug)]
pub struct GuideEngine<S, R, C = SystemClock> {
    source: S,
    renderer: R,
    clock: C,
    settings: EngineSettings,
    store: ScheduleStore,
}

impl<S, R> GuideEngine<S, R, SystemClock> {
    /// Creates an engine on the system clock with an empty store.
    pub fn new(source: S, renderer: R, settings: EngineSettings) -> Self {
        Self {
            source,
            renderer,
            clock: SystemClock,
            settings,
            store: ScheduleStore::new(),
        }
    }
}

impl<S, R, C> GuideEngine<S, R, C> {
    /// Replaces the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> GuideEngine<S, R, C2> {
        GuideEngine {
            source: self.source,
            renderer: self.renderer,
            clock,
            settings: self.settings,
            store: self.store,
        }
    }

    /// Returns the store.
    pub const fn store(&self) -> &ScheduleStore {
        &self.store
    }

    /// Returns the renderer.
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns the settings.
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl<S, R, C> GuideEngine<S, R, C>
where
    S: GuideSource,
    R: RenderAdapter,
    C: Clock,
{
    /// Fetches, parses and replaces the timeline, then redraws it.
    ///
    /// On failure the timeline is left as it was and the renderer shows
    /// the error inline. A document whose programmes have all ended still
    /// replaces the timeline (with an empty one).
    ///
    /// # Errors
    ///
    /// Returns the [`GuideError`] that stopped the load, or
    /// [`GuideError::EmptyTimeline`] when nothing upcoming was found.
    #[instrument(skip_all, fields(channel = %self.settings.channel_id))]
    pub async fn refresh(&mut self) -> Result<usize, GuideError> {
        let loaded = match self.source.fetch_document().await {
            Ok(document) => parse(&document, &self.settings.channel_id, self.clock.now()),
            Err(e) => Err(e),
        };

        match loaded {
            Ok(timeline) => {
                let count = timeline.len();
                self.store.replace(timeline);
                self.renderer.render(self.store.snapshot(), false);
                if count == 0 {
                    let error = GuideError::EmptyTimeline;
                    report_failure(&error);
                    return Err(error);
                }
                tracing::info!(count, "Loaded schedule");
                Ok(count)
            }
            Err(e) => {
                report_failure(&e);
                self.renderer.render_error(&e);
                Err(e)
            }
        }
    }

    /// Reconciles against now, redraws on change and refills when low.
    ///
    /// The refill is awaited here, so fetches never overlap.
    pub async fn tick(&mut self) -> ReconcileResult {
        let result = self.store.reconcile(self.clock.now());
        if result.changed {
            tracing::debug!(remaining = result.remaining, "Schedule updated, refreshing display");
            self.renderer.render(self.store.snapshot(), true);
        }

        if result.needs_refill(self.settings.low_water_mark) {
            tracing::info!(
                remaining = result.remaining,
                low_water_mark = self.settings.low_water_mark,
                "Running low on programs, fetching schedule"
            );
            if let Err(e) = self.refresh().await {
                tracing::debug!(error = %e, "Refill did not load a schedule");
            }
        }
        result
    }

    /// Loads the schedule, then ticks every `poll_interval` forever.
    ///
    /// Failures never end the loop; the next tick is the retry.
    pub async fn run(mut self) {
        let period = self.settings.poll_interval.max(MIN_POLL_INTERVAL);
        tracing::info!(
            channel = %self.settings.channel_id,
            poll_interval_secs = period.as_secs(),
            low_water_mark = self.settings.low_water_mark,
            "Starting guide engine"
        );

        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "Initial load did not load a schedule");
        }

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }
}

impl<S, R, C> GuideEngine<S, R, C>
where
    S: GuideSource + Sync + 'static,
    R: RenderAdapter + Send + Sync + 'static,
    C: Clock + 'static,
{
    /// Spawns [`Self::run`] on the current tokio runtime.
    #[must_use]
    pub fn start(self) -> EngineHandle {
        EngineHandle {
            task: tokio::spawn(self.run()),
        }
    }
}

/// Handle to a running engine.
#[derive(Debug)]
pub struct EngineHandle {
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Returns `true` if the engine task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the engine and waits for it to wind down.
    pub async fn stop(self) {
        self.task.abort();
        match self.task.await {
            Err(e) if !e.is_cancelled() => {
                tracing::error!(error = %e, "Guide engine task failed");
            }
            _ => tracing::info!("Guide engine stopped"),
        }
    }
}
