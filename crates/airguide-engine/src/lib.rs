//! Guide engine for airguide.
//!
//! Owns the schedule timeline, reconciles it against wall-clock time, refills
//! it from a [`airguide_api::xmltv::GuideSource`] and drives a
//! [`render::RenderAdapter`].

/// Time source abstraction.
pub mod clock;
/// Refresh scheduler.
pub mod engine;
/// Display formatting and row view-model.
pub mod present;
/// Render surface trait and adapters.
pub mod render;
/// Schedule store and reconciliation.
pub mod store;
/// Staggered transition timing.
pub mod transition;

pub use clock::{Clock, SystemClock};
pub use engine::{
    DEFAULT_CHANNEL_ID, DEFAULT_LOW_WATER_MARK, DEFAULT_POLL_INTERVAL, EngineHandle,
    EngineSettings, GuideEngine, report_failure,
};
pub use render::{ChannelRenderer, GuideUpdate, RenderAdapter};
pub use store::{ReconcileResult, ScheduleStore};
