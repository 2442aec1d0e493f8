//! `ScheduleStore` - owner of the current timeline.

use airguide_api::xmltv::Timeline;
use chrono::{DateTime, Local};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileResult {
    /// A currency flag flipped or an entry was evicted.
    pub changed: bool,
    /// Entries left after eviction.
    pub remaining: usize,
}

impl ReconcileResult {
    /// Returns `true` if fewer than `low_water_mark` entries remain.
    #[must_use]
    pub const fn needs_refill(&self, low_water_mark: usize) -> bool {
        self.remaining < low_water_mark
    }
}

/// Holds the timeline between refreshes.
///
/// Created empty, replaced wholesale on every successful parse and trimmed
/// in place on every reconcile.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    timeline: Timeline,
}

impl ScheduleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current timeline.
    #[must_use]
    pub const fn snapshot(&self) -> &Timeline {
        &self.timeline
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// Returns `true` if no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Swaps in a freshly parsed timeline.
    pub fn replace(&mut self, timeline: Timeline) {
        tracing::debug!(
            previous = self.timeline.len(),
            next = timeline.len(),
            "Replacing timeline"
        );
        self.timeline = timeline;
    }

    /// Recomputes currency flags and evicts ended entries.
    pub fn reconcile(&mut self, now: DateTime<Local>) -> ReconcileResult {
        let flipped = self.timeline.refresh_currency(now);
        let evicted = self.timeline.evict_ended(now);
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted ended programs");
        }

        ReconcileResult {
            changed: flipped || evicted > 0,
            remaining: self.timeline.len(),
        }
    }
}
