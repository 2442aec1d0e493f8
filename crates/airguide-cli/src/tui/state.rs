//! Guide viewer state management.

use std::time::Instant;

use airguide_api::xmltv::GuideError;
use airguide_engine::GuideUpdate;
use airguide_engine::present::{ExpansionState, GuideRow};
use airguide_engine::transition::{ItemPhase, Transition};
use chrono::{DateTime, Local};

/// What the list area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideView {
    /// Nothing received from the engine yet.
    Loading,
    /// Programme rows.
    Rows,
    /// Inline notice (error or nothing upcoming).
    Notice(&'static str),
}

/// A row as drawn in one frame.
#[derive(Debug, Clone, Copy)]
pub struct DisplayedRow<'a> {
    /// Row data.
    pub row: &'a GuideRow,
    /// Transition phase.
    pub phase: ItemPhase,
    /// Details shown.
    pub expanded: bool,
}

/// In-flight redraw.
#[derive(Debug)]
struct ActiveTransition {
    transition: Transition,
    started: Instant,
    outgoing: Vec<GuideRow>,
}

/// State for the guide viewer TUI.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct GuideViewerState {
    /// Channel shown in the header.
    pub channel_id: String,
    /// Cursor position in the row list.
    pub cursor: usize,
    /// Time of the last update from the engine.
    pub last_update: Option<DateTime<Local>>,
    rows: Vec<GuideRow>,
    notice: Option<&'static str>,
    loaded: bool,
    expansion: ExpansionState,
    active: Option<ActiveTransition>,
}

impl GuideViewerState {
    /// Creates an empty viewer state.
    #[must_use]
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            cursor: 0,
            last_update: None,
            rows: Vec::new(),
            notice: None,
            loaded: false,
            expansion: ExpansionState::default(),
            active: None,
        }
    }

    /// Applies one engine update received at `at`.
    pub fn apply(&mut self, update: GuideUpdate, now: DateTime<Local>, at: Instant) {
        self.loaded = true;
        self.last_update = Some(now);
        self.expansion.reset();

        match update {
            GuideUpdate::Timeline { timeline, animate } => {
                let outgoing = std::mem::take(&mut self.rows);
                self.rows = GuideRow::rows(&timeline, now);
                self.notice = timeline
                    .is_empty()
                    .then_some(GuideError::EmptyTimeline.user_message());
                self.active = Some(ActiveTransition {
                    transition: Transition::for_render(animate),
                    started: at,
                    outgoing: if animate { outgoing } else { Vec::new() },
                });
            }
            GuideUpdate::Error(error) => {
                self.rows.clear();
                self.notice = Some(error.user_message());
                self.active = None;
            }
        }
        self.clamp_cursor();
    }

    /// Drops a finished transition.
    pub fn settle(&mut self, at: Instant) {
        if self
            .active
            .as_ref()
            .is_some_and(|a| a.transition.is_finished(at.saturating_duration_since(a.started)))
        {
            self.active = None;
        }
    }

    /// Returns `true` while a transition is playing.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Returns `false` while previous rows are still leaving.
    ///
    /// Cursor and expansion refer to the new rows, which are not shown
    /// until the swap.
    #[must_use]
    pub fn accepts_input(&self, at: Instant) -> bool {
        self.active.as_ref().is_none_or(|a| {
            a.transition
                .is_swapped(at.saturating_duration_since(a.started))
        })
    }

    /// What the list area shows.
    #[must_use]
    pub const fn view(&self) -> GuideView {
        if !self.loaded {
            GuideView::Loading
        } else if let Some(notice) = self.notice {
            GuideView::Notice(notice)
        } else {
            GuideView::Rows
        }
    }

    /// Current rows (after any pending swap).
    #[must_use]
    pub fn rows(&self) -> &[GuideRow] {
        &self.rows
    }

    /// Rows to draw at `at` with their phases.
    ///
    /// Before an animated swap the previous rows are returned as leaving.
    #[must_use]
    pub fn displayed(&self, at: Instant) -> Vec<DisplayedRow<'_>> {
        let Some(active) = &self.active else {
            return self
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| DisplayedRow {
                    row,
                    phase: ItemPhase::Settled,
                    expanded: self.expansion.is_expanded(i),
                })
                .collect();
        };

        let elapsed = at.saturating_duration_since(active.started);
        if active.transition.is_swapped(elapsed) {
            self.rows
                .iter()
                .enumerate()
                .map(|(i, row)| DisplayedRow {
                    row,
                    phase: active.transition.incoming_phase(i, elapsed),
                    expanded: self.expansion.is_expanded(i),
                })
                .collect()
        } else {
            active
                .outgoing
                .iter()
                .enumerate()
                .map(|(i, row)| DisplayedRow {
                    row,
                    phase: active.transition.outgoing_phase(i, elapsed),
                    expanded: false,
                })
                .collect()
        }
    }

    /// Moves the cursor up.
    pub const fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor down.
    pub fn move_down(&mut self) {
        if self.cursor.saturating_add(1) < self.rows.len() {
            self.cursor = self.cursor.saturating_add(1);
        }
    }

    /// Expands or collapses the row under the cursor.
    pub fn toggle_details(&mut self) -> bool {
        self.expansion.toggle(self.cursor, &self.rows)
    }

    /// Index of the expanded row.
    #[must_use]
    pub const fn expanded(&self) -> Option<usize> {
        self.expansion.expanded()
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }
}
