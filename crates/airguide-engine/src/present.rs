//! Display formatting for guide rows.
//!
//! Times use the 12-hour clock without a leading zero (`2:30 PM`); dates use
//! a short weekday and month/day (`Fri 3/15`).

use std::sync::LazyLock;

use airguide_api::xmltv::{ProgramEntry, Timeline};
use chrono::{DateTime, Local, Timelike};
use regex::Regex;

/// Hour before which a programme that started yesterday still counts as tonight.
const AFTER_MIDNIGHT_CUTOFF_HOUR: u32 = 6;

/// Line-break tags (`<br>`, `<br/>`, `<br />`) and closing paragraphs.
#[allow(clippy::expect_used)]
static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</p>").expect("failed to compile line break regex")
});

/// Opening paragraph tags.
#[allow(clippy::expect_used)]
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p>").expect("failed to compile paragraph regex"));

/// Any remaining tag.
#[allow(clippy::expect_used)]
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("failed to compile tag regex"));

/// Formats a time as `2:30 PM`.
#[must_use]
pub fn format_clock(time: DateTime<Local>) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Formats a short date as `Fri 3/15`.
#[must_use]
pub fn format_short_date(time: DateTime<Local>) -> String {
    time.format("%a %-m/%-d").to_string()
}

/// Formats a start/stop pair as `2:30 PM - 3:00 PM`.
#[must_use]
pub fn format_time_range(start: DateTime<Local>, stop: DateTime<Local>) -> String {
    format!("{} - {}", format_clock(start), format_clock(stop))
}

/// Returns the date label shown next to the time range.
///
/// Empty when the programme starts today, or when it started yesterday, is
/// still running, and `now` is before 06:00. Otherwise the start date.
#[must_use]
pub fn format_date_info(
    start: DateTime<Local>,
    stop: DateTime<Local>,
    now: DateTime<Local>,
) -> String {
    let today = now.date_naive();
    let start_day = start.date_naive();
    if start_day == today {
        return String::new();
    }

    let started_yesterday = today.pred_opt() == Some(start_day);
    let running = start <= now && now < stop;
    if started_yesterday && running && now.hour() < AFTER_MIDNIGHT_CUTOFF_HOUR {
        return String::new();
    }

    format_short_date(start)
}

/// Formats a start time: `2:30 PM` today, `Fri 3/15 @ 2:30 PM` otherwise.
#[must_use]
pub fn format_start(start: DateTime<Local>, now: DateTime<Local>) -> String {
    if start.date_naive() == now.date_naive() {
        format_clock(start)
    } else {
        format!("{} @ {}", format_short_date(start), format_clock(start))
    }
}

/// Strips markup from guide text.
///
/// `<br>` and `</p>` become newlines, `<p>` is dropped and every other tag
/// is removed. Trailing whitespace is trimmed.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let text = LINE_BREAK_RE.replace_all(raw, "\n");
    let text = PARAGRAPH_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    String::from(text.trim_end())
}

/// Display model of one programme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideRow {
    /// Cleaned title.
    pub title: String,
    /// Cleaned episode label, if any.
    pub episode: Option<String>,
    /// `2:30 PM - 3:00 PM`.
    pub time_range: String,
    /// Date label, if the programme is not on today's date.
    pub date_info: Option<String>,
    /// Cleaned description, if any.
    pub description: Option<String>,
    /// Currently airing.
    pub is_live: bool,
}

impl GuideRow {
    /// Builds the row for `entry` as seen at `now`.
    #[must_use]
    pub fn from_entry(entry: &ProgramEntry, now: DateTime<Local>) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        Self {
            title: clean_text(&entry.title),
            episode: non_empty(clean_text(&entry.episode)),
            time_range: format_time_range(entry.start, entry.stop),
            date_info: non_empty(format_date_info(entry.start, entry.stop, now)),
            description: entry
                .has_description()
                .then(|| clean_text(&entry.description)),
            is_live: entry.is_current,
        }
    }

    /// Builds rows for a whole timeline.
    #[must_use]
    pub fn rows(timeline: &Timeline, now: DateTime<Local>) -> Vec<Self> {
        timeline
            .iter()
            .map(|entry| Self::from_entry(entry, now))
            .collect()
    }

    /// Rows without a description cannot be expanded.
    #[must_use]
    pub const fn is_expandable(&self) -> bool {
        self.description.is_some()
    }
}

/// Which row, if any, shows its details.
///
/// At most one row is expanded. Any redraw of the list resets the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: Option<usize>,
}

impl ExpansionState {
    /// Returns the expanded row index.
    #[must_use]
    pub const fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    /// Returns `true` if row `index` is expanded.
    #[must_use]
    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    /// Toggles row `index`, collapsing any other row.
    ///
    /// Does nothing for rows that are not expandable. Returns `true` if the
    /// state changed.
    pub fn toggle(&mut self, index: usize, rows: &[GuideRow]) -> bool {
        if !rows.get(index).is_some_and(GuideRow::is_expandable) {
            return false;
        }
        self.expanded = if self.is_expanded(index) {
            None
        } else {
            Some(index)
        };
        true
    }

    /// Collapses everything.
    pub const fn reset(&mut self) {
        self.expanded = None;
    }
}
