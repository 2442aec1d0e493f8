//! Normalized schedule types.

use chrono::{DateTime, Local};

/// A single programme on the selected channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramEntry {
    /// Programme title (placeholder when the source has none).
    pub title: String,
    /// Free-text description (may be empty, may contain markup).
    pub description: String,
    /// Episode label: on-screen code with sub-title, or release year, or empty.
    pub episode: String,
    /// Four-digit release year taken from `<date>`.
    pub release_year: Option<String>,
    /// Start time.
    pub start: DateTime<Local>,
    /// Stop time.
    pub stop: DateTime<Local>,
    /// Whether the programme was airing at the last reconciliation.
    pub is_current: bool,
}

impl ProgramEntry {
    /// Returns `true` if `start <= now < stop`.
    #[must_use]
    pub fn is_airing_at(&self, now: DateTime<Local>) -> bool {
        self.start <= now && now < self.stop
    }

    /// Returns `true` once the programme has stopped.
    #[must_use]
    pub fn has_ended_at(&self, now: DateTime<Local>) -> bool {
        self.stop <= now
    }

    /// Returns `true` if the description has visible text.
    #[must_use]
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }

    /// Recomputes `is_current`. Returns `true` if the flag flipped.
    pub fn refresh_currency(&mut self, now: DateTime<Local>) -> bool {
        let was_current = self.is_current;
        self.is_current = self.is_airing_at(now);
        was_current != self.is_current
    }
}

/// Programmes ordered ascending by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    entries: Vec<ProgramEntry>,
}

impl Timeline {
    /// Builds a timeline, sorting entries by start time.
    ///
    /// The sort is stable: entries sharing a start keep their document order.
    #[must_use]
    pub fn new(mut entries: Vec<ProgramEntry>) -> Self {
        entries.sort_by_key(|entry| entry.start);
        Self { entries }
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[ProgramEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProgramEntry> {
        self.entries.iter()
    }

    /// Returns the entry flagged as currently airing, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ProgramEntry> {
        self.entries.iter().find(|entry| entry.is_current)
    }

    /// Recomputes `is_current` on every entry. Returns `true` if any flipped.
    pub fn refresh_currency(&mut self, now: DateTime<Local>) -> bool {
        self.entries
            .iter_mut()
            .fold(false, |flipped, entry| entry.refresh_currency(now) || flipped)
    }

    /// Removes every entry with `stop <= now`, preserving order.
    ///
    /// Returns the number of entries removed.
    pub fn evict_ended(&mut self, now: DateTime<Local>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.has_ended_at(now));
        before.saturating_sub(self.entries.len())
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a ProgramEntry;
    type IntoIter = std::slice::Iter<'a, ProgramEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use chrono::TimeZone;

    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 15, h, m, 0).single().unwrap()
    }

    fn entry(title: &str, start: DateTime<Local>, stop: DateTime<Local>) -> ProgramEntry {
        ProgramEntry {
            title: String::from(title),
            description: String::new(),
            episode: String::new(),
            release_year: None,
            start,
            stop,
            is_current: false,
        }
    }

    #[test]
    fn test_timeline_new_sorts_by_start() {
        // Arrange
        let entries = vec![
            entry("late", at(16, 0), at(17, 0)),
            entry("early", at(14, 0), at(15, 0)),
            entry("middle", at(15, 0), at(16, 0)),
        ];

        // Act
        let timeline = Timeline::new(entries);

        // Assert
        let titles: Vec<&str> = timeline.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["early", "middle", "late"]);
    }

    #[test]
    fn test_timeline_new_is_stable_for_equal_starts() {
        // Arrange
        let entries = vec![
            entry("first", at(14, 0), at(15, 0)),
            entry("second", at(14, 0), at(14, 30)),
        ];

        // Act
        let timeline = Timeline::new(entries);

        // Assert
        assert_eq!(timeline.entries()[0].title, "first");
        assert_eq!(timeline.entries()[1].title, "second");
    }

    #[test]
    fn test_airing_window_is_half_open() {
        // Arrange
        let program = entry("show", at(14, 0), at(15, 0));

        // Act & Assert
        assert!(program.is_airing_at(at(14, 0)));
        assert!(program.is_airing_at(at(14, 59)));
        assert!(!program.is_airing_at(at(15, 0)));
        assert!(program.has_ended_at(at(15, 0)));
        assert!(!program.has_ended_at(at(14, 59)));
    }

    #[test]
    fn test_refresh_currency_reports_flips() {
        // Arrange
        let mut timeline = Timeline::new(vec![
            entry("a", at(14, 0), at(15, 0)),
            entry("b", at(15, 0), at(16, 0)),
        ]);

        // Act & Assert
        assert!(timeline.refresh_currency(at(14, 30)));
        assert_eq!(timeline.current().unwrap().title, "a");
        assert!(!timeline.refresh_currency(at(14, 45)));
        assert!(timeline.refresh_currency(at(15, 10)));
        assert_eq!(timeline.current().unwrap().title, "b");
    }

    #[test]
    fn test_evict_ended_preserves_order() {
        // Arrange
        let mut timeline = Timeline::new(vec![
            entry("a", at(14, 0), at(15, 0)),
            entry("b", at(15, 0), at(16, 0)),
            entry("c", at(16, 0), at(17, 0)),
        ]);

        // Act
        let removed = timeline.evict_ended(at(15, 0));

        // Assert
        assert_eq!(removed, 1);
        let titles: Vec<&str> = timeline.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["b", "c"]);
    }

    #[test]
    fn test_has_description_ignores_whitespace() {
        // Arrange
        let mut program = entry("show", at(14, 0), at(15, 0));

        // Act & Assert
        assert!(!program.has_description());
        program.description = String::from("   \n");
        assert!(!program.has_description());
        program.description = String::from("A story.");
        assert!(program.has_description());
    }
}
