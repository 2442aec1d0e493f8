//! `LogRenderer` - draws the guide as log lines.

use airguide_api::xmltv::{GuideError, Timeline};
use airguide_engine::RenderAdapter;
use airguide_engine::present::GuideRow;
use chrono::Local;

/// Formats one row as a single log line.
///
/// `LIVE  2:00 PM - 2:30 PM  Fri 3/15  Title - Episode`
#[must_use]
pub fn format_row(row: &GuideRow) -> String {
    let badge = if row.is_live { "LIVE" } else { "" };
    let mut line = format!(
        "{badge:<4}  {:<19}  {:<8}  {}",
        row.time_range,
        row.date_info.as_deref().unwrap_or_default(),
        row.title
    );
    if let Some(episode) = &row.episode {
        line.push_str(" - ");
        line.push_str(episode);
    }
    line
}

/// Render surface that logs every redraw through `tracing`.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl RenderAdapter for LogRenderer {
    fn render(&mut self, timeline: &Timeline, animate: bool) {
        if timeline.is_empty() {
            tracing::info!("{}", GuideError::EmptyTimeline.user_message());
            return;
        }

        for row in GuideRow::rows(timeline, Local::now()) {
            tracing::info!("{}", format_row(&row));
        }
        tracing::info!(animate, "{} upcoming programs", timeline.len());
    }

    fn render_error(&mut self, error: &GuideError) {
        tracing::warn!("{}", error.user_message());
    }
}
