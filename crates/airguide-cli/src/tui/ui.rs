//! TUI rendering logic for the guide viewer.

use std::time::Instant;

use airguide_engine::transition::ItemPhase;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::state::{DisplayedRow, GuideView, GuideViewerState};

/// Draws the guide viewer UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &GuideViewerState, at: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(5),    // guide
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], state);
    draw_guide(frame, chunks[1], state, at);
    draw_footer(frame, chunks[2], state.expanded().is_some());
}

/// Draws the header with channel and last update time.
fn draw_header(frame: &mut Frame, area: Rect, state: &GuideViewerState) {
    let updated = state.last_update.map_or_else(
        || String::from("waiting for schedule"),
        |t| format!("updated {}", t.format("%-I:%M:%S %p")),
    );
    let header = Paragraph::new(format!(
        "{}  |  {} programs  |  {}",
        state.channel_id,
        state.rows().len(),
        updated
    ))
    .block(Block::default().borders(Borders::ALL).title(" Program Guide "));
    frame.render_widget(header, area);
}

/// Style for a row in a given transition phase.
fn phase_style(phase: ItemPhase) -> Style {
    match phase {
        ItemPhase::Entering => Style::default().fg(Color::Cyan),
        ItemPhase::Leaving => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
        ItemPhase::Settled | ItemPhase::Pending => Style::default(),
    }
}

/// Builds the list item for one row.
fn row_item(shown: &DisplayedRow<'_>) -> ListItem<'static> {
    let row = shown.row;
    // Not yet entered: keep the slot, hide the content.
    if shown.phase == ItemPhase::Pending {
        return ListItem::new(Line::from(""));
    }
    let base = phase_style(shown.phase);

    let mut heading = Vec::new();
    if row.is_live {
        heading.push(Span::styled(
            " LIVE ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
        heading.push(Span::raw(" "));
    }
    heading.push(Span::styled(
        row.title.clone(),
        base.add_modifier(Modifier::BOLD),
    ));

    let mut timing = vec![Span::styled(row.time_range.clone(), base)];
    if let Some(date) = &row.date_info {
        timing.push(Span::styled(format!("  {date}"), base.fg(Color::Yellow)));
    }

    let mut lines = vec![Line::from(heading)];
    if let Some(episode) = &row.episode {
        lines.push(Line::from(Span::styled(
            format!("  {episode}"),
            base.add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(timing));

    if shown.expanded
        && let Some(description) = &row.description
    {
        lines.extend(
            description
                .lines()
                .map(|l| Line::from(Span::styled(format!("    {l}"), base.fg(Color::Gray)))),
        );
    } else if row.description.is_some() {
        lines.push(Line::from(Span::styled(
            "    \u{25b8} details",
            Style::default().fg(Color::DarkGray),
        )));
    }

    ListItem::new(lines)
}

/// Draws the programme list, a notice, or the loading placeholder.
fn draw_guide(frame: &mut Frame, area: Rect, state: &GuideViewerState, at: Instant) {
    let block = Block::default().borders(Borders::ALL).title(" Up Next ");

    match state.view() {
        GuideView::Loading => {
            let loading = Paragraph::new("Loading schedule...").block(block);
            frame.render_widget(loading, area);
        }
        GuideView::Notice(message) => {
            let notice = Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(notice, area);
        }
        GuideView::Rows => {
            let displayed = state.displayed(at);
            let items: Vec<ListItem> = displayed.iter().map(row_item).collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)))
                .highlight_symbol("\u{25b8} ");
            let mut list_state =
                ListState::default().with_selected((!displayed.is_empty()).then_some(state.cursor));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect, expanded: bool) {
    let help_text = if expanded {
        "\u{2191}\u{2193}/j/k: move  Enter/Space: hide details  q/Esc: quit"
    } else {
        "\u{2191}\u{2193}/j/k: move  Enter/Space: details  q/Esc: quit"
    };
    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
