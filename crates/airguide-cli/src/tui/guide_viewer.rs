//! Guide viewer TUI main loop.

use std::io;
use std::time::{Duration, Instant};

use airguide_engine::GuideUpdate;
use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

use super::state::GuideViewerState;
use super::ui;

/// Frame interval while a transition plays.
const ANIMATION_FRAME: Duration = Duration::from_millis(30);
/// Frame interval otherwise.
const IDLE_FRAME: Duration = Duration::from_millis(250);

/// Runs the guide viewer until the user quits or the engine goes away.
///
/// Blocks the calling thread; run it on a blocking task.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub fn run_guide_viewer(mut updates: UnboundedReceiver<GuideUpdate>, channel_id: &str) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let mut state = GuideViewerState::new(channel_id);

    let result = run_event_loop(&mut terminal, &mut state, &mut updates);

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut GuideViewerState,
    updates: &mut UnboundedReceiver<GuideUpdate>,
) -> Result<()> {
    loop {
        loop {
            match updates.try_recv() {
                Ok(update) => state.apply(update, Local::now(), Instant::now()),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("Guide engine closed the update channel");
                    return Ok(());
                }
            }
        }

        let at = Instant::now();
        state.settle(at);
        terminal
            .draw(|frame| ui::draw(frame, state, at))
            .context("failed to draw TUI")?;

        let wait = if state.is_animating() {
            ANIMATION_FRAME
        } else {
            IDLE_FRAME
        };
        if event::poll(wait).context("failed to poll events")?
            && let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
            && handle_input(state, key.code, key.modifiers, Instant::now())
        {
            return Ok(());
        }
    }
}

/// Handles one key press at `at`. Returns `true` to exit the loop.
///
/// Navigation is ignored until an animated redraw has swapped in the new rows.
fn handle_input(
    state: &mut GuideViewerState,
    key: KeyCode,
    modifiers: KeyModifiers,
    at: Instant,
) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
        _ if !state.accepts_input(at) => {}
        KeyCode::Up | KeyCode::Char('k') => state.move_up(),
        KeyCode::Down | KeyCode::Char('j') => state.move_down(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            state.toggle_details();
        }
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use airguide_api::xmltv::{ProgramEntry, Timeline};
    use chrono::{DateTime, TimeZone};

    use super::*;

    fn local(h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 15, h, 0, 0).single().unwrap()
    }

    fn loaded_state() -> GuideViewerState {
        let entries = (14..17)
            .map(|h| ProgramEntry {
                title: format!("Show {h}"),
                description: String::from("story"),
                episode: String::new(),
                release_year: None,
                start: local(h),
                stop: local(h + 1),
                is_current: h == 14,
            })
            .collect();
        let mut state = GuideViewerState::new("C1");
        state.apply(
            GuideUpdate::Timeline {
                timeline: Timeline::new(entries),
                animate: false,
            },
            local(14),
            Instant::now(),
        );
        state
    }

    #[test]
    fn test_quit_keys() {
        let mut state = loaded_state();
        assert!(handle_input(&mut state, KeyCode::Char('q'), KeyModifiers::NONE, Instant::now()));
        assert!(handle_input(&mut state, KeyCode::Esc, KeyModifiers::NONE, Instant::now()));
        assert!(handle_input(&mut state, KeyCode::Char('c'), KeyModifiers::CONTROL, Instant::now()));
        assert!(!handle_input(&mut state, KeyCode::Char('c'), KeyModifiers::NONE, Instant::now()));
    }

    #[test]
    fn test_navigation_keys() {
        // Arrange
        let mut state = loaded_state();

        // Act
        handle_input(&mut state, KeyCode::Down, KeyModifiers::NONE, Instant::now());
        handle_input(&mut state, KeyCode::Char('j'), KeyModifiers::NONE, Instant::now());
        handle_input(&mut state, KeyCode::Char('k'), KeyModifiers::NONE, Instant::now());

        // Assert
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn test_toggle_keys() {
        // Arrange
        let mut state = loaded_state();

        // Act & Assert
        assert!(!handle_input(&mut state, KeyCode::Enter, KeyModifiers::NONE, Instant::now()));
        assert_eq!(state.expanded(), Some(0));
        handle_input(&mut state, KeyCode::Char(' '), KeyModifiers::NONE, Instant::now());
        assert_eq!(state.expanded(), None);
    }

    #[test]
    fn test_navigation_ignored_while_rows_leave() {
        // Arrange
        let mut state = loaded_state();
        let at = Instant::now();
        let entries = (15..18)
            .map(|h| ProgramEntry {
                title: format!("Show {h}"),
                description: String::from("story"),
                episode: String::new(),
                release_year: None,
                start: local(h),
                stop: local(h + 1),
                is_current: h == 15,
            })
            .collect();
        state.apply(
            GuideUpdate::Timeline {
                timeline: Timeline::new(entries),
                animate: true,
            },
            local(15),
            at,
        );
        let leaving = at.checked_add(Duration::from_millis(100)).unwrap();

        // Act
        handle_input(&mut state, KeyCode::Down, KeyModifiers::NONE, leaving);
        handle_input(&mut state, KeyCode::Enter, KeyModifiers::NONE, leaving);

        // Assert
        assert_eq!(state.cursor, 0);
        assert_eq!(state.expanded(), None);
        assert!(handle_input(&mut state, KeyCode::Char('q'), KeyModifiers::NONE, leaving));
    }
}
