//! TUI module for the interactive guide viewer.
//!
//! Uses `ratatui` + `crossterm` for rendering.

mod guide_viewer;
/// Guide viewer state types.
pub mod state;
mod ui;

pub use guide_viewer::run_guide_viewer;
