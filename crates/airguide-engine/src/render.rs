//! Render surface abstraction.

use airguide_api::xmltv::{GuideError, Timeline};
use tokio::sync::mpsc;

/// Surface the engine redraws.
///
/// `render` receives the whole timeline on every redraw; there is no
/// diffing. An empty timeline is drawn as the "No upcoming programs found."
/// notice.
pub trait RenderAdapter {
    /// Redraws the list. `animate` selects the leave-swap-enter transition.
    fn render(&mut self, timeline: &Timeline, animate: bool);

    /// Replaces the list with an inline error message.
    fn render_error(&mut self, error: &GuideError);
}

/// Message forwarded by [`ChannelRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideUpdate {
    /// A redraw with a snapshot of the timeline.
    Timeline {
        /// Timeline snapshot.
        timeline: Timeline,
        /// Animated transition requested.
        animate: bool,
    },
    /// An inline error.
    Error(GuideError),
}

/// Forwards redraws over a tokio channel to a surface on another thread.
#[derive(Debug, Clone)]
pub struct ChannelRenderer {
    tx: mpsc::UnboundedSender<GuideUpdate>,
}

impl ChannelRenderer {
    /// Creates a renderer and the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GuideUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, update: GuideUpdate) {
        if self.tx.send(update).is_err() {
            tracing::debug!("Render surface closed, dropping update");
        }
    }
}

impl RenderAdapter for ChannelRenderer {
    fn render(&mut self, timeline: &Timeline, animate: bool) {
        self.forward(GuideUpdate::Timeline {
            timeline: timeline.clone(),
            animate,
        });
    }

    fn render_error(&mut self, error: &GuideError) {
        self.forward(GuideUpdate::Error(error.clone()));
    }
}
