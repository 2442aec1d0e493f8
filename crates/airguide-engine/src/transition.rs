//! Staggered list transition timing.
//!
//! An animated redraw first marks the displayed rows as leaving, one every
//! [`LEAVE_STAGGER`]. After [`SWAP_DELAY`] the new rows replace the old ones
//! and enter one every [`ENTER_STAGGER`]. [`CLEANUP_DELAY`] after the swap
//! all transition styling is cleared. A non-animated redraw swaps at once but
//! still staggers the entering rows.
//!
//! Everything here is a pure function of the time elapsed since the redraw
//! was requested, so renderers may sample it at any frame rate.

use std::time::Duration;

/// Delay between consecutive rows starting to leave.
pub const LEAVE_STAGGER: Duration = Duration::from_millis(50);

/// Delay from an animated redraw request to the content swap.
pub const SWAP_DELAY: Duration = Duration::from_millis(400);

/// Delay between consecutive rows starting to enter.
pub const ENTER_STAGGER: Duration = Duration::from_millis(100);

/// Delay from the swap until transition styling is cleared.
pub const CLEANUP_DELAY: Duration = Duration::from_millis(1000);

/// Visual phase of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPhase {
    /// Swapped in but its entering stagger has not started.
    Pending,
    /// Playing the entering animation.
    Entering,
    /// No transition styling.
    Settled,
    /// Playing the leaving animation.
    Leaving,
}

/// Offset of row `index` within a stagger.
fn stagger(step: Duration, index: usize) -> Duration {
    u32::try_from(index)
        .ok()
        .and_then(|i| step.checked_mul(i))
        .unwrap_or(Duration::MAX)
}

/// Timing of one redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    animated: bool,
}

impl Transition {
    /// Leave, swap, then enter.
    #[must_use]
    pub const fn animated() -> Self {
        Self { animated: true }
    }

    /// Swap immediately, then enter.
    #[must_use]
    pub const fn immediate() -> Self {
        Self { animated: false }
    }

    /// Builds the transition for a render request.
    #[must_use]
    pub const fn for_render(animate: bool) -> Self {
        Self { animated: animate }
    }

    /// Returns `true` for the leave-then-swap variant.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.animated
    }

    /// Time of the content swap.
    #[must_use]
    pub const fn swap_at(&self) -> Duration {
        if self.animated {
            SWAP_DELAY
        } else {
            Duration::ZERO
        }
    }

    /// Returns `true` once the new rows are displayed.
    #[must_use]
    pub fn is_swapped(&self, elapsed: Duration) -> bool {
        elapsed >= self.swap_at()
    }

    /// Phase of previously displayed row `index` before the swap.
    #[must_use]
    pub fn outgoing_phase(&self, index: usize, elapsed: Duration) -> ItemPhase {
        if self.animated && elapsed >= stagger(LEAVE_STAGGER, index) {
            ItemPhase::Leaving
        } else {
            ItemPhase::Settled
        }
    }

    /// Phase of new row `index`.
    #[must_use]
    pub fn incoming_phase(&self, index: usize, elapsed: Duration) -> ItemPhase {
        let Some(since_swap) = elapsed.checked_sub(self.swap_at()) else {
            return ItemPhase::Pending;
        };
        if since_swap >= CLEANUP_DELAY {
            ItemPhase::Settled
        } else if since_swap >= stagger(ENTER_STAGGER, index) {
            ItemPhase::Entering
        } else {
            ItemPhase::Pending
        }
    }

    /// Returns `true` once transition styling has been cleared.
    #[must_use]
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.swap_at()
            .checked_add(CLEANUP_DELAY)
            .is_some_and(|end| elapsed >= end)
    }
}
