//! Overlay controls visibility

use std::time::{Duration, Instant};

/// Visibility of the overlay's controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Controls are hidden until the pointer moves
    Hidden,
    /// Controls are visible, hiding at `hide_at` if an inactivity timer runs
    Visible { hide_at: Option<Instant> },
}

impl Default for ControlState {
    fn default() -> Self {
        ControlState::Visible { hide_at: None }
    }
}

impl ControlState {
    pub fn is_visible(&self) -> bool {
        !matches!(self, ControlState::Hidden)
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, ControlState::Visible { hide_at: Some(_) })
    }

    /// Show controls and restart the inactivity timer, replacing any
    /// previous one
    pub fn show_with_timer(&mut self, now: Instant, delay: Duration) {
        *self = ControlState::Visible {
            hide_at: Some(now + delay),
        };
    }

    /// Show controls with no timer running
    pub fn show_pinned(&mut self) {
        *self = ControlState::Visible { hide_at: None };
    }

    /// Hide controls if the timer has fired. Returns whether they hid.
    pub fn tick(&mut self, now: Instant) -> bool {
        match *self {
            ControlState::Visible { hide_at: Some(deadline) } if now >= deadline => {
                *self = ControlState::Hidden;
                true
            }
            _ => false,
        }
    }
}
