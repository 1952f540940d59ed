//! Player state for showreel
//!
//! Plain data owned by the controller. Helpers here only touch the data;
//! anything that talks to a surface lives in the controller.

use crate::content::{ItemId, PlayableItem};
use crate::player::PlaybackPhase;
use std::time::{Duration, Instant};

/// Observable state of the embedded player
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Ordered items the player can show
    pub playlist: Vec<PlayableItem>,

    /// Active item, `None` only when the playlist is empty
    pub selected_index: Option<usize>,

    /// Lifecycle of the active item
    pub phase: PlaybackPhase,

    /// Media is advancing
    pub is_playing: bool,

    /// Audio muted, persists across selections
    pub is_muted: bool,

    /// Position over duration, in [0, 1]
    pub progress_fraction: f64,

    /// Active item failed to load or play
    pub has_error: bool,

    /// Long description shown in full
    pub is_description_expanded: bool,

    /// Duration reported by the surface
    pub duration: Option<Duration>,

    /// A play request is outstanding
    pub play_pending: bool,

    /// When the current load began
    pub(crate) load_started_at: Option<Instant>,
}

impl PlaybackState {
    pub fn new(playlist: Vec<PlayableItem>, muted: bool) -> Self {
        let selected_index = if playlist.is_empty() { None } else { Some(0) };

        Self {
            playlist,
            selected_index,
            phase: PlaybackPhase::Idle,
            is_playing: false,
            is_muted: muted,
            progress_fraction: 0.0,
            has_error: false,
            is_description_expanded: false,
            duration: None,
            play_pending: false,
            load_started_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn active_item(&self) -> Option<&PlayableItem> {
        self.selected_index.and_then(|i| self.playlist.get(i))
    }

    /// Whether a callback tagged with `id` belongs to the active item
    pub fn is_active(&self, id: &ItemId) -> bool {
        self.active_item().map_or(false, |item| &item.id == id)
    }

    /// Index after the selection, wrapping
    pub fn next_index(&self) -> Option<usize> {
        let len = self.len();
        self.selected_index.filter(|_| len > 1).map(|i| (i + 1) % len)
    }

    /// Index before the selection, wrapping
    pub fn previous_index(&self) -> Option<usize> {
        let len = self.len();
        self.selected_index.filter(|_| len > 1).map(|i| (i + len - 1) % len)
    }

    /// Clear everything tied to the previous item. Mute survives.
    pub(crate) fn reset_for_selection(&mut self) {
        self.phase = PlaybackPhase::Idle;
        self.is_playing = false;
        self.progress_fraction = 0.0;
        self.has_error = false;
        self.is_description_expanded = false;
        self.duration = None;
        self.play_pending = false;
        self.load_started_at = None;
    }

    /// Position of `id` in the playlist
    pub(crate) fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.playlist.iter().position(|item| &item.id == id)
    }
}
