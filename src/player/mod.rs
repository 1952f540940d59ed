//! Player module for showreel
//!
//! The embedded player ([`PlaybackController`]) and the full-screen
//! overlay ([`ModalOverlay`]) are both explicit state machines. They never
//! touch a media element directly: they drive a [`MediaSurface`] and react
//! to [`MediaEvent`]s tagged with the item that produced them, so late
//! callbacks from a previous selection can be told apart and dropped.

mod controller;
mod controls;
mod event_loop;
mod modal;
mod prefetch;
mod state;
mod surface;

pub use controller::PlaybackController;
pub use controls::ControlState;
pub use event_loop::{run_event_loop, spawn_session, PlayerHandle, PlayerSession, SessionInput};
pub use modal::{Key, KeyOutcome, ModalOverlay, ModalPlaybackState};
pub use prefetch::{HttpPrefetcher, PrefetchError, PrefetchTracker, Prefetcher};
pub use state::PlaybackState;
pub use surface::{FullscreenError, FullscreenHost, HeadlessFullscreen, HeadlessSurface, MediaError, MediaSurface};

use crate::content::{ItemId, PlayableItem};
use crate::media::MediaResolver;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// URL a surface should load for `item`, `None` for image-only items
///
/// Absolute URLs and site paths pass through, bare CDN keys go through
/// `resolver`.
pub(crate) fn media_url_for(resolver: &MediaResolver, item: &PlayableItem) -> Option<crate::Result<String>> {
    use crate::utils::error::IntoShowreelError;

    let url = item.media_url.as_deref().filter(|url| !url.is_empty())?;
    if MediaResolver::is_absolute(url) {
        Some(Ok(url.to_string()))
    } else {
        Some(resolver.public_url(url).media_err(&format!("Cannot resolve media for {}", item.id)))
    }
}

/// Lifecycle of the active item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Nothing attached: empty playlist or image-only item
    Idle,

    /// Source attached, metadata pending
    Loading,

    /// Metadata loaded, not yet started
    Ready,

    /// Media is advancing
    Playing,

    /// Paused by the user or the surface
    Paused,

    /// Reached the end under the stop policy
    Ended,

    /// Load or playback failed. Sticky until navigation or retry.
    Failed,
}

/// What happens when the active item finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfMediaPolicy {
    /// Stop on the last frame with progress at 1
    #[default]
    Stop,

    /// Move to the next playlist entry
    Advance,
}

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Behaviour at end of media
    pub end_of_media: EndOfMediaPolicy,

    /// Also warm the previous item, not only the next
    pub prefetch_previous: bool,

    /// Bytes requested when warming an adjacent item
    pub prefetch_bytes: u64,

    /// Treat a load that produced no metadata within this window as failed
    pub load_timeout_ms: Option<u64>,

    /// Idle time before the overlay hides its controls
    pub controls_hide_delay_ms: u64,

    /// Start with audio muted
    pub start_muted: bool,

    /// Width requested for CDN-resolved posters
    pub poster_width: u32,

    /// Poster used when an item has none
    pub default_poster: String,

    /// Period of the event loop's timer tick
    pub tick_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            end_of_media: EndOfMediaPolicy::Stop,
            prefetch_previous: false,
            prefetch_bytes: 1024 * 1024,
            load_timeout_ms: None,
            controls_hide_delay_ms: 3000,
            start_muted: false,
            poster_width: 640,
            default_poster: "/placeholder.svg".to_string(),
            tick_interval_ms: 250,
        }
    }
}

impl PlayerConfig {
    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }

    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// User intents addressed to the embedded player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    SelectIndex(usize),
    Next,
    Previous,
    TogglePlayPause,
    ToggleMute,
    SeekToFraction(f64),
    ToggleDescription,
    Retry,
    SetPlaylist(Vec<PlayableItem>),
}

/// Callbacks from a media surface, tagged with the originating item
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration became known
    MetadataLoaded { item: ItemId, duration: Duration },

    /// Media started advancing
    Playing { item: ItemId },

    /// Media stopped advancing
    Paused { item: ItemId },

    /// Periodic position report
    TimeUpdate { item: ItemId, current: Duration, duration: Duration },

    /// An asynchronous play request was rejected
    PlayRejected { item: ItemId, reason: String },

    /// Load or decode failure
    Error { item: ItemId, message: String },

    /// Reached the end
    Ended { item: ItemId },
}

impl MediaEvent {
    pub fn item(&self) -> &ItemId {
        match self {
            MediaEvent::MetadataLoaded { item, .. }
            | MediaEvent::Playing { item }
            | MediaEvent::Paused { item }
            | MediaEvent::TimeUpdate { item, .. }
            | MediaEvent::PlayRejected { item, .. }
            | MediaEvent::Error { item, .. }
            | MediaEvent::Ended { item } => item,
        }
    }
}

/// Input to [`PlaybackController::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    Command(PlayerCommand),
    Media(MediaEvent),
}

/// Notifications emitted by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A new item became active
    SelectionChanged { index: usize, item: ItemId },

    /// Playback started advancing
    PlaybackStarted { item: ItemId },

    /// Playback paused
    PlaybackPaused { item: ItemId },

    /// Progress moved
    ProgressChanged { fraction: f64 },

    /// Mute flag flipped
    MuteChanged { muted: bool },

    /// Active media failed
    MediaFailed { item: ItemId, message: String },

    /// Active media finished
    EndOfMedia { item: ItemId },

    /// An adjacent item is being warmed
    PrefetchIssued { item: ItemId },
}

/// Player event handler trait
pub trait PlayerEventHandler: Send {
    /// Handle player event
    fn handle_event(&mut self, event: PlayerEvent);
}
