//! Full-screen video overlay
//!
//! Opens over the page with its own media surface, autoplays, and hides
//! its controls after a period of pointer inactivity while playing.

use crate::content::PlayableItem;
use crate::media::MediaResolver;
use crate::player::{self, ControlState, FullscreenHost, MediaEvent, MediaSurface};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

const LOAD_ERROR_MESSAGE: &str = "Unable to load video. The video source may not be available.";
const NO_VIDEO_MESSAGE: &str = "This project has no video.";

/// Keys the overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Space,
    Mute,
    Fullscreen,
}

impl Key {
    /// Map a DOM-style key name
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Escape" | "Esc" => Some(Key::Escape),
            " " | "Space" | "Spacebar" => Some(Key::Space),
            "m" | "M" => Some(Key::Mute),
            "f" | "F" => Some(Key::Fullscreen),
            _ => None,
        }
    }
}

/// Result of handling a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The overlay acted on the key
    pub handled: bool,

    /// The host should suppress the key's default action
    pub prevent_default: bool,
}

impl KeyOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled() -> Self {
        Self {
            handled: true,
            prevent_default: false,
        }
    }
}

/// State of an open overlay
#[derive(Debug, Clone, PartialEq)]
pub struct ModalPlaybackState {
    pub item: PlayableItem,
    pub is_playing: bool,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub controls: ControlState,
    pub error_message: Option<String>,
}

impl ModalPlaybackState {
    fn new(item: PlayableItem) -> Self {
        Self {
            item,
            is_playing: false,
            is_muted: false,
            is_fullscreen: false,
            controls: ControlState::default(),
            error_message: None,
        }
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible()
    }
}

/// Overlay player
pub struct ModalOverlay {
    surface: Box<dyn MediaSurface>,
    fullscreen: Box<dyn FullscreenHost>,
    hide_delay: Duration,
    resolver: MediaResolver,
    state: Option<ModalPlaybackState>,
}

impl ModalOverlay {
    pub fn new(
        surface: Box<dyn MediaSurface>,
        fullscreen: Box<dyn FullscreenHost>,
        hide_delay: Duration,
    ) -> Self {
        Self {
            surface,
            fullscreen,
            hide_delay,
            resolver: MediaResolver::default(),
            state: None,
        }
    }

    /// Resolve bare CDN keys the same way the embedded player does
    pub fn with_resolver(mut self, resolver: MediaResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&ModalPlaybackState> {
        self.state.as_ref()
    }

    /// Open on `item` and start playing it
    pub fn open(&mut self, item: &PlayableItem, now: Instant) {
        if self.is_open() {
            self.close();
        }

        info!("Opening overlay for {}", item.id);
        let mut state = ModalPlaybackState::new(item.clone());

        match player::media_url_for(&self.resolver, item) {
            Some(Ok(url)) => {
                self.surface.load(item, &url);
                self.surface.set_muted(false);

                match self.surface.play() {
                    Ok(()) => {
                        state.is_playing = true;
                        state.controls.show_with_timer(now, self.hide_delay);
                    }
                    Err(e) => Self::show_error(&mut state, &e),
                }
            }
            Some(Err(e)) => Self::show_error(&mut state, &e),
            None => state.error_message = Some(NO_VIDEO_MESSAGE.to_string()),
        }

        self.state = Some(state);
    }

    /// Close, stopping playback and leaving fullscreen
    pub fn close(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };

        self.surface.reset();

        if state.is_fullscreen {
            if let Err(e) = self.fullscreen.exit_fullscreen() {
                warn!("Failed to exit fullscreen: {}", e);
            }
        }

        info!("Closed overlay for {}", state.item.id);
    }

    /// Handle a key press while open
    pub fn on_key(&mut self, key: &str, now: Instant) -> KeyOutcome {
        if !self.is_open() {
            return KeyOutcome::ignored();
        }

        match Key::from_key_name(key) {
            Some(Key::Escape) => {
                self.close();
                KeyOutcome::handled()
            }
            Some(Key::Space) => {
                self.toggle_play_pause(now);
                KeyOutcome {
                    handled: true,
                    prevent_default: true,
                }
            }
            Some(Key::Mute) => {
                self.toggle_mute();
                KeyOutcome::handled()
            }
            Some(Key::Fullscreen) => {
                self.toggle_fullscreen();
                KeyOutcome::handled()
            }
            None => KeyOutcome::ignored(),
        }
    }

    pub fn toggle_play_pause(&mut self, now: Instant) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if state.error_message.is_some() {
            debug!("Ignoring play toggle on failed overlay media");
            return;
        }

        if state.is_playing {
            self.surface.pause();
            state.is_playing = false;
            state.controls.show_pinned();
        } else {
            match self.surface.play() {
                Ok(()) => {
                    state.is_playing = true;
                    state.controls.show_with_timer(now, self.hide_delay);
                }
                Err(e) => Self::show_error(state, &e),
            }
        }
    }

    pub fn toggle_mute(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.is_muted = !state.is_muted;
            self.surface.set_muted(state.is_muted);
        }
    }

    /// Enter or leave fullscreen. A refused request leaves the flag alone.
    pub fn toggle_fullscreen(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let result = if state.is_fullscreen {
            self.fullscreen.exit_fullscreen()
        } else {
            self.fullscreen.request_fullscreen()
        };

        match result {
            Ok(()) => state.is_fullscreen = !state.is_fullscreen,
            Err(e) => warn!("Fullscreen toggle failed: {}", e),
        }
    }

    /// Pointer moved over the overlay
    pub fn on_pointer_activity(&mut self, now: Instant) {
        if let Some(state) = self.state.as_mut() {
            if state.is_playing {
                state.controls.show_with_timer(now, self.hide_delay);
            } else {
                state.controls.show_pinned();
            }
        }
    }

    /// Advance the inactivity timer
    pub fn tick(&mut self, now: Instant) {
        if let Some(state) = self.state.as_mut() {
            if state.is_playing && state.controls.tick(now) {
                debug!("Hiding overlay controls after inactivity");
            }
        }
    }

    /// Feed a callback from the overlay's surface
    pub fn on_media_event(&mut self, event: &MediaEvent, now: Instant) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if &state.item.id != event.item() {
            debug!("Dropping stale overlay event for {}", event.item());
            return;
        }

        match event {
            MediaEvent::Error { message, .. } | MediaEvent::PlayRejected { reason: message, .. } => {
                Self::show_error(state, message);
            }
            MediaEvent::Playing { .. } => {
                if state.error_message.is_none() && !state.is_playing {
                    state.is_playing = true;
                    state.controls.show_with_timer(now, self.hide_delay);
                }
            }
            MediaEvent::Paused { .. } | MediaEvent::Ended { .. } => {
                state.is_playing = false;
                state.controls.show_pinned();
            }
            MediaEvent::MetadataLoaded { .. } | MediaEvent::TimeUpdate { .. } => {}
        }
    }

    fn show_error(state: &mut ModalPlaybackState, detail: &dyn std::fmt::Display) {
        error!("Overlay media {} failed: {}", state.item.id, detail);
        state.is_playing = false;
        state.error_message = Some(LOAD_ERROR_MESSAGE.to_string());
        state.controls.show_pinned();
    }

    /// Current error, if any
    pub fn error_message(&self) -> Option<&str> {
        self.state.as_ref().and_then(|s| s.error_message.as_deref())
    }
}

impl Drop for ModalOverlay {
    fn drop(&mut self) {
        self.close();
    }
}
