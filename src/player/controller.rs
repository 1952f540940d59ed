//! Embedded player controller for showreel
//!
//! [`PlaybackController`] owns the playlist and a single media surface.
//! User commands and surface callbacks both come in through plain method
//! calls (or [`PlaybackController::dispatch`]), so every transition runs
//! to completion before the next one starts.

use crate::content::{ItemId, PlayableItem};
use crate::media::{ImageFormat, MediaResolver, TransformOptions};
use crate::player::{
    self, EndOfMediaPolicy, MediaEvent, MediaSurface, PlaybackPhase, PlaybackState, PlayerCommand,
    PlayerConfig, PlayerEvent, PlayerEventHandler, PlayerInput, PrefetchTracker, Prefetcher,
};
use crate::utils::error::{Result, ShowreelError};
use crate::utils::{clamp_fraction, format_duration};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

/// Embedded playlist player
pub struct PlaybackController {
    state: PlaybackState,
    surface: Box<dyn MediaSurface>,
    prefetch: PrefetchTracker,
    resolver: MediaResolver,
    config: PlayerConfig,
    event_handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl PlaybackController {
    /// Create a controller over `playlist` and load its first item
    ///
    /// # Arguments
    ///
    /// * `playlist` - Items in display order, may be empty
    /// * `surface` - The media element the controller drives
    /// * `config` - Player configuration
    pub fn new(playlist: Vec<PlayableItem>, surface: Box<dyn MediaSurface>, config: PlayerConfig) -> Self {
        let mut controller = Self {
            state: PlaybackState::new(playlist, config.start_muted),
            surface,
            prefetch: PrefetchTracker::disabled(),
            resolver: MediaResolver::default(),
            config,
            event_handlers: Vec::new(),
        };

        controller.surface.set_muted(controller.state.is_muted);
        controller.load_active();
        controller
    }

    /// Resolve CDN keys in media and poster fields with `resolver`
    ///
    /// An active item whose media is a bare key is loaded again through
    /// the new resolver.
    pub fn with_resolver(mut self, resolver: MediaResolver) -> Self {
        self.resolver = resolver;

        let bare_key = self
            .state
            .active_item()
            .and_then(|item| item.media_url.as_deref())
            .map_or(false, |url| !url.is_empty() && !MediaResolver::is_absolute(url));

        if bare_key {
            self.surface.reset();
            self.state.reset_for_selection();
            self.load_active();
        }
        self
    }

    /// Warm adjacent items through `prefetcher` while playing
    pub fn with_prefetcher(mut self, prefetcher: Box<dyn Prefetcher>) -> Self {
        self.prefetch = PrefetchTracker::new(prefetcher);
        self
    }

    pub fn add_event_handler(&mut self, handler: Box<dyn PlayerEventHandler>) {
        self.event_handlers.push(handler);
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn prefetch(&self) -> &PrefetchTracker {
        &self.prefetch
    }

    pub fn current_item(&self) -> Option<&PlayableItem> {
        self.state.active_item()
    }

    fn active_id(&self) -> Option<ItemId> {
        self.state.active_item().map(|item| item.id.clone())
    }

    fn emit(&mut self, event: PlayerEvent) {
        for handler in &mut self.event_handlers {
            handler.handle_event(event.clone());
        }
    }

    /// Route a command or surface callback
    pub fn dispatch(&mut self, input: PlayerInput) -> Result<()> {
        match input {
            PlayerInput::Command(command) => self.handle_command(command),
            PlayerInput::Media(event) => {
                self.handle_media_event(event);
                Ok(())
            }
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) -> Result<()> {
        match command {
            PlayerCommand::SelectIndex(index) => return self.select_index(index),
            PlayerCommand::Next => self.select_next(),
            PlayerCommand::Previous => self.select_previous(),
            PlayerCommand::TogglePlayPause => self.toggle_play_pause(),
            PlayerCommand::ToggleMute => self.toggle_mute(),
            PlayerCommand::SeekToFraction(fraction) => self.seek_to_fraction(fraction),
            PlayerCommand::ToggleDescription => self.toggle_description(),
            PlayerCommand::Retry => self.retry(),
            PlayerCommand::SetPlaylist(playlist) => self.set_playlist(playlist),
        }
        Ok(())
    }

    fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded { item, duration } => self.on_metadata_loaded(&item, duration),
            MediaEvent::Playing { item } => self.on_playing(&item),
            MediaEvent::Paused { item } => self.on_paused(&item),
            MediaEvent::TimeUpdate { item, current, duration } => {
                self.on_progress_tick(&item, current, duration)
            }
            MediaEvent::PlayRejected { item, reason } => self.on_play_rejected(&item, &reason),
            MediaEvent::Error { item, message } => self.on_media_error(&item, &message),
            MediaEvent::Ended { item } => self.on_media_ended(&item),
        }
    }

    /// Make the item at `index` active
    ///
    /// Re-selecting an item that failed keeps it failed; use
    /// [`retry`](Self::retry) to reload it.
    pub fn select_index(&mut self, index: usize) -> Result<()> {
        let len = self.state.len();
        if len == 0 {
            debug!("Ignoring selection of {} on empty playlist", index);
            return Ok(());
        }

        if index >= len {
            return Err(ShowreelError::InvalidInput(format!(
                "index {} out of range for playlist of {}",
                index, len
            )));
        }

        self.select(index);
        Ok(())
    }

    pub fn select_next(&mut self) {
        if let Some(index) = self.state.next_index() {
            self.select(index);
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(index) = self.state.previous_index() {
            self.select(index);
        }
    }

    fn select(&mut self, index: usize) {
        let keep_failure =
            self.state.selected_index == Some(index) && self.state.phase == PlaybackPhase::Failed;

        self.surface.reset();
        self.state.selected_index = Some(index);
        self.state.reset_for_selection();

        let targets: Vec<ItemId> = self.prefetch_targets().into_iter().map(|(id, _)| id).collect();
        self.prefetch.retain(&targets);

        let Some(id) = self.active_id() else {
            return;
        };

        if keep_failure {
            debug!("{} stays failed until retried", id);
            self.state.has_error = true;
            self.state.phase = PlaybackPhase::Failed;
        } else {
            self.load_active();
        }

        info!("Selected {} ({}/{})", id, index + 1, self.state.len());
        self.emit(PlayerEvent::SelectionChanged { index, item: id });
    }

    fn media_url_for(&self, item: &PlayableItem) -> Option<Result<String>> {
        player::media_url_for(&self.resolver, item)
    }

    fn load_active(&mut self) {
        let Some(item) = self.state.active_item().cloned() else {
            self.state.phase = PlaybackPhase::Idle;
            return;
        };

        match self.media_url_for(&item) {
            None => {
                debug!("{} has no video, showing its poster", item.id);
                self.state.phase = PlaybackPhase::Idle;
            }
            Some(Ok(url)) => {
                debug!("Loading {} from {}", item.id, url);
                self.surface.load(&item, &url);
                self.state.phase = PlaybackPhase::Loading;
                self.state.load_started_at = Some(Instant::now());
            }
            Some(Err(e)) => self.fail(&e.to_string()),
        }
    }

    fn fail(&mut self, message: &str) {
        let Some(id) = self.active_id() else {
            return;
        };

        error!("Media {} failed: {}", id, message);
        self.surface.pause();
        self.state.phase = PlaybackPhase::Failed;
        self.state.has_error = true;
        self.state.is_playing = false;
        self.state.play_pending = false;
        self.state.load_started_at = None;

        self.emit(PlayerEvent::MediaFailed {
            item: id,
            message: message.to_string(),
        });
    }

    /// Start or pause the active item
    ///
    /// Playing only begins once the surface confirms it; a rejected
    /// request marks the item failed.
    pub fn toggle_play_pause(&mut self) {
        if self.state.has_error {
            debug!("Ignoring play toggle: active media failed");
            return;
        }

        let Some(id) = self
            .state
            .active_item()
            .filter(|item| item.is_playable())
            .map(|item| item.id.clone())
        else {
            return;
        };

        if self.state.phase == PlaybackPhase::Playing {
            self.surface.pause();
            self.state.phase = PlaybackPhase::Paused;
            self.state.is_playing = false;
            self.emit(PlayerEvent::PlaybackPaused { item: id });
        } else if self.state.play_pending {
            debug!("Withdrawing pending play of {}", id);
            self.surface.pause();
            self.state.play_pending = false;
        } else {
            self.request_play();
        }
    }

    fn request_play(&mut self) {
        self.state.play_pending = true;
        if let Err(e) = self.surface.play() {
            self.fail(&e.to_string());
        }
    }

    pub fn toggle_mute(&mut self) {
        self.state.is_muted = !self.state.is_muted;
        self.surface.set_muted(self.state.is_muted);
        self.emit(PlayerEvent::MuteChanged {
            muted: self.state.is_muted,
        });
    }

    /// Seek to a fraction of the duration. Out-of-range values are clamped.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        let fraction = clamp_fraction(fraction);

        if self.state.has_error || !self.state.active_item().map_or(false, |i| i.is_playable()) {
            return;
        }

        let Some(duration) = self.state.duration.filter(|d| !d.is_zero()) else {
            debug!("Seek ignored: duration not known yet");
            return;
        };

        let position = duration.mul_f64(fraction);
        debug!("Seeking to {} of {}", format_duration(position), format_duration(duration));
        self.surface.seek(position);
    }

    pub fn toggle_description(&mut self) {
        self.state.is_description_expanded = !self.state.is_description_expanded;
    }

    /// Reload a failed item
    pub fn retry(&mut self) {
        if self.state.phase != PlaybackPhase::Failed {
            debug!("Nothing to retry");
            return;
        }

        if let Some(id) = self.active_id() {
            info!("Retrying {}", id);
        }

        self.surface.reset();
        self.state.reset_for_selection();
        self.load_active();
    }

    /// Replace the playlist
    ///
    /// The active item stays active if it is still present; otherwise the
    /// selection is clamped into the new list and that item is loaded.
    pub fn set_playlist(&mut self, playlist: Vec<PlayableItem>) {
        let active = self.active_id();
        self.state.playlist = playlist;

        if self.state.is_empty() {
            info!("Playlist cleared");
            self.surface.reset();
            self.prefetch.clear();
            self.state.selected_index = None;
            self.state.reset_for_selection();
            return;
        }

        if let Some(index) = active.as_ref().and_then(|id| self.state.position_of(id)) {
            debug!("Playlist replaced, active item now at {}", index);
            self.state.selected_index = Some(index);

            if self.state.phase == PlaybackPhase::Playing {
                self.issue_prefetch();
            } else {
                let targets: Vec<ItemId> =
                    self.prefetch_targets().into_iter().map(|(id, _)| id).collect();
                self.prefetch.retain(&targets);
            }
            return;
        }

        let index = self.state.selected_index.unwrap_or(0).min(self.state.len() - 1);
        self.state.selected_index = None;
        self.select(index);
    }

    /// Check the load timeout
    pub fn tick(&mut self, now: Instant) {
        let (Some(timeout), Some(started)) = (self.config.load_timeout(), self.state.load_started_at) else {
            return;
        };

        if self.state.phase == PlaybackPhase::Loading && now.saturating_duration_since(started) >= timeout {
            warn!("Load timed out after {}", format_duration(timeout));
            self.fail("load timed out");
        }
    }

    /// Poster to show for the item at `index`
    ///
    /// Site paths and URLs pass through, bare keys go through the CDN
    /// resolver, and items without a poster get the configured default.
    pub fn poster_for(&self, index: usize) -> Result<Option<String>> {
        let Some(item) = self.state.playlist.get(index) else {
            return Ok(None);
        };

        let poster = match item.poster_url.as_deref().filter(|p| !p.is_empty()) {
            None => self.config.default_poster.clone(),
            Some(url) if MediaResolver::is_absolute(url) => url.to_string(),
            Some(key) => self.resolver.resolve(
                key,
                &TransformOptions::width(self.config.poster_width).with_format(ImageFormat::Webp),
            )?,
        };

        Ok(Some(poster))
    }

    /// Whether a callback for `item` concerns the active item
    fn accept(&self, item: &ItemId, what: &str) -> bool {
        if self.state.is_active(item) {
            true
        } else {
            debug!("Dropping stale {} from {}", what, item);
            false
        }
    }

    pub fn on_metadata_loaded(&mut self, item: &ItemId, duration: Duration) {
        if !self.accept(item, "metadata") {
            return;
        }

        if !duration.is_zero() {
            self.state.duration = Some(duration);
        }
        self.state.load_started_at = None;

        if self.state.phase == PlaybackPhase::Loading {
            self.state.phase = PlaybackPhase::Ready;
        }
    }

    pub fn on_playing(&mut self, item: &ItemId) {
        if !self.accept(item, "playing") {
            return;
        }

        if self.state.has_error {
            debug!("Ignoring playing report for failed {}", item);
            return;
        }

        let was_playing = self.state.phase == PlaybackPhase::Playing;
        self.state.phase = PlaybackPhase::Playing;
        self.state.is_playing = true;
        self.state.play_pending = false;
        self.state.load_started_at = None;

        if !was_playing {
            self.emit(PlayerEvent::PlaybackStarted { item: item.clone() });
            self.issue_prefetch();
        }
    }

    pub fn on_paused(&mut self, item: &ItemId) {
        if !self.accept(item, "paused") {
            return;
        }

        if self.state.phase == PlaybackPhase::Playing {
            self.state.phase = PlaybackPhase::Paused;
            self.state.is_playing = false;
            self.emit(PlayerEvent::PlaybackPaused { item: item.clone() });
        }
    }

    /// Position report from the surface
    pub fn on_progress_tick(&mut self, item: &ItemId, current: Duration, duration: Duration) {
        if !self.accept(item, "time update") || self.state.has_error || duration.is_zero() {
            return;
        }

        self.state.duration = Some(duration);
        let fraction = clamp_fraction(current.as_secs_f64() / duration.as_secs_f64());

        if fraction != self.state.progress_fraction {
            self.state.progress_fraction = fraction;
            self.emit(PlayerEvent::ProgressChanged { fraction });
        }
    }

    pub fn on_media_error(&mut self, item: &ItemId, message: &str) {
        if self.accept(item, "error") {
            self.fail(message);
        }
    }

    /// Asynchronous play rejection. Ignored once the request was withdrawn.
    pub fn on_play_rejected(&mut self, item: &ItemId, reason: &str) {
        if !self.accept(item, "play rejection") {
            return;
        }

        if !self.state.play_pending {
            debug!("Ignoring rejection of withdrawn play request: {}", reason);
            return;
        }

        self.fail(reason);
    }

    pub fn on_media_ended(&mut self, item: &ItemId) {
        if !self.accept(item, "end of media") {
            return;
        }

        self.emit(PlayerEvent::EndOfMedia { item: item.clone() });

        if self.config.end_of_media == EndOfMediaPolicy::Advance && self.state.len() > 1 {
            self.select_next();
            if self.state.active_item().map_or(false, |i| i.is_playable()) && !self.state.has_error {
                self.request_play();
            }
            return;
        }

        self.state.phase = PlaybackPhase::Ended;
        self.state.is_playing = false;
        self.state.play_pending = false;
        if self.state.progress_fraction != 1.0 {
            self.state.progress_fraction = 1.0;
            self.emit(PlayerEvent::ProgressChanged { fraction: 1.0 });
        }
    }

    /// Items that should be warmed for the current selection
    fn prefetch_targets(&self) -> Vec<(ItemId, String)> {
        let active = self.active_id();
        let mut indices: Vec<usize> = self.state.next_index().into_iter().collect();

        if self.config.prefetch_previous {
            if let Some(previous) = self.state.previous_index().filter(|i| !indices.contains(i)) {
                indices.push(previous);
            }
        }

        indices
            .into_iter()
            .filter_map(|i| self.state.playlist.get(i))
            .filter(|item| Some(&item.id) != active.as_ref())
            .filter_map(|item| match self.media_url_for(item)? {
                Ok(url) => Some((item.id.clone(), url)),
                Err(_) => None,
            })
            .collect()
    }

    fn issue_prefetch(&mut self) {
        let targets = self.prefetch_targets();
        for item in self.prefetch.update(&targets) {
            self.emit(PlayerEvent::PrefetchIssued { item });
        }
    }
}
