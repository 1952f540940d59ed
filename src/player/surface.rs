//! Seams between the player state machines and the platform

use crate::content::PlayableItem;
use log::debug;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a media surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Codec or container not supported
    #[error("unsupported media: {0}")]
    Unsupported(String),

    /// Network failure while fetching media
    #[error("network error: {0}")]
    Network(String),

    /// Playback refused, e.g. autoplay policy
    #[error("playback not allowed: {0}")]
    NotAllowed(String),
}

/// Failure to enter or leave fullscreen
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FullscreenError {
    #[error("fullscreen request denied: {0}")]
    Denied(String),

    #[error("fullscreen is not supported")]
    Unsupported,
}

/// A single media element
///
/// Outcomes that arrive later (metadata, playing, errors) are reported
/// back as [`MediaEvent`](super::MediaEvent)s, not through return values.
pub trait MediaSurface: Send {
    /// Attach a source and start loading its metadata. Never autoplays.
    fn load(&mut self, item: &PlayableItem, url: &str);

    /// Request playback. Returns an error when the request is rejected
    /// synchronously.
    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    /// Pause, rewind and detach the current source
    fn reset(&mut self);

    fn set_muted(&mut self, muted: bool);

    fn seek(&mut self, position: Duration);
}

/// Platform fullscreen API for the overlay's container
pub trait FullscreenHost: Send {
    fn request_fullscreen(&mut self) -> Result<(), FullscreenError>;

    fn exit_fullscreen(&mut self) -> Result<(), FullscreenError>;
}

/// Surface with no output, for headless runs
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    current: Option<String>,
}

impl MediaSurface for HeadlessSurface {
    fn load(&mut self, item: &PlayableItem, url: &str) {
        debug!("headless surface: loading {} from {}", item.id, url);
        self.current = Some(url.to_string());
    }

    fn play(&mut self) -> Result<(), MediaError> {
        match self.current {
            Some(_) => Ok(()),
            None => Err(MediaError::NotAllowed("no source attached".to_string())),
        }
    }

    fn pause(&mut self) {}

    fn reset(&mut self) {
        self.current = None;
    }

    fn set_muted(&mut self, _muted: bool) {}

    fn seek(&mut self, _position: Duration) {}
}

/// Fullscreen host for environments without a display
#[derive(Debug, Default)]
pub struct HeadlessFullscreen;

impl FullscreenHost for HeadlessFullscreen {
    fn request_fullscreen(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }

    fn exit_fullscreen(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }
}
